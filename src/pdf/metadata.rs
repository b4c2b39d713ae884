//! Loading source PDFs and counting pages

use std::path::Path;
use lopdf::Document;
use crate::error::{Error, Result};

/// Load a source PDF, rejecting files that cannot be merged
///
/// Missing, encrypted and page-less documents are errors here; the caller
/// decides whether to skip them.
pub fn load_source(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;

    if doc.trailer.has(b"Encrypt") {
        return Err(Error::Encrypted(path.to_path_buf()));
    }

    if doc.get_pages().is_empty() {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(doc)
}

/// Number of pages a document contributes to a merge
pub fn page_count(doc: &Document) -> u32 {
    doc.get_pages().len() as u32
}

/// Count the number of pages in a PDF file
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    Ok(doc.get_pages().len())
}
