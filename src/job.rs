//! Merge jobs: from a source directory to one bound PDF
//!
//! `merge_directory` runs the whole pipeline: discover the PDFs, load them
//! (skipping the ones that cannot be merged), lay out the table of contents,
//! render the front matter, concatenate everything, add bookmarks and page
//! numbers, and write the result.

use std::path::{Path, PathBuf};

use lopdf::{Document, ObjectId};
use tracing::{debug, info, warn};

use crate::date::TitleDate;
use crate::discover::{
    dedupe_titles, display_title, ensure_pdf_extension, find_pdfs, unique_output_path,
    DEFAULT_OUTPUT_NAME,
};
use crate::error::{Error, Result};
use crate::layout::{compute_layout, TocLayout, TocStyle};
use crate::pdf::{
    add_bookmarks, load_source, merge_documents, page_count, render_separator_page,
    render_title_page, render_toc, save_atomically, set_document_info, stamp_page_numbers,
    FooterStyle, TitlePage,
};

/// One source PDF within a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// TOC and bookmark title, derived from the file name
    pub title: String,
    pub page_count: u32,
    /// 1-based page of the output where this entry begins; set by layout
    pub start_page: u32,
}

impl Entry {
    pub fn new(title: impl Into<String>, page_count: u32) -> Self {
        Self {
            title: title.into(),
            page_count,
            start_page: 0,
        }
    }
}

/// A laid-out merge, ready for assembly
#[derive(Debug, Clone)]
pub struct MergeJob {
    pub source_directory: PathBuf,
    pub output_path: PathBuf,
    pub entries: Vec<Entry>,
}

/// Options for merging a directory
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Directory containing the PDFs to merge
    pub directory: PathBuf,
    /// Output file name, placed inside `directory` unless absolute
    pub output_name: String,
    /// Title page heading; defaults to the directory name
    pub title: Option<String>,
    /// Date line on the title page
    pub date: TitleDate,
    /// Insert a page naming each document before its pages
    pub separators: bool,
    /// Stamp "Page N of M" on every page
    pub page_numbers: bool,
    pub style: TocStyle,
    pub footer: FooterStyle,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            title: None,
            date: TitleDate::Today,
            separators: false,
            page_numbers: true,
            style: TocStyle::default(),
            footer: FooterStyle::default(),
        }
    }
}

/// Outcome of a successful merge
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub output_path: PathBuf,
    pub entries: Vec<Entry>,
    pub toc_pages: u32,
    pub total_pages: u32,
    /// Source files left out because they could not be merged
    pub skipped: Vec<PathBuf>,
}

/// Merge every PDF in a directory into one document
///
/// # Example
///
/// ```no_run
/// use pdf_binder::job::{merge_directory, MergeOptions};
/// use std::path::PathBuf;
///
/// let options = MergeOptions {
///     directory: PathBuf::from("handouts"),
///     ..Default::default()
/// };
///
/// let report = merge_directory(&options).expect("Failed to merge");
/// println!("{} pages written to {}", report.total_pages, report.output_path.display());
/// ```
pub fn merge_directory(options: &MergeOptions) -> Result<MergeReport> {
    let directory = resolve_directory(&options.directory)?;
    let output_name = ensure_pdf_extension(&options.output_name);

    let candidates = find_pdfs(&directory, &output_name)?;
    info!(count = candidates.len(), directory = %directory.display(), "found PDF files");

    let mut documents = Vec::new();
    let mut titles = Vec::new();
    let mut skipped = Vec::new();
    for path in candidates {
        match load_source(&path) {
            Ok(doc) => {
                debug!(file = %path.display(), pages = page_count(&doc), "loaded");
                titles.push(display_title(&path));
                documents.push(doc);
            }
            Err(e) if e.is_recoverable() => {
                warn!(file = %path.display(), "skipping: {}", e);
                skipped.push(path);
            }
            Err(e) => return Err(e),
        }
    }

    if documents.is_empty() {
        return Err(Error::NoPdfsFound(directory));
    }

    dedupe_titles(&mut titles);
    let mut entries: Vec<Entry> = titles
        .into_iter()
        .zip(&documents)
        .map(|(title, doc)| Entry::new(title, page_count(doc)))
        .collect();

    let layout = compute_layout(&mut entries, &options.style, options.separators);
    info!(
        documents = entries.len(),
        toc_pages = layout.toc_page_count(),
        "laid out table of contents"
    );

    let output_path = unique_output_path(&directory, &output_name);
    let job = MergeJob {
        source_directory: directory,
        output_path,
        entries,
    };

    let total_pages = assemble(&job, &layout, documents, options)?;
    info!(output = %job.output_path.display(), pages = total_pages, "wrote merged PDF");

    Ok(MergeReport {
        output_path: job.output_path,
        entries: job.entries,
        toc_pages: layout.toc_page_count(),
        total_pages,
        skipped,
    })
}

/// Check the source directory and make it absolute
fn resolve_directory(directory: &Path) -> Result<PathBuf> {
    if !directory.exists() {
        return Err(Error::DirectoryNotFound(directory.to_path_buf()));
    }
    if !directory.is_dir() {
        return Err(Error::NotADirectory(directory.to_path_buf()));
    }
    Ok(directory.canonicalize()?)
}

/// Title page heading when none is given: the directory's own name
fn default_title(directory: &Path) -> String {
    directory
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Merged Documents".to_string())
}

/// Render the front matter, concatenate it with the sources and write the output
///
/// Returns the number of pages written.
fn assemble(
    job: &MergeJob,
    layout: &TocLayout,
    documents: Vec<Document>,
    options: &MergeOptions,
) -> Result<u32> {
    let title = options
        .title
        .clone()
        .unwrap_or_else(|| default_title(&job.source_directory));

    let title_page = TitlePage {
        title: title.clone(),
        document_count: job.entries.len(),
        page_count: job.entries.iter().map(|e| e.page_count).sum(),
        date: options.date.resolve(),
    };

    let mut parts = Vec::with_capacity(2 + documents.len() * 2);
    parts.push(render_title_page(&title_page, &options.style));
    parts.push(render_toc(layout, &job.entries, &options.style));
    for (entry, doc) in job.entries.iter().zip(documents) {
        if options.separators {
            parts.push(render_separator_page(&entry.title, &options.style));
        }
        parts.push(doc);
    }

    let merged = merge_documents(parts)?;
    let expected = layout.total_pages(&job.entries);
    if merged.page_ids.len() as u32 != expected {
        return Err(Error::General(format!(
            "Assembled {} pages but the layout expects {}",
            merged.page_ids.len(),
            expected
        )));
    }

    let bookmarks = job
        .entries
        .iter()
        .map(|entry| {
            let page_id = bookmark_target(&merged.page_ids, entry)?;
            Ok((entry.title.clone(), page_id))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut doc = merged.document;
    add_bookmarks(&mut doc, &bookmarks)?;
    if options.page_numbers {
        stamp_page_numbers(&mut doc, &options.footer)?;
    }
    set_document_info(&mut doc, &title);

    save_atomically(&mut doc, &job.output_path)?;
    Ok(expected)
}

fn bookmark_target(page_ids: &[ObjectId], entry: &Entry) -> Result<ObjectId> {
    let index = entry.start_page.checked_sub(1).map(|i| i as usize);
    index
        .and_then(|i| page_ids.get(i).copied())
        .ok_or_else(|| {
            Error::General(format!(
                "Start page {} of \"{}\" is outside the document",
                entry.start_page, entry.title
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_new_is_unplaced() {
        let entry = Entry::new("intro", 4);
        assert_eq!(entry.start_page, 0);
        assert_eq!(entry.page_count, 4);
    }

    #[test]
    fn test_default_options() {
        let options = MergeOptions::default();
        assert_eq!(options.output_name, "merged_pdfs.pdf");
        assert!(options.page_numbers);
        assert!(!options.separators);
        assert_eq!(options.date, TitleDate::Today);
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let options = MergeOptions {
            directory: PathBuf::from("definitely/not/here"),
            ..Default::default()
        };
        assert!(matches!(merge_directory(&options), Err(Error::DirectoryNotFound(_))));
    }

    #[test]
    fn test_bookmark_target_bounds() {
        let ids = vec![(1, 0), (2, 0), (3, 0)];
        let mut entry = Entry::new("x", 1);
        entry.start_page = 3;
        assert_eq!(bookmark_target(&ids, &entry).unwrap(), (3, 0));

        entry.start_page = 4;
        assert!(bookmark_target(&ids, &entry).is_err());
        entry.start_page = 0;
        assert!(bookmark_target(&ids, &entry).is_err());
    }

    #[test]
    fn test_default_title_uses_directory_name() {
        assert_eq!(default_title(Path::new("/tmp/Spring Handouts")), "Spring Handouts");
        assert_eq!(default_title(Path::new("/")), "Merged Documents");
    }
}
