//! Error types for the PDF binder library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF binder library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Source directory does not exist
    #[error("Directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Source path exists but is not a directory
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Nothing left to merge after discovery and loading
    #[error("No valid PDF files found in {}", .0.display())]
    NoPdfsFound(PathBuf),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// Encrypted PDFs are not merged
    #[error("PDF is encrypted: {}", .0.display())]
    Encrypted(PathBuf),

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// Date parsing error
    #[error("Invalid date expression: {0}")]
    InvalidDateExpression(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Whether this error only affects a single source file.
    ///
    /// Recoverable errors cause the file to be skipped; everything else aborts the merge.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Pdf(_) | Error::FileNotFound(_) | Error::EmptyPdf(_) | Error::Encrypted(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors_are_not_recoverable() {
        assert!(!Error::NoPdfsFound(PathBuf::from("docs")).is_recoverable());
        assert!(!Error::DirectoryNotFound(PathBuf::from("docs")).is_recoverable());
        assert!(Error::EmptyPdf(PathBuf::from("a.pdf")).is_recoverable());
    }

    #[test]
    fn test_error_messages_name_the_path() {
        let err = Error::NoPdfsFound(PathBuf::from("handouts"));
        assert_eq!(err.to_string(), "No valid PDF files found in handouts");
    }
}
