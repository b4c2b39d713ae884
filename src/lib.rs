//! PDF Binder Library
//!
//! Merges every PDF in a directory into a single document with a title page,
//! a table of contents and bookmarks. This library provides functionality to:
//! - Discover source PDFs and choose a non-clobbering output name
//! - Lay out a paginated table of contents with dot leaders
//! - Render generated pages with the standard PDF fonts
//! - Concatenate documents, add bookmarks and stamp page numbers
//!
//! # Example
//!
//! ```no_run
//! use pdf_binder::{merge_directory, MergeOptions};
//! use std::path::PathBuf;
//!
//! let options = MergeOptions {
//!     directory: PathBuf::from("handouts"),
//!     title: Some("Spring Term".to_string()),
//!     ..Default::default()
//! };
//!
//! let report = merge_directory(&options).expect("Failed to merge PDFs");
//! println!("Wrote {}", report.output_path.display());
//! ```

pub mod date;
pub mod discover;
pub mod error;
pub mod job;
pub mod layout;
pub mod logging;
pub mod pdf;
pub mod text;

// Re-export commonly used items
pub use error::{Error, Result};
pub use job::{merge_directory, Entry, MergeJob, MergeOptions, MergeReport};
