//! PDF manipulation module

pub mod merge;
pub mod metadata;
pub mod outline;
pub mod render;
pub mod stamp;

// Re-export commonly used items
pub use merge::{merge_documents, save_atomically, set_document_info, MergedDocument};
pub use metadata::{count_pages, load_source, page_count};
pub use outline::{add_bookmarks, read_bookmarks};
pub use render::{render_separator_page, render_title_page, render_toc, TitlePage};
pub use stamp::{stamp_page_numbers, FooterStyle};
