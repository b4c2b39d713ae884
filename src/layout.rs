//! Page geometry and table of contents layout
//!
//! The TOC length depends on how many entries there are and how their titles
//! wrap, and every entry's start page depends on the TOC length. The layout is
//! computed in two steps: a provisional pass that assumes every title fits on
//! one line, then a single correction once titles are wrapped. Wrapping never
//! depends on page numbers (they get a fixed column), so one correction is
//! enough.

use tracing::debug;

use crate::job::Entry;
use crate::text::{wrap_text, Font};

// Slack for float comparisons against the bottom margin
const EPSILON: f32 = 0.01;

/// Length in PDF points (1/72 inch)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from inches
    pub fn from_inches(inches: f64) -> Self {
        Length(inches * 72.0)
    }

    /// Get the value in points
    pub fn pt(&self) -> f32 {
        self.0 as f32
    }
}

/// Page dimensions
#[derive(Debug, Clone, Copy)]
pub struct PageDimensions {
    pub width: Length,
    pub height: Length,
}

impl PageDimensions {
    /// US Letter size (8.5" × 11")
    pub fn letter() -> Self {
        Self {
            width: Length::from_inches(8.5),
            height: Length::from_inches(11.0),
        }
    }
}

/// Margins for page content
#[derive(Debug, Clone, Copy)]
pub struct Margins {
    pub top: Length,
    pub bottom: Length,
    pub left: Length,
    pub right: Length,
}

impl Margins {
    /// Create margins with same value on all sides
    pub fn uniform(margin: Length) -> Self {
        Self {
            top: margin,
            bottom: margin,
            left: margin,
            right: margin,
        }
    }

    /// Standard 1-inch margins on all sides
    pub fn standard() -> Self {
        Self::uniform(Length::from_inches(1.0))
    }
}

/// Geometry and typography of the generated pages
#[derive(Debug, Clone)]
pub struct TocStyle {
    pub page: PageDimensions,
    pub margins: Margins,
    /// Heading drawn at the top of the first TOC page
    pub heading: String,
    pub heading_font_size: f32,
    pub entry_font_size: f32,
    pub line_height: f32,
    /// Column reserved at the right edge for page numbers
    pub page_number_width: f32,
    /// Extra space kept free between a title and the page number column
    pub title_gutter: f32,
    /// Indentation of wrapped continuation lines
    pub indent: f32,
    /// Horizontal distance between leader dots
    pub dot_spacing: f32,
}

impl Default for TocStyle {
    fn default() -> Self {
        Self {
            page: PageDimensions::letter(),
            margins: Margins::standard(),
            heading: "Table of Contents".to_string(),
            heading_font_size: 24.0,
            entry_font_size: 12.0,
            line_height: 20.0,
            page_number_width: 40.0,
            title_gutter: 50.0,
            indent: 20.0,
            dot_spacing: 4.0,
        }
    }
}

impl TocStyle {
    pub fn page_width(&self) -> f32 {
        self.page.width.pt()
    }

    pub fn page_height(&self) -> f32 {
        self.page.height.pt()
    }

    /// Baseline of the first line on a page (the heading on the first TOC page)
    pub fn top_y(&self) -> f32 {
        self.page_height() - self.margins.top.pt()
    }

    /// Lowest y a line may descend to
    pub fn bottom_y(&self) -> f32 {
        self.margins.bottom.pt()
    }

    /// Baseline of the first entry on the first TOC page
    pub fn first_entry_y(&self) -> f32 {
        self.top_y() - (self.heading_font_size + self.line_height) - self.line_height
    }

    /// X where the page number column ends (numbers are right-aligned here)
    pub fn right_edge(&self) -> f32 {
        self.page_width() - self.margins.right.pt()
    }

    /// Widest a title line may be before it wraps
    pub fn max_title_width(&self) -> f32 {
        self.page_width()
            - self.margins.left.pt()
            - self.margins.right.pt()
            - self.page_number_width
            - self.title_gutter
    }
}

/// One rendered line of the TOC
#[derive(Debug, Clone, PartialEq)]
pub struct TocLine {
    /// Index of the entry this line belongs to
    pub entry: usize,
    pub text: String,
    /// Baseline
    pub y: f32,
    /// Wrapped continuation of the previous line (indented, no leader or number)
    pub continuation: bool,
}

/// Lines placed on one TOC page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TocPage {
    pub lines: Vec<TocLine>,
}

/// Result of laying out the front matter
#[derive(Debug, Clone)]
pub struct TocLayout {
    pub pages: Vec<TocPage>,
    /// Whether each document is preceded by a separator page
    pub separators: bool,
}

impl TocLayout {
    /// Number of TOC pages (always at least one)
    pub fn toc_page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Title page plus TOC pages
    pub fn front_matter_pages(&self) -> u32 {
        1 + self.toc_page_count()
    }

    /// Total pages of the assembled document
    pub fn total_pages(&self, entries: &[Entry]) -> u32 {
        let per_entry = if self.separators { 1 } else { 0 };
        self.front_matter_pages()
            + entries.iter().map(|e| e.page_count + per_entry).sum::<u32>()
    }
}

/// Compute TOC placement and fill in every entry's `start_page`
///
/// # Example
///
/// ```
/// use pdf_binder::job::Entry;
/// use pdf_binder::layout::{compute_layout, TocStyle};
///
/// let mut entries = vec![Entry::new("intro", 3), Entry::new("advanced", 5)];
/// let layout = compute_layout(&mut entries, &TocStyle::default(), false);
///
/// assert_eq!(layout.toc_page_count(), 1);
/// assert_eq!(entries[0].start_page, 3);
/// assert_eq!(entries[1].start_page, 6);
/// ```
pub fn compute_layout(entries: &mut [Entry], style: &TocStyle, separators: bool) -> TocLayout {
    let unwrapped: Vec<Vec<String>> = entries.iter().map(|e| vec![e.title.clone()]).collect();
    let provisional = paginate(&unwrapped, style).len() as u32;
    assign_start_pages(entries, provisional, separators);

    let wrapped: Vec<Vec<String>> = entries
        .iter()
        .map(|e| wrap_text(&e.title, Font::Helvetica, style.entry_font_size, style.max_title_width()))
        .collect();
    let pages = paginate(&wrapped, style);

    let toc_pages = pages.len() as u32;
    if toc_pages != provisional {
        debug!(provisional, toc_pages, "title wrapping changed TOC length, shifting start pages");
        assign_start_pages(entries, toc_pages, separators);
    }

    TocLayout { pages, separators }
}

/// Number each entry's first page: title page, TOC pages, then documents in order
fn assign_start_pages(entries: &mut [Entry], toc_pages: u32, separators: bool) {
    let per_entry = if separators { 1 } else { 0 };
    let mut next = 1 + toc_pages + 1;
    for entry in entries.iter_mut() {
        entry.start_page = next;
        next += entry.page_count + per_entry;
    }
}

/// Place entry lines onto TOC pages
///
/// An entry moves to a fresh page when all of its lines don't fit above the
/// bottom margin; an entry taller than a page is split line by line.
fn paginate(entries: &[Vec<String>], style: &TocStyle) -> Vec<TocPage> {
    let line_height = style.line_height;
    let bottom = style.bottom_y() - EPSILON;
    let mut pages = vec![TocPage::default()];
    let mut y = style.first_entry_y();

    for (index, lines) in entries.iter().enumerate() {
        let needed = lines.len() as f32 * line_height;
        if y - needed < bottom && !current_page(&pages).lines.is_empty() {
            pages.push(TocPage::default());
            y = style.top_y();
        }

        for (n, text) in lines.iter().enumerate() {
            if y - line_height < bottom && !current_page(&pages).lines.is_empty() {
                pages.push(TocPage::default());
                y = style.top_y();
            }
            if let Some(page) = pages.last_mut() {
                page.lines.push(TocLine {
                    entry: index,
                    text: text.clone(),
                    y,
                    continuation: n > 0,
                });
            }
            y -= line_height;
        }
    }

    pages
}

fn current_page(pages: &[TocPage]) -> &TocPage {
    // paginate always starts with one page
    &pages[pages.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(counts: &[u32]) -> Vec<Entry> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &pages)| Entry::new(format!("document {}", i + 1), pages))
            .collect()
    }

    const LONG_TITLE: &str =
        "This is a very long filename that should definitely wrap onto a second line of the table";

    #[test]
    fn test_length_conversions() {
        assert!((Length::from_inches(1.0).pt() - 72.0).abs() < 0.01);
        assert!((Length::from_inches(8.5).pt() - 612.0).abs() < 0.01);
    }

    #[test]
    fn test_letter_size() {
        let letter = PageDimensions::letter();
        assert_eq!(letter.width.pt(), 612.0);
        assert_eq!(letter.height.pt(), 792.0);
    }

    #[test]
    fn test_default_style_geometry() {
        let style = TocStyle::default();
        assert_eq!(style.top_y(), 720.0);
        assert_eq!(style.first_entry_y(), 656.0);
        assert_eq!(style.max_title_width(), 378.0);
        assert_eq!(style.right_edge(), 540.0);
    }

    #[test]
    fn test_start_pages_follow_front_matter() {
        let mut list = entries(&[3, 2, 4]);
        let layout = compute_layout(&mut list, &TocStyle::default(), false);

        assert_eq!(layout.toc_page_count(), 1);
        let starts: Vec<u32> = list.iter().map(|e| e.start_page).collect();
        assert_eq!(starts, vec![3, 6, 8]);
        assert_eq!(layout.total_pages(&list), 1 + 1 + 9);
    }

    #[test]
    fn test_start_pages_with_separators() {
        let mut list = entries(&[3, 2, 4]);
        let layout = compute_layout(&mut list, &TocStyle::default(), true);

        let starts: Vec<u32> = list.iter().map(|e| e.start_page).collect();
        assert_eq!(starts, vec![3, 7, 10]);
        assert_eq!(layout.total_pages(&list), 2 + 9 + 3);
    }

    #[test]
    fn test_first_page_capacity() {
        let mut list = entries(&[1; 29]);
        assert_eq!(compute_layout(&mut list, &TocStyle::default(), false).toc_page_count(), 1);

        let mut list = entries(&[1; 30]);
        let layout = compute_layout(&mut list, &TocStyle::default(), false);
        assert_eq!(layout.toc_page_count(), 2);
        assert_eq!(layout.pages[1].lines.len(), 1);
        assert_eq!(list[0].start_page, 4);
    }

    #[test]
    fn test_many_entries_span_several_pages() {
        // 29 on the first page, 32 on each following page
        let mut list = entries(&[1; 62]);
        let layout = compute_layout(&mut list, &TocStyle::default(), false);
        assert_eq!(layout.toc_page_count(), 3);
        assert_eq!(layout.pages[0].lines.len(), 29);
        assert_eq!(layout.pages[1].lines.len(), 32);
        assert_eq!(layout.pages[1].lines[0].y, 720.0);
    }

    #[test]
    fn test_wrapping_corrects_start_pages() {
        let mut list = entries(&[1; 29]);
        list[0].title = LONG_TITLE.to_string();
        let layout = compute_layout(&mut list, &TocStyle::default(), false);

        // The provisional pass fits 29 one-line entries on one page; the wrapped
        // title pushes the tail onto a second page and shifts every start page.
        assert_eq!(layout.toc_page_count(), 2);
        assert_eq!(list[0].start_page, 4);
        assert!(layout.pages[0].lines[1].continuation);
        assert_eq!(layout.pages[0].lines[1].entry, 0);
    }

    #[test]
    fn test_start_pages_strictly_increasing() {
        let mut list = entries(&[5, 1, 12, 1, 1, 300, 2]);
        list[3].title = LONG_TITLE.repeat(3);
        compute_layout(&mut list, &TocStyle::default(), false);

        for pair in list.windows(2) {
            assert!(pair[0].start_page < pair[1].start_page);
            assert_eq!(pair[1].start_page, pair[0].start_page + pair[0].page_count);
        }
    }

    #[test]
    fn test_entry_taller_than_a_page_is_split() {
        let mut list = entries(&[1]);
        list[0].title = "word ".repeat(2000);
        let layout = compute_layout(&mut list, &TocStyle::default(), false);

        assert!(layout.toc_page_count() > 1);
        let bottom = TocStyle::default().bottom_y();
        for page in &layout.pages {
            for line in &page.lines {
                assert!(line.y - 20.0 >= bottom - EPSILON);
            }
        }
        assert_eq!(list[0].start_page, 2 + layout.toc_page_count());
    }

    #[test]
    fn test_empty_entry_list_still_has_toc_page() {
        let mut list: Vec<Entry> = Vec::new();
        let layout = compute_layout(&mut list, &TocStyle::default(), false);
        assert_eq!(layout.toc_page_count(), 1);
        assert!(layout.pages[0].lines.is_empty());
    }
}
