//! Rendering of generated pages: title page, table of contents, separators
//!
//! Pages are written as raw content streams against the standard Helvetica
//! fonts, the same way footers are stamped onto existing pages.

use chrono::NaiveDate;
use lopdf::{dictionary, Document, Object, Stream};

use crate::date::format_date;
use crate::job::Entry;
use crate::layout::{TocLayout, TocStyle};
use crate::text::{pdf_literal, text_width, wrap_text, Font};

/// What the title page shows
#[derive(Debug, Clone)]
pub struct TitlePage {
    pub title: String,
    pub document_count: usize,
    pub page_count: u32,
    pub date: Option<NaiveDate>,
}

impl TitlePage {
    /// "3 documents, 12 pages"
    pub fn summary(&self) -> String {
        format!(
            "{} {}, {} {}",
            self.document_count,
            if self.document_count == 1 { "document" } else { "documents" },
            self.page_count,
            if self.page_count == 1 { "page" } else { "pages" },
        )
    }
}

/// Content stream for a single page
#[derive(Debug, Default)]
struct PageContent {
    ops: String,
}

impl PageContent {
    fn text(&mut self, font: Font, size: f32, x: f32, y: f32, text: &str) {
        self.ops.push_str(&format!(
            "BT\n/{} {} Tf\n1 0 0 1 {:.2} {:.2} Tm\n({}) Tj\nET\n",
            font.resource_name(),
            size,
            x,
            y,
            pdf_literal(text)
        ));
    }

    fn centered(&mut self, font: Font, size: f32, page_width: f32, y: f32, text: &str) {
        let x = (page_width - text_width(text, font, size)) / 2.0;
        self.text(font, size, x, y, text);
    }

    /// A run of dots, `spacing` points apart
    fn leader(&mut self, font: Font, size: f32, x: f32, y: f32, count: usize, spacing: f32) {
        if count == 0 {
            return;
        }
        let char_spacing = spacing - text_width(".", font, size);
        self.ops.push_str(&format!(
            "BT\n/{} {} Tf\n{:.3} Tc\n1 0 0 1 {:.2} {:.2} Tm\n({}) Tj\n0 Tc\nET\n",
            font.resource_name(),
            size,
            char_spacing,
            x,
            y,
            ".".repeat(count)
        ));
    }
}

/// Largest font size in `min..=max` (whole points) at which `text` fits in one
/// line, wrapping at `min` when even that is too wide
fn fit_text(text: &str, font: Font, max_size: f32, min_size: f32, max_width: f32) -> (f32, Vec<String>) {
    let mut size = max_size;
    while size > min_size && text_width(text, font, size) > max_width {
        size -= 1.0;
    }
    if text_width(text, font, size) <= max_width {
        (size, vec![text.to_string()])
    } else {
        (size, wrap_text(text, font, size, max_width))
    }
}

/// Render the title page as a one-page document
pub fn render_title_page(page: &TitlePage, style: &TocStyle) -> Document {
    let width = style.page_width();
    let height = style.page_height();
    let mut content = PageContent::default();

    let max_width = width * 0.8;
    let (size, lines) = fit_text(&page.title, Font::HelveticaBold, 32.0, 14.0, max_width);
    let line_height = size * 1.25;

    // Title block sits slightly above the middle; summary and date follow it
    let mut y = height * 0.6 + (lines.len() as f32 - 1.0) * line_height / 2.0;
    for line in &lines {
        content.centered(Font::HelveticaBold, size, width, y, line);
        y -= line_height;
    }

    y -= 24.0;
    content.centered(Font::Helvetica, 14.0, width, y, &page.summary());

    if let Some(date) = page.date {
        y -= 22.0;
        content.centered(Font::Helvetica, 12.0, width, y, &format_date(&date));
    }

    build_document(vec![content], style)
}

/// Render the table of contents pages laid out by `compute_layout`
///
/// `entries` must be the list the layout was computed for; their start pages
/// are printed right-aligned after a dot leader.
pub fn render_toc(layout: &TocLayout, entries: &[Entry], style: &TocStyle) -> Document {
    let left = style.margins.left.pt();
    let right = style.right_edge();
    let font = Font::Helvetica;
    let size = style.entry_font_size;

    let pages = layout
        .pages
        .iter()
        .enumerate()
        .map(|(index, toc_page)| {
            let mut content = PageContent::default();
            if index == 0 {
                content.centered(
                    Font::HelveticaBold,
                    style.heading_font_size,
                    style.page_width(),
                    style.top_y(),
                    &style.heading,
                );
            }

            for line in &toc_page.lines {
                if line.continuation {
                    content.text(font, size, left + style.indent, line.y, &line.text);
                    continue;
                }

                content.text(font, size, left, line.y, &line.text);

                let text_end = left + text_width(&line.text, font, size);
                let leader_width = right - style.page_number_width - text_end;
                let dots = (leader_width / style.dot_spacing).max(0.0) as usize;
                content.leader(font, size, text_end, line.y, dots, style.dot_spacing);

                if let Some(entry) = entries.get(line.entry) {
                    let number = entry.start_page.to_string();
                    let x = right - text_width(&number, font, size);
                    content.text(font, size, x, line.y, &number);
                }
            }
            content
        })
        .collect();

    build_document(pages, style)
}

/// Render a separator page naming the document that follows
pub fn render_separator_page(name: &str, style: &TocStyle) -> Document {
    let width = style.page_width();
    let height = style.page_height();
    let max_width = width * 0.8;
    let (size, lines) = fit_text(name, Font::Helvetica, 24.0, 12.0, max_width);
    let line_height = size * 1.25;

    let mut content = PageContent::default();
    let mut y = (height + size) / 2.0 + (lines.len() as f32 - 1.0) * line_height / 2.0;
    for line in &lines {
        content.centered(Font::Helvetica, size, width, y, line);
        y -= line_height;
    }

    build_document(vec![content], style)
}

/// Font dictionary for a standard font with WinAnsiEncoding
pub(crate) fn standard_font(font: Font) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_name(),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Assemble page contents into a standalone document sharing one font resource set
fn build_document(pages: Vec<PageContent>, style: &TocStyle) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(standard_font(Font::Helvetica));
    let bold_id = doc.add_object(standard_font(Font::HelveticaBold));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Helvetica.resource_name() => regular_id,
            Font::HelveticaBold.resource_name() => bold_id,
        },
    });

    let media_box = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(style.page_width()),
        Object::Real(style.page_height()),
    ];

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, page.ops.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box.clone(),
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc
}
