//! Page number footers written directly into page content streams
//!
//! Each page's existing content is wrapped in a `q`/`Q` pair so any
//! transformation it leaves behind is undone before the footer is drawn. The
//! footer then uses the page's own coordinate system.

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use crate::error::Result;
use crate::pdf::render::standard_font;
use crate::text::{pdf_literal, text_width, Font};

/// Resource name for the footer font, chosen to avoid clashing with page fonts
const FOOTER_FONT: &str = "PbFooter";

/// Footer appearance
#[derive(Debug, Clone)]
pub struct FooterStyle {
    pub font_size: f32,
    /// Baseline distance from the bottom of the media box
    pub bottom_offset: f32,
}

impl Default for FooterStyle {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            bottom_offset: 30.0,
        }
    }
}

/// Stamp "Page N of M" centered at the bottom of every page
pub fn stamp_page_numbers(doc: &mut Document, style: &FooterStyle) -> Result<()> {
    let font_id = doc.add_object(standard_font(Font::Helvetica));

    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let total = pages.len();

    for (index, page_id) in pages.into_iter().enumerate() {
        let label = format!("Page {} of {}", index + 1, total);
        let [x0, y0, x1, _] = media_box(doc, page_id)?;

        let x = x0 + ((x1 - x0) - text_width(&label, Font::Helvetica, style.font_size)) / 2.0;
        let y = y0 + style.bottom_offset;
        let footer = format!(
            "q\n0 g\nBT\n/{} {} Tf\n1 0 0 1 {:.2} {:.2} Tm\n({}) Tj\nET\nQ\n",
            FOOTER_FONT,
            style.font_size,
            x,
            y,
            pdf_literal(&label)
        );

        isolate_page_content(doc, page_id)?;
        add_font_to_page_resources(doc, page_id, font_id)?;

        let footer_id = doc.add_object(Stream::new(Dictionary::new(), footer.into_bytes()));
        append_content_to_page(doc, page_id, footer_id)?;
    }

    Ok(())
}

/// Page media box as `[x0, y0, x1, y1]`, falling back to US Letter
fn media_box(doc: &Document, page_id: ObjectId) -> Result<[f32; 4]> {
    const LETTER: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

    let page = doc.get_dictionary(page_id)?;
    let Ok(value) = page.get(b"MediaBox") else {
        return Ok(LETTER);
    };
    let value = match value {
        Object::Reference(id) => doc.get_object(*id)?,
        other => other,
    };
    let Ok(numbers) = value.as_array() else {
        return Ok(LETTER);
    };

    let parsed: Vec<f32> = numbers.iter().filter_map(|n| n.as_float().ok()).collect();
    match parsed.as_slice() {
        &[a, b, c, d] => Ok([a.min(c), b.min(d), a.max(c), b.max(d)]),
        _ => Ok(LETTER),
    }
}

/// Resolve an object that may be stored inline or behind a reference
fn resolve_dictionary(doc: &Document, object: &Object) -> Dictionary {
    match object {
        Object::Dictionary(dict) => dict.clone(),
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        },
        _ => Dictionary::new(),
    }
}

/// Register the footer font in the page's own Resources dictionary
///
/// Resources shared through a reference are copied into the page so other
/// pages are not affected.
fn add_font_to_page_resources(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> Result<()> {
    let mut resources = {
        let page = doc.get_dictionary(page_id)?;
        match page.get(b"Resources") {
            Ok(res) => resolve_dictionary(doc, res),
            Err(_) => Dictionary::new(),
        }
    };

    let mut fonts = match resources.get(b"Font") {
        Ok(fonts) => resolve_dictionary(doc, fonts),
        Err(_) => Dictionary::new(),
    };
    fonts.set(FOOTER_FONT, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    let page = doc.get_dictionary_mut(page_id)?;
    page.set("Resources", Object::Dictionary(resources));

    Ok(())
}

/// Content stream references of a page, in drawing order
///
/// A Contents entry that refers to an array is flattened into the array's
/// elements.
fn content_refs(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page = doc.get_dictionary(page_id)?;
    let refs = match page.get(b"Contents") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(other) => vec![other.clone()],
        Err(_) => Vec::new(),
    };
    Ok(refs)
}

/// Number of `q` operators still open at the end of the page's content
fn unclosed_saves(doc: &Document, page_id: ObjectId) -> usize {
    let Ok(data) = doc.get_page_content(page_id) else {
        return 0;
    };
    let Ok(content) = Content::decode(&data) else {
        return 0;
    };
    content
        .operations
        .iter()
        .fold(0, |depth: usize, op| match op.operator.as_str() {
            "q" => depth + 1,
            "Q" => depth.saturating_sub(1),
            _ => depth,
        })
}

/// Wrap the page's existing content streams in `q` ... `Q`
///
/// Saves left open by the page are closed as well, so whatever follows the
/// wrapper starts from the page's initial graphics state.
fn isolate_page_content(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let existing = content_refs(doc, page_id)?;
    if existing.is_empty() {
        return Ok(());
    }

    let restore = format!("\n{}", "Q\n".repeat(unclosed_saves(doc, page_id) + 1));
    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let restore_id = doc.add_object(Stream::new(Dictionary::new(), restore.into_bytes()));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(restore_id));

    let page = doc.get_dictionary_mut(page_id)?;
    page.set("Contents", Object::Array(contents));

    Ok(())
}

/// Append a content stream to a page's Contents
///
/// Appended content is drawn on top of the original page.
fn append_content_to_page(doc: &mut Document, page_id: ObjectId, new_content_id: ObjectId) -> Result<()> {
    let mut contents = content_refs(doc, page_id)?;
    contents.push(Object::Reference(new_content_id));

    let page = doc.get_dictionary_mut(page_id)?;
    page.set("Contents", Object::Array(contents));

    Ok(())
}
