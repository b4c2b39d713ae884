//! Bookmarks (document outline)

use lopdf::{dictionary, Document, Object, ObjectId, StringFormat};
use crate::error::Result;

/// Encode a PDF text string
///
/// ASCII stays a literal string; anything else becomes UTF-16BE with a byte
/// order mark so viewers show it intact.
pub fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Add a flat outline with one bookmark per `(title, page)` pair
///
/// Replaces any existing outline and asks viewers to open the bookmarks pane.
pub fn add_bookmarks(doc: &mut Document, items: &[(String, ObjectId)]) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }

    let outline_id = doc.new_object_id();
    let item_ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

    for (i, ((title, page_id), item_id)) in items.iter().zip(&item_ids).enumerate() {
        let mut item = dictionary! {
            "Title" => text_string(title),
            "Parent" => outline_id,
            "Dest" => vec![
                Object::Reference(*page_id),
                Object::Name(b"XYZ".to_vec()),
                Object::Null,
                Object::Null,
                Object::Null,
            ],
        };
        if i > 0 {
            item.set("Prev", Object::Reference(item_ids[i - 1]));
        }
        if let Some(next) = item_ids.get(i + 1) {
            item.set("Next", Object::Reference(*next));
        }
        doc.objects.insert(*item_id, Object::Dictionary(item));
    }

    let mut outline = dictionary! {
        "Type" => "Outlines",
        "Count" => item_ids.len() as i64,
    };
    if let (Some(first), Some(last)) = (item_ids.first(), item_ids.last()) {
        outline.set("First", Object::Reference(*first));
        outline.set("Last", Object::Reference(*last));
    }
    doc.objects.insert(outline_id, Object::Dictionary(outline));

    let catalog = doc.catalog_mut()?;
    catalog.set("Outlines", Object::Reference(outline_id));
    catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));

    Ok(())
}

/// Read back the outline as `(title bytes, target page id)` pairs
pub fn read_bookmarks(doc: &Document) -> Result<Vec<(Vec<u8>, ObjectId)>> {
    let mut bookmarks = Vec::new();
    let Ok(outline_id) = doc.catalog()?.get(b"Outlines").and_then(Object::as_reference) else {
        return Ok(bookmarks);
    };

    let mut next = doc.get_dictionary(outline_id)?.get(b"First").and_then(Object::as_reference).ok();
    // Bounded by the object count so a cyclic Next chain cannot loop forever
    for _ in 0..doc.objects.len() {
        let Some(item_id) = next else {
            break;
        };
        let item = doc.get_dictionary(item_id)?;
        let title = item.get(b"Title")?.as_str()?.to_vec();
        let page = item.get(b"Dest")?.as_array()?
            .first()
            .and_then(|target| target.as_reference().ok());
        if let Some(page) = page {
            bookmarks.push((title, page));
        }
        next = item.get(b"Next").and_then(Object::as_reference).ok();
    }

    Ok(bookmarks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document_with_pages(count: usize) -> (Document, Vec<ObjectId>) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_ids: Vec<ObjectId> = (0..count)
            .map(|_| {
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                })
            })
            .collect();
        doc.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids.iter().map(|&id| id.into()).collect::<Vec<Object>>(),
                "Count" => count as i64,
            }
            .into(),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        (doc, page_ids)
    }

    #[test]
    fn test_text_string_ascii_is_literal() {
        let Object::String(bytes, format) = text_string("Intro (1)") else {
            panic!("expected a string");
        };
        assert_eq!(bytes, b"Intro (1)".to_vec());
        assert!(matches!(format, StringFormat::Literal));
    }

    #[test]
    fn test_text_string_unicode_is_utf16() {
        let Object::String(bytes, _) = text_string("é") else {
            panic!("expected a string");
        };
        assert_eq!(bytes, vec![0xFE, 0xFF, 0x00, 0xE9]);
    }

    #[test]
    fn test_add_bookmarks_links_items_in_order() {
        let (mut doc, pages) = document_with_pages(5);
        let items = vec![
            ("first".to_string(), pages[0]),
            ("second".to_string(), pages[2]),
            ("third".to_string(), pages[4]),
        ];

        add_bookmarks(&mut doc, &items).unwrap();

        let read = read_bookmarks(&doc).unwrap();
        assert_eq!(
            read,
            vec![
                (b"first".to_vec(), pages[0]),
                (b"second".to_vec(), pages[2]),
                (b"third".to_vec(), pages[4]),
            ]
        );
        assert!(doc.catalog().unwrap().has(b"Outlines"));
    }

    #[test]
    fn test_add_bookmarks_empty_is_noop() {
        let (mut doc, _) = document_with_pages(1);
        add_bookmarks(&mut doc, &[]).unwrap();
        assert!(!doc.catalog().unwrap().has(b"Outlines"));
        assert!(read_bookmarks(&doc).unwrap().is_empty());
    }
}
