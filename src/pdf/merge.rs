//! PDF merging functionality using lopdf

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

// Page trees deeper than this are treated as cyclic
const MAX_TREE_DEPTH: usize = 64;

/// A merged document and the ids of its pages in reading order
#[derive(Debug)]
pub struct MergedDocument {
    pub document: Document,
    pub page_ids: Vec<ObjectId>,
}

/// Concatenate documents into one, keeping their page order
///
/// Based on the lopdf merge example: every document's objects are renumbered
/// past the previous ones, all pages are re-parented under a fresh page tree
/// and whatever the new catalog no longer reaches is pruned.
pub fn merge_documents(documents: Vec<Document>) -> Result<MergedDocument> {
    if documents.is_empty() {
        return Err(Error::General("No documents to merge".to_string()));
    }

    let version = documents
        .iter()
        .map(|doc| doc.version.clone())
        .max()
        .unwrap_or_else(|| "1.5".to_string());

    // Define a starting max_id for merged document
    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        // Pages are re-parented below, so they must carry inherited attributes themselves
        inherit_page_attributes(&mut doc)?;

        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        page_ids.extend(doc.get_pages().into_values());
        objects.extend(doc.objects);
    }

    let mut merged = Document::with_version(version.as_str());
    merged.objects.extend(objects);

    // new_object_id() must hand out ids above everything we just added
    merged.max_id = max_id - 1;

    let pages_id = merged.new_object_id();
    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => page_ids.len() as i64,
            "Kids" => kids,
        }),
    );

    let catalog_id = merged.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    merged.trailer.set("Root", Object::Reference(catalog_id));

    for &page_id in &page_ids {
        let page = merged.get_dictionary_mut(page_id)?;
        page.set("Parent", Object::Reference(pages_id));
    }

    // Old catalogs, page tree nodes and outlines are unreachable now
    let pruned = merged.prune_objects();
    debug!(pages = page_ids.len(), pruned = pruned.len(), "merged documents");

    Ok(MergedDocument {
        document: merged,
        page_ids,
    })
}

/// Copy inheritable attributes from ancestor page tree nodes onto each page
///
/// Pages that end up without a MediaBox get US Letter.
fn inherit_page_attributes(doc: &mut Document) -> Result<()> {
    for page_id in doc.get_pages().into_values() {
        let mut inherited: Vec<(&[u8], Object)> = Vec::new();
        {
            let page = doc.get_dictionary(page_id)?;
            let mut missing: Vec<&[u8]> = INHERITABLE.iter().copied().filter(|key| !page.has(key)).collect();
            let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
            let mut depth = 0;

            while let Some(node_id) = parent {
                if missing.is_empty() || depth >= MAX_TREE_DEPTH {
                    break;
                }
                let Ok(node) = doc.get_dictionary(node_id) else {
                    break;
                };
                missing.retain(|key| match node.get(key) {
                    Ok(value) => {
                        inherited.push((*key, value.clone()));
                        false
                    }
                    Err(_) => true,
                });
                parent = node.get(b"Parent").and_then(Object::as_reference).ok();
                depth += 1;
            }
        }

        let page = doc.get_dictionary_mut(page_id)?;
        for (key, value) in inherited {
            page.set(key, value);
        }
        if !page.has(b"MediaBox") {
            page.set("MediaBox", letter_media_box());
        }
    }

    Ok(())
}

fn letter_media_box() -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ])
}

/// Set the document information dictionary
pub fn set_document_info(doc: &mut Document, title: &str) {
    let mut info = Dictionary::new();
    info.set("Title", crate::pdf::outline::text_string(title));
    info.set(
        "Producer",
        Object::string_literal(format!("pdf-binder {}", env!("CARGO_PKG_VERSION"))),
    );
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", Object::Reference(info_id));
}

/// Compress and write `doc` to `path` through a temporary file in the same directory
///
/// The temporary file is removed if anything fails before it is renamed into place.
pub fn save_atomically(doc: &mut Document, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    doc.compress();
    doc.save_to(&mut temp)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Stream;
    use tempfile::TempDir;

    /// One-page-per-label document whose pages inherit MediaBox and Resources
    /// from the page tree root
    fn labelled_document(labels: &[&str]) -> Document {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let kids: Vec<Object> = labels
            .iter()
            .map(|label| {
                let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", label);
                let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                })
                .into()
            })
            .collect();

        doc.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => labels.len() as i64,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            }
            .into(),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn page_text(doc: &Document, page_id: ObjectId) -> String {
        let content = doc.get_page_content(page_id).unwrap();
        String::from_utf8_lossy(&content).into_owned()
    }

    #[test]
    fn test_merge_preserves_page_order() {
        let merged = merge_documents(vec![
            labelled_document(&["a1", "a2"]),
            labelled_document(&["b1"]),
            labelled_document(&["c1", "c2", "c3"]),
        ])
        .unwrap();

        assert_eq!(merged.page_ids.len(), 6);
        assert_eq!(merged.document.get_pages().len(), 6);

        let expected = ["a1", "a2", "b1", "c1", "c2", "c3"];
        for (page_id, label) in merged.page_ids.iter().zip(expected) {
            assert!(page_text(&merged.document, *page_id).contains(&format!("({})", label)));
        }
    }

    #[test]
    fn test_merge_copies_inherited_attributes() {
        let merged = merge_documents(vec![labelled_document(&["only"])]).unwrap();
        let page = merged.document.get_dictionary(merged.page_ids[0]).unwrap();

        assert!(page.has(b"Resources"));
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(media_box[2].as_i64().unwrap(), 595);
    }

    #[test]
    fn test_merge_empty_list() {
        assert!(merge_documents(Vec::new()).is_err());
    }

    #[test]
    fn test_save_atomically_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.pdf");
        let mut merged = merge_documents(vec![labelled_document(&["x", "y"])]).unwrap();
        set_document_info(&mut merged.document, "Handouts");

        save_atomically(&mut merged.document, &path).unwrap();

        let loaded = Document::load(&path).unwrap();
        assert_eq!(loaded.get_pages().len(), 2);
        let leftovers: Vec<_> = std::fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_save_atomically_failure_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        // A directory already occupies the output path, so the final rename fails
        let path = temp.path().join("taken.pdf");
        std::fs::create_dir(&path).unwrap();
        let mut merged = merge_documents(vec![labelled_document(&["x"])]).unwrap();

        let result = save_atomically(&mut merged.document, &path);

        assert!(matches!(result, Err(Error::Io(_))));
        let names: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["taken.pdf"]);
        assert!(path.is_dir());
    }
}
