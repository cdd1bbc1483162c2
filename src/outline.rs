//! PDF post-processing built on top of `lopdf`: document outline and the
//! Info dictionary.

use std::collections::BTreeMap;

use log::debug;
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use crate::error::ReportError;
use crate::layout::HeadingMark;
use crate::metadata::Metadata;

/// Rewrites `pdf_bytes` with a flat outline for `headings` and the report
/// metadata in the Info dictionary.
///
/// Returns the input unchanged when there is nothing to add.
pub fn apply_document_extras(
    pdf_bytes: &[u8],
    headings: &[HeadingMark],
    metadata: &Metadata,
) -> Result<Vec<u8>, ReportError> {
    if headings.is_empty() && metadata.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut document = Document::load_mem(pdf_bytes)?;

    if !headings.is_empty() {
        let pages = document.get_pages();
        let mut entries = collect_outline_entries(&mut document, headings, &pages)?;
        let outlines_id = document.new_object_id();
        link_outline_entries(outlines_id, &mut document, &mut entries);
        insert_outlines_root(outlines_id, &mut document, &entries)?;
        debug!("Added {} outline entries", entries.len());
    }

    if !metadata.is_empty() {
        write_info(&mut document, metadata)?;
    }

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

struct OutlineEntry {
    object_id: ObjectId,
    page_ref: ObjectId,
    title: String,
}

fn collect_outline_entries(
    document: &mut Document,
    headings: &[HeadingMark],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<OutlineEntry>, ReportError> {
    let mut entries = Vec::with_capacity(headings.len());

    for heading in headings {
        let page_ref = u32::try_from(heading.page)
            .ok()
            .and_then(|page| pages.get(&page).copied())
            .ok_or_else(|| ReportError::MissingPage {
                title: heading.title.clone(),
                page_number: heading.page,
            })?;

        entries.push(OutlineEntry {
            object_id: document.new_object_id(),
            page_ref,
            title: heading.title.clone(),
        });
    }

    Ok(entries)
}

fn link_outline_entries(outlines_id: ObjectId, document: &mut Document, entries: &mut [OutlineEntry]) {
    for index in 0..entries.len() {
        let mut dictionary = Dictionary::new();
        dictionary.set("Title", text_string(&entries[index].title));
        dictionary.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(entries[index].page_ref),
                Object::Name("Fit".into()),
            ]),
        );
        dictionary.set("Parent", Object::Reference(outlines_id));

        if index > 0 {
            dictionary.set("Prev", Object::Reference(entries[index - 1].object_id));
        }
        if index + 1 < entries.len() {
            dictionary.set("Next", Object::Reference(entries[index + 1].object_id));
        }

        document
            .objects
            .insert(entries[index].object_id, Object::Dictionary(dictionary));
    }
}

fn insert_outlines_root(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &[OutlineEntry],
) -> Result<(), ReportError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| ReportError::MissingCatalog)?;

    let mut dictionary = Dictionary::new();
    dictionary.set("Type", Object::Name("Outlines".into()));
    dictionary.set("Count", Object::Integer(entries.len() as i64));
    if let Some(first) = entries.first() {
        dictionary.set("First", Object::Reference(first.object_id));
    }
    if let Some(last) = entries.last() {
        dictionary.set("Last", Object::Reference(last.object_id));
    }
    document
        .objects
        .insert(outlines_id, Object::Dictionary(dictionary));

    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .ok_or(ReportError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| ReportError::InvalidCatalog)?;
    catalog.set("Outlines", Object::Reference(outlines_id));
    catalog.set("PageMode", Object::Name("UseOutlines".into()));

    Ok(())
}

fn write_info(document: &mut Document, metadata: &Metadata) -> Result<(), ReportError> {
    let info_id = match document.trailer.get(b"Info").and_then(Object::as_reference) {
        Ok(id) => id,
        Err(_) => {
            let id = document.add_object(Dictionary::new());
            document.trailer.set("Info", Object::Reference(id));
            id
        }
    };

    let info = document.get_object_mut(info_id).and_then(Object::as_dict_mut)?;
    if let Some(author) = &metadata.author {
        info.set("Author", text_string(author));
    }
    if let Some(project) = &metadata.project {
        info.set("Title", text_string(project));
        info.set("Subject", text_string(&format!("Project: {}", project)));
    }
    if let Some(date) = &metadata.date {
        info.set("ReportDate", text_string(date));
    }
    Ok(())
}

/// Encodes `value` as a PDF text string, using UTF-16BE for non-ASCII text.
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::string_literal(value);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn two_page_pdf() -> Vec<u8> {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let kids: Vec<Object> = (0..2)
            .map(|_| {
                document
                    .add_object(dictionary! { "Type" => "Page", "Parent" => pages_id })
                    .into()
            })
            .collect();
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(2),
            }),
        );
        let catalog_id = document.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        document.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        document.save_to(&mut bytes).unwrap();
        bytes
    }

    fn heading(level: u8, title: &str, page: usize) -> HeadingMark {
        HeadingMark {
            level,
            title: title.to_owned(),
            page,
        }
    }

    #[test]
    fn nothing_to_add_keeps_bytes() {
        let bytes = two_page_pdf();
        let output = apply_document_extras(&bytes, &[], &Metadata::default()).unwrap();
        assert_eq!(output, bytes);
    }

    #[test]
    fn outline_entries_point_at_their_pages() {
        let headings = [heading(1, "Intro", 1), heading(2, "Details", 2)];
        let output = apply_document_extras(&two_page_pdf(), &headings, &Metadata::default()).unwrap();
        let document = Document::load_mem(&output).unwrap();

        let catalog_id = document.trailer.get(b"Root").unwrap().as_reference().unwrap();
        let catalog = document.get_dictionary(catalog_id).unwrap();
        let outlines_id = catalog.get(b"Outlines").unwrap().as_reference().unwrap();
        let outlines = document.get_dictionary(outlines_id).unwrap();
        assert_eq!(outlines.get(b"Count").unwrap().as_i64().unwrap(), 2);

        let last_id = outlines.get(b"Last").unwrap().as_reference().unwrap();
        let last = document.get_dictionary(last_id).unwrap();
        assert_eq!(last.get(b"Title").unwrap().as_str().unwrap(), b"Details");
        let dest = last.get(b"Dest").unwrap().as_array().unwrap();
        let pages = document.get_pages();
        assert_eq!(dest[0].as_reference().unwrap(), pages[&2]);
    }

    #[test]
    fn heading_on_missing_page_is_an_error() {
        let headings = [heading(1, "Ghost", 7)];
        let err = apply_document_extras(&two_page_pdf(), &headings, &Metadata::default()).unwrap_err();
        assert!(matches!(err, ReportError::MissingPage { page_number: 7, .. }));
    }

    #[test]
    fn metadata_lands_in_info_dictionary() {
        let metadata = Metadata {
            author: Some("Jane Doe".to_owned()),
            date: Some("01.05.2024".to_owned()),
            project: Some("Apollo".to_owned()),
        };
        let output = apply_document_extras(&two_page_pdf(), &[], &metadata).unwrap();
        let document = Document::load_mem(&output).unwrap();

        let info_id = document.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = document.get_dictionary(info_id).unwrap();
        assert_eq!(info.get(b"Author").unwrap().as_str().unwrap(), b"Jane Doe");
        assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"Apollo");
        assert_eq!(info.get(b"Subject").unwrap().as_str().unwrap(), b"Project: Apollo");
        assert_eq!(info.get(b"ReportDate").unwrap().as_str().unwrap(), b"01.05.2024");
    }

    #[test]
    fn non_ascii_titles_use_utf16() {
        match text_string("Übersicht") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(&bytes[..2], &[0xFE, 0xFF]);
                assert_eq!(&bytes[2..4], &[0x00, 0xDC]);
            }
            other => panic!("unexpected object {:?}", other),
        }
    }
}
