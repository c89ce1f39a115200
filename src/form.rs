//! AcroForm field discovery and filling
//!
//! Field names are fully qualified (`parent.child`) as built by walking the
//! `/Fields` array and each field's `/Kids`. Values are written into the
//! field dictionaries themselves, so a field is updated on whatever page its
//! widget sits.

use crate::writer::format_value;
use crate::SheetPdfError;
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::BTreeMap;
use std::path::Path;

/// Field tree depth limit
const MAX_FIELD_DEPTH: usize = 32;

/// Result of a form fill
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormFillReport {
    /// Field names that received a value, in fill order
    pub filled: Vec<String>,
    /// Requested field names that do not exist in the template
    pub skipped: Vec<String>,
}

/// Map of fully qualified field name to field object
pub fn list_fields(doc: &Document) -> BTreeMap<String, ObjectId> {
    let mut fields = BTreeMap::new();

    let Some(acroform) = acroform_dict(doc) else {
        return fields;
    };
    let roots = match acroform.get(b"Fields") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => return fields,
        },
        _ => return fields,
    };

    for root in &roots {
        if let Object::Reference(id) = root {
            collect_fields(doc, *id, None, 0, &mut fields);
        }
    }
    fields
}

fn collect_fields(
    doc: &Document,
    id: ObjectId,
    parent_name: Option<&str>,
    depth: usize,
    out: &mut BTreeMap<String, ObjectId>,
) {
    if depth > MAX_FIELD_DEPTH {
        return;
    }
    let Ok(dict) = doc.get_dictionary(id) else {
        return;
    };

    // Widgets without /T belong to their parent field
    let name = match dict.get(b"T") {
        Ok(Object::String(bytes, _)) => {
            let part = decode_pdf_string(bytes);
            let full = match parent_name {
                Some(parent) => format!("{}.{}", parent, part),
                None => part,
            };
            out.insert(full.clone(), id);
            Some(full)
        }
        _ => parent_name.map(str::to_string),
    };

    if let Ok(Object::Array(kids)) = dict.get(b"Kids") {
        for kid in kids {
            if let Object::Reference(kid_id) = kid {
                collect_fields(doc, *kid_id, name.as_deref(), depth + 1, out);
            }
        }
    }
}

/// Whether the PDF at `path` defines any form fields
pub fn has_form_fields<P: AsRef<Path>>(path: P) -> Result<bool, SheetPdfError> {
    let doc = Document::load(path)?;
    Ok(!list_fields(&doc).is_empty())
}

/// Current `/V` of every field, decoded as text where it is a string or name
pub fn field_values<P: AsRef<Path>>(
    path: P,
) -> Result<BTreeMap<String, Option<String>>, SheetPdfError> {
    let doc = Document::load(path)?;
    let values = list_fields(&doc)
        .into_iter()
        .map(|(name, id)| {
            let value = doc
                .get_dictionary(id)
                .ok()
                .and_then(|dict| dict.get(b"V").ok())
                .and_then(|v| match v {
                    Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
                    Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
                    _ => None,
                });
            (name, value)
        })
        .collect();
    Ok(values)
}

/// Copy `template` to `output`, writing `numbers[i]` into the field named
/// `field_names[i]` for every index both lists cover. Unknown names are
/// logged and skipped.
pub fn fill_pdf_form<P: AsRef<Path>, Q: AsRef<Path>>(
    template: P,
    output: Q,
    numbers: &[f64],
    field_names: &[String],
) -> Result<FormFillReport, SheetPdfError> {
    let output = output.as_ref();
    let mut doc = Document::load(template)?;
    let fields = list_fields(&doc);
    let mut report = FormFillReport::default();

    if !fields.is_empty() {
        for (name, &value) in field_names.iter().zip(numbers) {
            match fields.get(name) {
                Some(&id) => {
                    let dict = doc.get_object_mut(id)?.as_dict_mut()?;
                    dict.set(
                        "V",
                        Object::String(format_value(value).into_bytes(), StringFormat::Literal),
                    );
                    report.filled.push(name.clone());
                }
                None => {
                    log::warn!("Form field '{}' not found in template, skipping", name);
                    report.skipped.push(name.clone());
                }
            }
        }

        if !report.filled.is_empty() {
            request_appearance_rebuild(&mut doc)?;
        }
    }

    doc.save(output)?;
    log::info!("PDF with filled form fields saved: {}", output.display());
    Ok(report)
}

fn acroform_dict(doc: &Document) -> Option<&Dictionary> {
    match doc.catalog().ok()?.get(b"AcroForm").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Set `/NeedAppearances true` so viewers draw the new values
fn request_appearance_rebuild(doc: &mut Document) -> Result<(), SheetPdfError> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    let acroform_ref = match doc.get_dictionary(root_id)?.get(b"AcroForm") {
        Ok(Object::Reference(id)) => Some(*id),
        Ok(Object::Dictionary(_)) => None,
        _ => {
            return Err(SheetPdfError::InvalidStructure(
                "catalog has no AcroForm".to_string(),
            ))
        }
    };

    let acroform = match acroform_ref {
        Some(id) => doc.get_object_mut(id)?.as_dict_mut()?,
        None => doc
            .get_object_mut(root_id)?
            .as_dict_mut()?
            .get_mut(b"AcroForm")?
            .as_dict_mut()?,
    };
    acroform.set("NeedAppearances", Object::Boolean(true));
    Ok(())
}

/// Decode a PDF text string: UTF-16BE with BOM, otherwise byte-per-char
pub(crate) fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| char::from(b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pdf_string() {
        assert_eq!(decode_pdf_string(b"field1"), "field1");
        assert_eq!(
            decode_pdf_string(&[0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42]),
            "AB"
        );
        assert_eq!(decode_pdf_string(&[0x66, 0xE9]), "fé");
    }

    #[test]
    fn test_list_fields_without_acroform() {
        let doc = Document::with_version("1.5");
        assert!(list_fields(&doc).is_empty());
    }
}
