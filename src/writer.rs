//! Overlay and listing output using lopdf
//!
//! Numbers are drawn as plain text in a base-14 font. With a template the
//! numbers go on the first page at caller-supplied positions; without one a
//! fresh Letter page lists them top to bottom.

use crate::config::{LayoutOptions, OverlayStyle};
use crate::SheetPdfError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::path::Path;

/// Resource name prefix for the font added to template pages
const OVERLAY_FONT_PREFIX: &str = "NumF";

/// Resource name of the font in generated documents
const LISTING_FONT_KEY: &str = "F1";

/// Page tree depth limit when looking up inherited resources
const MAX_TREE_DEPTH: usize = 32;

/// A string to draw at a position in default user space
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

/// Format a value the way every writer shows it: two decimals
pub fn format_value(value: f64) -> String {
    format!("{:.2}", value)
}

/// Pair coordinates with numbers by index, stopping at the shorter list
pub fn overlay_placements(numbers: &[f64], coordinates: &[(f32, f32)]) -> Vec<Placement> {
    coordinates
        .iter()
        .zip(numbers)
        .map(|(&(x, y), &value)| Placement {
            x,
            y,
            text: format_value(value),
        })
        .collect()
}

/// One `Number {n}: {value}` line per number, descending from the top
pub fn listing_placements(numbers: &[f64], layout: &LayoutOptions) -> Vec<Placement> {
    numbers
        .iter()
        .enumerate()
        .map(|(i, &value)| Placement {
            x: layout.list_x,
            y: layout.list_top - i as f32 * layout.line_height,
            text: format!("Number {}: {}", i + 1, format_value(value)),
        })
        .collect()
}

/// Write `numbers` to `output`, over `template` when it exists, otherwise as
/// a fresh listing. The output file is overwritten.
pub fn create_pdf_with_numbers<P: AsRef<Path>>(
    numbers: &[f64],
    output: P,
    template: Option<&Path>,
    coordinates: &[(f32, f32)],
    layout: &LayoutOptions,
) -> Result<(), SheetPdfError> {
    let output = output.as_ref();

    let mut doc = match template.filter(|path| path.exists()) {
        Some(template) => {
            let placements = overlay_placements(numbers, coordinates);
            match layout.overlay_style {
                OverlayStyle::StampTemplate => stamp_template(template, &placements, layout)?,
                OverlayStyle::BlankPages => {
                    let page_count = Document::load(template)?.get_pages().len();
                    build_document(page_count, &placements, layout)?
                }
            }
        }
        None => build_document(1, &listing_placements(numbers, layout), layout)?,
    };

    doc.save(output)?;
    log::info!("PDF created successfully: {}", output.display());
    Ok(())
}

/// Content operations drawing each placement in its own text object
fn text_operations(font_key: &str, font_size: f32, placements: &[Placement]) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(placements.len() * 5);
    for placement in placements {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![
                Object::Name(font_key.as_bytes().to_vec()),
                Object::Real(font_size),
            ],
        ));
        ops.push(Operation::new(
            "Td",
            vec![Object::Real(placement.x), Object::Real(placement.y)],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(
                encode_win_ansi(&placement.text),
                StringFormat::Literal,
            )],
        ));
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

/// Encode text for a WinAnsi base-14 font. Anything outside Latin-1 becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn font_dictionary(layout: &LayoutOptions) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => layout.font_name.as_str(),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Build a new document of `page_count` blank Letter pages (at least one)
/// with `placements` drawn on the first.
fn build_document(
    page_count: usize,
    placements: &[Placement],
    layout: &LayoutOptions,
) -> Result<Document, SheetPdfError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(font_dictionary(layout));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            LISTING_FONT_KEY => font_id,
        },
    });

    let mut kids = Vec::new();
    for page_index in 0..page_count.max(1) {
        let operations = if page_index == 0 {
            text_operations(LISTING_FONT_KEY, layout.font_size, placements)
        } else {
            Vec::new()
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => Object::Integer(kids.len() as i64),
        "Kids" => kids,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(layout.page_width),
            Object::Real(layout.page_height),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    Ok(doc)
}

/// Load `template` and draw `placements` over its first page, keeping every
/// page and its content.
fn stamp_template(
    template: &Path,
    placements: &[Placement],
    layout: &LayoutOptions,
) -> Result<Document, SheetPdfError> {
    let mut doc = Document::load(template)?;

    let first_page = doc.get_pages().values().next().copied();
    let page_id = match first_page {
        Some(id) if !placements.is_empty() => id,
        _ => return Ok(doc),
    };

    let font_id = doc.add_object(font_dictionary(layout));
    let font_key = add_font_resource(&mut doc, page_id, font_id)?;
    let operations = text_operations(&font_key, layout.font_size, placements);
    append_page_content(&mut doc, page_id, operations)?;

    Ok(doc)
}

/// Resources in effect for a page, following `/Parent` for inherited ones
fn effective_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary, SheetPdfError> {
    let mut node = doc.get_dictionary(page_id)?;
    for _ in 0..MAX_TREE_DEPTH {
        match node.get(b"Resources") {
            Ok(Object::Reference(id)) => return Ok(doc.get_dictionary(*id)?.clone()),
            Ok(Object::Dictionary(dict)) => return Ok(dict.clone()),
            _ => {}
        }
        match node.get(b"Parent") {
            Ok(Object::Reference(parent)) => node = doc.get_dictionary(*parent)?,
            _ => break,
        }
    }
    Ok(Dictionary::new())
}

/// Give the page its own resource dictionary containing `font_id` under a
/// fresh name, and return that name.
fn add_font_resource(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
) -> Result<String, SheetPdfError> {
    let mut resources = effective_resources(doc, page_id)?;
    let mut fonts = match resources.get(b"Font") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id)?.clone(),
        Ok(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };

    let font_key = (0..)
        .map(|n| format!("{}{}", OVERLAY_FONT_PREFIX, n))
        .find(|key| !fonts.has(key.as_bytes()))
        .unwrap_or_else(|| OVERLAY_FONT_PREFIX.to_string());

    fonts.set(font_key.as_bytes().to_vec(), Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Resources", Object::Dictionary(resources));

    Ok(font_key)
}

/// Append drawing operations after the page's content, wrapping what is
/// already there in a `q`/`Q` pair so its graphics state cannot leak.
fn append_page_content(
    doc: &mut Document,
    page_id: ObjectId,
    operations: Vec<Operation>,
) -> Result<(), SheetPdfError> {
    let existing = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(streams) => streams.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(streams)) => streams.clone(),
        _ => Vec::new(),
    };

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));

    let mut overlay = vec![Operation::new("Q", vec![])];
    overlay.extend(operations);
    // Streams are concatenated when read; keep the first token separate
    let mut overlay_bytes = b"\n".to_vec();
    overlay_bytes.extend(
        Content {
            operations: overlay,
        }
        .encode()?,
    );
    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), overlay_bytes));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(overlay_id));

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Contents", Object::Array(contents));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1.0), "1.00");
        assert_eq!(format_value(2.5), "2.50");
        assert_eq!(format_value(-3.0), "-3.00");
        assert_eq!(format_value(0.125), "0.12");
    }

    #[test]
    fn test_overlay_placements_stop_at_shorter_list() {
        let coords = [(100.0, 700.0), (100.0, 650.0), (100.0, 600.0)];
        let placements = overlay_placements(&[1.0, 2.0], &coords);
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[1].y, 650.0);
        assert_eq!(placements[1].text, "2.00");

        let placements = overlay_placements(&[1.0, 2.0, 3.0, 4.0], &coords[..1]);
        assert_eq!(placements.len(), 1);
    }

    #[test]
    fn test_listing_placements() {
        let layout = LayoutOptions::default();
        let placements = listing_placements(&[1.0, 2.0, 3.0], &layout);
        assert_eq!(placements.len(), 3);
        assert_eq!(placements[0].text, "Number 1: 1.00");
        assert_eq!(placements[2].text, "Number 3: 3.00");
        assert_eq!(placements[0].y, 750.0);
        assert_eq!(placements[2].y, 710.0);
        assert!(placements.iter().all(|p| p.x == 100.0));
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Number 1: 1.00"), b"Number 1: 1.00".to_vec());
        assert_eq!(encode_win_ansi("é"), vec![0xE9]);
        assert_eq!(encode_win_ansi("€"), b"?".to_vec());
    }

    #[test]
    fn test_build_document_page_count() {
        let layout = LayoutOptions::default();
        let doc = build_document(3, &[], &layout).unwrap();
        assert_eq!(doc.get_pages().len(), 3);

        let doc = build_document(0, &[], &layout).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
