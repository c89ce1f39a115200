//! Read back the text drawn into a PDF
//!
//! Walks each page's content stream and records the literal strings shown by
//! text operators together with their position. Strings are decoded one byte
//! per character, which is exact for the WinAnsi base-14 fonts this crate
//! writes and approximate for anything else.

use crate::form::decode_pdf_string;
use crate::SheetPdfError;
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

/// A shown string with its position
#[derive(Debug, Clone)]
pub struct TextRun {
    /// The decoded string
    pub text: String,
    /// X position on page
    pub x: f32,
    /// Y position on page (PDF coordinates, origin at bottom-left)
    pub y: f32,
    /// Font resource name
    pub font: String,
    /// Font size
    pub font_size: f32,
    /// Page number (1-indexed)
    pub page: u32,
}

/// Text runs of every page of the PDF at `path`
pub fn text_runs<P: AsRef<Path>>(path: P) -> Result<Vec<TextRun>, SheetPdfError> {
    let doc = Document::load(path)?;
    text_runs_from_doc(&doc)
}

/// Text runs of every page of a loaded document
pub fn text_runs_from_doc(doc: &Document) -> Result<Vec<TextRun>, SheetPdfError> {
    let mut runs = Vec::new();
    for (page_num, &page_id) in doc.get_pages().iter() {
        runs.extend(page_text_runs(doc, page_id, *page_num)?);
    }
    Ok(runs)
}

/// Multiply two 2D transformation matrices `[a, b, c, d, e, f]`
fn multiply_matrices(m1: &[f32; 6], m2: &[f32; 6]) -> [f32; 6] {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn operand_text(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Array(items) => Some(items.iter().filter_map(operand_text).collect()),
        _ => None,
    }
}

fn page_text_runs(
    doc: &Document,
    page_id: ObjectId,
    page_num: u32,
) -> Result<Vec<TextRun>, SheetPdfError> {
    const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

    let content = Content::decode(&doc.get_page_content(page_id))?;
    let mut runs = Vec::new();

    let mut ctm = IDENTITY;
    let mut ctm_stack: Vec<[f32; 6]> = Vec::new();
    let mut font = String::new();
    let mut font_size: f32 = 12.0;
    let mut text_matrix = IDENTITY;
    let mut line_matrix = IDENTITY;

    for op in &content.operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => ctm_stack.push(ctm),
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    ctm = saved;
                }
            }
            "cm" if operands.len() >= 6 => {
                let mut m = IDENTITY;
                for (slot, operand) in m.iter_mut().zip(operands) {
                    *slot = get_number(operand).unwrap_or(*slot);
                }
                ctm = multiply_matrices(&m, &ctm);
            }
            "BT" => {
                text_matrix = IDENTITY;
                line_matrix = IDENTITY;
            }
            "Tf" if operands.len() >= 2 => {
                if let Ok(name) = operands[0].as_name() {
                    font = String::from_utf8_lossy(name).into_owned();
                }
                if let Some(size) = get_number(&operands[1]) {
                    font_size = size;
                }
            }
            "Td" | "TD" if operands.len() >= 2 => {
                let tx = get_number(&operands[0]).unwrap_or(0.0);
                let ty = get_number(&operands[1]).unwrap_or(0.0);
                line_matrix = multiply_matrices(&[1.0, 0.0, 0.0, 1.0, tx, ty], &line_matrix);
                text_matrix = line_matrix;
            }
            "Tm" if operands.len() >= 6 => {
                for (slot, operand) in text_matrix.iter_mut().zip(operands) {
                    *slot = get_number(operand).unwrap_or(*slot);
                }
                line_matrix = text_matrix;
            }
            "T*" => {
                line_matrix[5] -= font_size * 1.2;
                text_matrix = line_matrix;
            }
            "Tj" | "TJ" | "'" => {
                if op.operator == "'" {
                    line_matrix[5] -= font_size * 1.2;
                    text_matrix = line_matrix;
                }
                if let Some(text) = operands.first().and_then(operand_text) {
                    if !text.trim().is_empty() {
                        let combined = multiply_matrices(&text_matrix, &ctm);
                        runs.push(TextRun {
                            text,
                            x: combined[4],
                            y: combined[5],
                            font: font.clone(),
                            font_size,
                            page: page_num,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    Ok(runs)
}
