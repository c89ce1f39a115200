//! Numeric column extraction from CSV and XLSX files
//!
//! The first row of the sheet is the header row. One column is selected by
//! position or header name, and each cell that looks like a plain decimal
//! number is parsed into an `f64`. Everything else is dropped silently.

use crate::config::ColumnSpec;
use crate::SheetPdfError;
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::path::Path;

/// Spreadsheet formats the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Xlsx,
}

impl SheetFormat {
    /// Pick the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self, SheetPdfError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("csv") => Ok(SheetFormat::Csv),
            Some("xlsx") => Ok(SheetFormat::Xlsx),
            _ => Err(SheetPdfError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// A sheet loaded as strings: header row plus data rows
#[derive(Debug, Default)]
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Return the header row of a supported file
pub fn column_headers<P: AsRef<Path>>(path: P) -> Result<Vec<String>, SheetPdfError> {
    Ok(load_table(path.as_ref())?.headers)
}

/// Extract the numbers of one column, failing on unreadable input or a bad
/// column specifier.
pub fn extract_numbers<P: AsRef<Path>>(
    path: P,
    column: &ColumnSpec,
) -> Result<Vec<f64>, SheetPdfError> {
    let table = load_table(path.as_ref())?;
    let index = resolve_column(&table.headers, column)?;

    let numbers: Vec<f64> = table
        .rows
        .iter()
        .filter_map(|row| row.get(index))
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .filter_map(coerce_number)
        .collect();

    if numbers.is_empty() {
        log::warn!("No valid numbers found in column {}", column);
    }

    Ok(numbers)
}

/// Extract the numbers of one column, reporting any failure and returning
/// an empty list instead.
pub fn read_numbers<P: AsRef<Path>>(path: P, column: &ColumnSpec) -> Vec<f64> {
    let path = path.as_ref();
    log::info!("Checking if file exists: {}", path.exists());

    match extract_numbers(path, column) {
        Ok(numbers) => numbers,
        Err(e) => {
            log::error!("Error reading file: {}", e);
            Vec::new()
        }
    }
}

/// Accept plain integers and decimals.
///
/// At most one `.` and at most one `-` are removed; what remains must be a
/// non-empty run of ASCII digits. Exponents, thousands separators and
/// anything with two dots or two minus signs is rejected.
pub fn is_simple_number(text: &str) -> bool {
    let stripped = text.replacen('.', "", 1).replacen('-', "", 1);
    !stripped.is_empty() && stripped.bytes().all(|b| b.is_ascii_digit())
}

fn coerce_number(cell: &str) -> Option<f64> {
    if !is_simple_number(cell) {
        return None;
    }
    // "5-" or "-." pass the character check but are not numbers
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn resolve_column(headers: &[String], column: &ColumnSpec) -> Result<usize, SheetPdfError> {
    match column {
        ColumnSpec::Index(index) => {
            if *index >= headers.len() {
                Err(SheetPdfError::ColumnIndexOutOfRange {
                    index: *index,
                    count: headers.len(),
                })
            } else {
                Ok(*index)
            }
        }
        ColumnSpec::Name(name) => headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| SheetPdfError::ColumnNotFound(name.clone())),
    }
}

fn load_table(path: &Path) -> Result<Table, SheetPdfError> {
    match SheetFormat::from_path(path)? {
        SheetFormat::Csv => load_csv(path),
        SheetFormat::Xlsx => load_xlsx(path),
    }
}

fn load_csv(path: &Path) -> Result<Table, SheetPdfError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table { headers, rows })
}

fn load_xlsx(path: &Path) -> Result<Table, SheetPdfError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetPdfError::NoWorksheet)??;

    // The range starts at the first used cell; pad so positions count from column A
    let start_col = range.start().map_or(0, |(_, col)| col as usize);
    let mut rows = range.rows().map(|row| {
        std::iter::repeat_with(String::new)
            .take(start_col)
            .chain(row.iter().map(cell_to_string))
            .collect::<Vec<_>>()
    });

    let headers = rows.next().unwrap_or_default();
    Ok(Table {
        headers,
        rows: rows.collect(),
    })
}

/// Stringify a worksheet cell the way it would read in the sheet
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
