//! Run configuration
//!
//! Everything the tool needs to know about one run lives here: input file,
//! column, output path, template, overlay coordinates, form field names and
//! viewer commands. Defaults match the workflow the tool was written for.

use std::fmt;
use std::path::PathBuf;

/// Which spreadsheet column to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSpec {
    /// Zero-based position in the header row
    Index(usize),
    /// Exact header text
    Name(String),
}

impl ColumnSpec {
    /// Interpret user input: an all-digit string is a position, anything
    /// else is a header name.
    pub fn parse(spec: &str) -> Self {
        if !spec.is_empty() && spec.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = spec.parse() {
                return ColumnSpec::Index(index);
            }
        }
        ColumnSpec::Name(spec.to_string())
    }
}

impl From<usize> for ColumnSpec {
    fn from(index: usize) -> Self {
        ColumnSpec::Index(index)
    }
}

impl From<&str> for ColumnSpec {
    fn from(spec: &str) -> Self {
        ColumnSpec::parse(spec)
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSpec::Index(i) => write!(f, "#{}", i),
            ColumnSpec::Name(n) => write!(f, "'{}'", n),
        }
    }
}

/// How numbers are placed over a template without form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayStyle {
    /// Keep the template pages and draw on top of page one
    #[default]
    StampTemplate,
    /// Emit one blank page per template page and draw on the first.
    /// The template's own content is not carried over.
    BlankPages,
}

/// Page geometry and typography for generated text
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Page width in points (US Letter)
    pub page_width: f32,
    /// Page height in points (US Letter)
    pub page_height: f32,
    /// Base-14 font used for every drawn string
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// X of the listing column in a fresh document
    pub list_x: f32,
    /// Y of the first listing line in a fresh document
    pub list_top: f32,
    /// Distance between listing lines
    pub line_height: f32,
    /// Treatment of templates without form fields
    pub overlay_style: OverlayStyle,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            font_name: "Helvetica".to_string(),
            font_size: 12.0,
            list_x: 100.0,
            list_top: 750.0,
            line_height: 20.0,
            overlay_style: OverlayStyle::StampTemplate,
        }
    }
}

/// Configuration for a single run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Spreadsheet to read (`.csv` or `.xlsx`)
    pub input_path: PathBuf,
    /// Column holding the numbers
    pub column: ColumnSpec,
    /// PDF to write; overwritten if present
    pub output_path: PathBuf,
    /// Optional template PDF
    pub template_path: Option<PathBuf>,
    /// Overlay positions on the template's first page, paired by index
    pub coordinates: Vec<(f32, f32)>,
    /// Form fields to fill, paired by index
    pub form_fields: Vec<String>,
    /// Viewer tried first
    pub primary_viewer: String,
    /// Viewer tried when the first one is missing or fails
    pub fallback_viewer: String,
    /// Open the output when done
    pub launch_viewer: bool,
    /// Page geometry and overlay treatment
    pub layout: LayoutOptions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("Testing.xlsx"),
            column: ColumnSpec::Index(1),
            output_path: PathBuf::from("output.pdf"),
            template_path: Some(PathBuf::from("blank.pdf")),
            coordinates: vec![(100.0, 700.0), (100.0, 650.0), (100.0, 600.0)],
            form_fields: vec![
                "field1".to_string(),
                "field2".to_string(),
                "field3".to_string(),
            ],
            primary_viewer: "evince".to_string(),
            fallback_viewer: "xdg-open".to_string(),
            launch_viewer: true,
            layout: LayoutOptions::default(),
        }
    }
}
