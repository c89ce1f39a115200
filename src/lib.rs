//! Spreadsheet numbers into PDF documents using lopdf
//!
//! This crate provides:
//! - Extraction of one numeric column from a CSV or XLSX file
//! - Filling of named AcroForm fields in a template
//! - Overlay of numbers at fixed positions, or a fresh numbered listing
//! - Opening the result in an external viewer with a fallback

pub mod config;
pub mod form;
pub mod inspect;
pub mod numbers;
pub mod viewer;
pub mod writer;

pub use config::{ColumnSpec, LayoutOptions, OverlayStyle, RunConfig};
pub use form::{fill_pdf_form, has_form_fields, FormFillReport};
pub use inspect::{text_runs, TextRun};
pub use numbers::{extract_numbers, read_numbers};
pub use viewer::{open_with_fallback, ViewerOutcome};
pub use writer::{create_pdf_with_numbers, format_value};

/// Which writer produced the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Template form fields were filled
    FormFill,
    /// Numbers were drawn over a template without form fields
    Overlay,
    /// No usable template, a numbered listing was generated
    NewDocument,
}

/// Outcome of one run of the pipeline
#[derive(Debug)]
pub struct RunReport {
    /// Numbers extracted from the input column
    pub numbers: Vec<f64>,
    /// Writer chosen, `None` when there was nothing to write
    pub mode: Option<WriteMode>,
    /// Whether the writer finished without error
    pub written: bool,
    /// Viewer result, `None` when no viewer was launched
    pub viewer: Option<ViewerOutcome>,
}

/// Whether a line read at the startup prompt asks for a run. Only the line
/// ending is ignored, so the answer must be exactly `1`.
pub fn confirms_run(answer: &str) -> bool {
    answer.trim_end_matches(['\r', '\n']) == "1"
}

/// Run the whole pipeline: extract, write, open.
///
/// Failures are logged and the run carries on with whatever it has. An
/// empty column ends the run before anything is written.
pub fn run(config: &RunConfig) -> RunReport {
    if let Ok(cwd) = std::env::current_dir() {
        log::info!("Current working directory: {}", cwd.display());
    }
    log::info!("File path being checked: {}", config.input_path.display());
    if let Ok(headers) = numbers::column_headers(&config.input_path) {
        log::info!("Columns: {:?}", headers);
    }

    let mut report = RunReport {
        numbers: read_numbers(&config.input_path, &config.column),
        mode: None,
        written: false,
        viewer: None,
    };

    if report.numbers.is_empty() {
        log::info!("No numbers to process. Exiting.");
        return report;
    }
    log::info!("Extracted numbers: {:?}", report.numbers);

    let template = config
        .template_path
        .as_deref()
        .filter(|path| path.exists());

    let (mode, result) = match template {
        Some(template) => match has_form_fields(template) {
            Ok(true) => (
                WriteMode::FormFill,
                fill_pdf_form(
                    template,
                    &config.output_path,
                    &report.numbers,
                    &config.form_fields,
                )
                .map(|_| ()),
            ),
            Ok(false) => (
                WriteMode::Overlay,
                create_pdf_with_numbers(
                    &report.numbers,
                    &config.output_path,
                    Some(template),
                    &config.coordinates,
                    &config.layout,
                ),
            ),
            Err(e) => (WriteMode::Overlay, Err(e)),
        },
        None => (
            WriteMode::NewDocument,
            create_pdf_with_numbers(
                &report.numbers,
                &config.output_path,
                None,
                &[],
                &config.layout,
            ),
        ),
    };

    report.mode = Some(mode);
    match result {
        Ok(()) => report.written = true,
        Err(e) if mode == WriteMode::FormFill => log::error!("Error filling PDF form: {}", e),
        Err(e) => log::error!("Error creating PDF: {}", e),
    }

    if config.launch_viewer {
        report.viewer = Some(open_with_fallback(
            &config.output_path,
            &config.primary_viewer,
            &config.fallback_viewer,
        ));
    }

    report
}

#[derive(Debug, thiserror::Error)]
pub enum SheetPdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Unsupported file format: {0}. Use .csv or .xlsx")]
    UnsupportedFormat(String),
    #[error("Column index {index} out of range ({count} columns)")]
    ColumnIndexOutOfRange { index: usize, count: usize },
    #[error("Column '{0}' not found in file")]
    ColumnNotFound(String),
    #[error("Workbook has no worksheets")]
    NoWorksheet,
    #[error("Invalid PDF structure: {0}")]
    InvalidStructure(String),
}

impl From<lopdf::Error> for SheetPdfError {
    fn from(e: lopdf::Error) -> Self {
        SheetPdfError::Pdf(e.to_string())
    }
}

impl From<calamine::XlsxError> for SheetPdfError {
    fn from(e: calamine::XlsxError) -> Self {
        SheetPdfError::Spreadsheet(e.to_string())
    }
}
