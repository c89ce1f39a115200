//! Interactive entry point: put spreadsheet numbers into a PDF
//!
//! Asks for a script number on stdin and only runs when the answer is `1`.
//! Optional positional arguments override the built-in defaults.

use sheet2pdf::{confirms_run, run, ColumnSpec, RunConfig};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        eprintln!(
            "Usage: {} [input.csv|input.xlsx] [column] [output.pdf] [template.pdf|-]",
            args[0]
        );
        eprintln!();
        eprintln!("Reads one numeric column and writes it into a PDF form, over a");
        eprintln!("template, or as a fresh numbered list. '-' means no template.");
        process::exit(1);
    }

    let mut config = RunConfig::default();
    if let Some(input) = args.get(1) {
        config.input_path = PathBuf::from(input);
    }
    if let Some(column) = args.get(2) {
        config.column = ColumnSpec::parse(column);
    }
    if let Some(output) = args.get(3) {
        config.output_path = PathBuf::from(output);
    }
    if let Some(template) = args.get(4) {
        config.template_path = (template != "-").then(|| PathBuf::from(template));
    }

    print!("Input script");
    // Prompt visibility only; a failed flush does not change the answer
    let _ = io::stdout().flush();

    let mut answer = String::new();
    if let Err(e) = io::stdin().lock().read_line(&mut answer) {
        eprintln!("Error: could not read from stdin: {}", e);
        process::exit(1);
    }

    if confirms_run(&answer) {
        let report = run(&config);
        if let Some(mode) = report.mode {
            log::info!("Finished ({:?}, written: {})", mode, report.written);
        }
    }
}
