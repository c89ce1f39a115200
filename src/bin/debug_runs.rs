use sheet2pdf::text_runs;
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: debug_runs <pdf_path> [page]");
        std::process::exit(1);
    }

    let only_page: Option<u32> = args.get(2).and_then(|p| p.parse().ok());

    let runs = match text_runs(&args[1]) {
        Ok(runs) => runs,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut current_page = 0;
    for run in runs
        .iter()
        .filter(|r| only_page.map_or(true, |p| r.page == p))
    {
        if run.page != current_page {
            current_page = run.page;
            println!("=== PAGE {} ===", current_page);
        }
        println!(
            "  x={:7.1} y={:7.1} font={:6} fs={:5.1} text={:?}",
            run.x, run.y, run.font, run.font_size, run.text
        );
    }
}
