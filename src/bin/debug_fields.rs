use sheet2pdf::form::field_values;
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: debug_fields <pdf_path>");
        std::process::exit(1);
    }

    let fields = match field_values(&args[1]) {
        Ok(fields) => fields,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("=== {} form fields ===", fields.len());
    for (name, value) in &fields {
        println!("  {:30} = {}", name, value.as_deref().unwrap_or("<empty>"));
    }
}
