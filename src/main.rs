use mat5_codec::{Element, MatReader, Value};
use std::env;
use std::fs::File;
use std::io::BufReader;

fn describe(element: &Element) -> String {
    match &element.value {
        Value::Int(v) => format!("{} scalar {}", element.data_type, v),
        Value::UInt(v) => format!("{} scalar {}", element.data_type, v),
        Value::Float(v) => format!("{} scalar {}", element.data_type, v),
        Value::Array(data) => format!("{} array of {} values", element.data_type, data.len()),
        Value::Text(text) => format!("{} text {:?}", element.data_type, text),
        Value::Matrix(m) => {
            let dims: Vec<String> = m.dims.iter().map(i32::to_string).collect();
            let mut line = format!("{} {} {}", m.name, dims.join("x"), m.class);
            if m.is_complex {
                line.push_str(" complex");
            }
            if m.is_logical {
                line.push_str(" logical");
            }
            if m.is_global {
                line.push_str(" global");
            }
            if let Some(text) = m.to_text() {
                line.push_str(&format!(" {:?}", text));
            }
            line
        }
        Value::Compressed(inner) => format!("compressed {}", describe(inner)),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-mat-file> [--limit <N>]", args[0]);
        std::process::exit(1);
    }

    let mat_path = &args[1];
    let mut limit = usize::MAX;
    // Parse --limit argument
    if let Some(limit_idx) = args.iter().position(|arg| arg == "--limit") {
        match args.get(limit_idx + 1).map(|s| s.parse::<usize>()) {
            Some(Ok(n)) => limit = n,
            Some(Err(_)) => {
                eprintln!("ERROR: --limit expects a number.");
                std::process::exit(1);
            }
            None => {
                eprintln!("ERROR: --limit flag requires an argument.");
                std::process::exit(1);
            }
        }
    }

    let file = match File::open(mat_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("ERROR: Failed to open {}: {}", mat_path, e);
            std::process::exit(1);
        }
    };

    let mut reader = match MatReader::new(BufReader::new(file)) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("\nERROR: Failed to read MAT-file header");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", reader.header());
    println!("  Byte order: {:?}", reader.byte_order());
    println!("{}", "=".repeat(60));

    let mut count = 0;
    for result in reader.elements().take(limit) {
        count += 1;
        match result {
            Ok(element) => println!("  {}. {}", count, describe(&element)),
            Err(e) if e.is_resumable() => println!("  {}. skipped: {}", count, e),
            Err(e) => {
                eprintln!("\nERROR: Failed to read element {}", count);
                eprintln!("  {}", e);
                std::process::exit(1);
            }
        }
    }

    println!("{}", "=".repeat(60));
    println!("{} elements", count);
}
