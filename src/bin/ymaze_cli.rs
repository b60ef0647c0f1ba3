use serde::Serialize;
use std::{env, fs, path::Path};
use ymaze_scheduler::export::{schedule_text, write_combined_csv, write_day_csvs};
use ymaze_scheduler::roster::parse_roster_text;
use ymaze_scheduler::schedule::{ScheduleRequest, capabilities, generate_schedule};

fn usage() {
    eprintln!(
        "Usage:\n  \
  ymaze_cli --version\n  \
  ymaze_cli capabilities\n  \
  ymaze_cli parse-roster FILE\n  \
  ymaze_cli generate '<request-json>'\n  \
  ymaze_cli generate-text '<request-json>'\n  \
  ymaze_cli export-csv '<request-json>' OUTPUT_DIR\n  \
  ymaze_cli export-combined-csv '<request-json>' OUTPUT.csv\n\n  \
  Tip: pass @file.json instead of inline JSON"
    );
}

fn load_json_arg(value: &str) -> Result<String, String> {
    if let Some(path) = value.strip_prefix('@') {
        fs::read_to_string(path).map_err(|e| format!("Could not read JSON file '{path}': {e}"))
    } else {
        Ok(value.to_string())
    }
}

fn load_request(value: &str) -> Result<ScheduleRequest, String> {
    let json = load_json_arg(value)?;
    serde_json::from_str(&json).map_err(|e| format!("Invalid request JSON: {e}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("ymaze_cli {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let command = &args[1];
    match command.as_str() {
        "capabilities" => print_json(&capabilities()),
        "parse-roster" => {
            if args.len() <= 2 {
                usage();
                return Err("Missing roster file".to_string());
            }
            let path = &args[2];
            let text = fs::read_to_string(path)
                .map_err(|e| format!("Could not read roster file '{path}': {e}"))?;
            let animals = parse_roster_text(&text);
            if animals.is_empty() {
                return Err(format!("No valid animal rows parsed from '{path}'"));
            }
            print_json(&animals)
        }
        "generate" => {
            if args.len() <= 2 {
                usage();
                return Err("Missing request JSON".to_string());
            }
            let request = load_request(&args[2])?;
            let result = generate_schedule(&request).map_err(|e| e.to_string())?;
            print_json(&result)
        }
        "generate-text" => {
            if args.len() <= 2 {
                usage();
                return Err("Missing request JSON".to_string());
            }
            let request = load_request(&args[2])?;
            let result = generate_schedule(&request).map_err(|e| e.to_string())?;
            println!("{}", schedule_text(&result));
            Ok(())
        }
        "export-csv" => {
            if args.len() <= 3 {
                usage();
                return Err("export-csv requires: '<request-json>' OUTPUT_DIR".to_string());
            }
            let request = load_request(&args[2])?;
            let dir = Path::new(&args[3]);
            let result = generate_schedule(&request).map_err(|e| e.to_string())?;
            let written = write_day_csvs(&result, dir).map_err(|e| e.to_string())?;
            println!("Wrote {} CSV file(s) to '{}'", written.len(), dir.display());
            Ok(())
        }
        "export-combined-csv" => {
            if args.len() <= 3 {
                usage();
                return Err("export-combined-csv requires: '<request-json>' OUTPUT.csv".to_string());
            }
            let request = load_request(&args[2])?;
            let path = Path::new(&args[3]);
            let result = generate_schedule(&request).map_err(|e| e.to_string())?;
            write_combined_csv(&result, path).map_err(|e| e.to_string())?;
            println!("Wrote combined CSV to '{}'", path.display());
            Ok(())
        }
        _ => {
            usage();
            Err(format!("Unknown command '{command}'"))
        }
    }
}
