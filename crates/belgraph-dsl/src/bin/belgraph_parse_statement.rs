use std::{env, fs};

use belgraph_dsl::grammar::parse_statement;
use belgraph_dsl::source::{logical_lines, streamline};

/// Prints the canonical form of every statement line in a file, skipping
/// control lines. Names are not resolved.
fn main() {
    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: belgraph_parse_statement <file.bel>");
        std::process::exit(2);
    };
    if args.next().is_some() {
        eprintln!("usage: belgraph_parse_statement <file.bel>");
        std::process::exit(2);
    }

    let text = match fs::read_to_string(&path) {
        Ok(v) => v,
        Err(err) => {
            eprintln!("failed to read `{path}`: {err}");
            std::process::exit(2);
        }
    };

    let mut failures = 0usize;
    for line in logical_lines(&text) {
        let normalized = streamline(&line.text);
        if normalized.starts_with("SET ")
            || normalized.starts_with("UNSET ")
            || normalized.starts_with("DEFINE ")
        {
            continue;
        }
        match parse_statement(&normalized) {
            Ok(statement) => println!("{}: {statement}", line.number),
            Err(err) => {
                failures += 1;
                eprintln!("{}: {err}", line.number);
            }
        }
    }
    if failures > 0 {
        std::process::exit(1);
    }
}
