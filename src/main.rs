use std::env;
use std::path::Path;
use std::process::ExitCode;

use sable::{bench, uci};

fn parse_or<T: std::str::FromStr>(arg: Option<&String>, default: T) -> T {
    arg.and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("bench-perft") => {
            let Some(file) = args.get(2) else {
                eprintln!("usage: sable bench-perft <file> [max_depth] [hash_mb]");
                return ExitCode::FAILURE;
            };
            let max_depth = parse_or(args.get(3), 0);
            let hash_mb = parse_or(args.get(4), 256);
            if bench::bench_perft(Path::new(file), max_depth, hash_mb) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Some("bench-wac") => {
            let Some(file) = args.get(2) else {
                eprintln!("usage: sable bench-wac <file> [movetime_ms] [hash_mb] [filter]");
                return ExitCode::FAILURE;
            };
            let movetime_ms = parse_or(args.get(3), 1000);
            let hash_mb = parse_or(args.get(4), 256);
            let filter = args.get(5).map(String::as_str);
            if bench::bench_wac(Path::new(file), movetime_ms, hash_mb, filter) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        _ => {
            uci::run();
            ExitCode::SUCCESS
        }
    }
}
