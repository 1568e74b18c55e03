//! Benchmark comparison tool.
//!
//! Compares two JSON reports printed by `crud-bench --json` and prints a table
//! of per-phase deltas for every (size, backend) pair present in both.
//!
//! Usage: `cargo run --bin bench-compare -- <baseline.json> <candidate.json>`

use std::collections::HashMap;

use crud_benchmarks::backend::Phase;
use crud_benchmarks::schema::{BackendTimings, BenchmarkReport};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <baseline.json> <candidate.json>", args[0]);
        std::process::exit(1);
    }

    let baseline = load_report(&args[1]);
    let candidate = load_report(&args[2]);

    let base_map = index(&baseline);
    let cand_map = index(&candidate);

    eprintln!("Baseline: {} ({})", args[1], baseline.metadata.timestamp);
    eprintln!("Candidate: {} ({})", args[2], candidate.metadata.timestamp);
    eprintln!();

    println!(
        "{:<28} | {:>10} | {:>10} | {:>10}",
        "Benchmark", "Base", "New", "Delta"
    );
    println!("{}", "-".repeat(72));

    let mut matched = 0u32;
    let mut only_cand = 0u32;

    for result in &candidate.results {
        for cand in result.backends() {
            match base_map.get(&(result.size, cand.backend.as_str())) {
                Some(base) => {
                    matched += 1;
                    for phase in Phase::ALL {
                        print_comparison(result.size, phase, base, cand);
                    }
                }
                None => only_cand += 1,
            }
        }
    }

    let only_base = base_map.keys().filter(|k| !cand_map.contains_key(*k)).count();

    println!("{}", "-".repeat(72));
    println!(
        "Compared: {} | Baseline only: {} | Candidate only: {}",
        matched, only_base, only_cand
    );
}

fn index(report: &BenchmarkReport) -> HashMap<(usize, &str), &BackendTimings> {
    report
        .results
        .iter()
        .flat_map(|r| r.backends().map(|b| ((r.size, b.backend.as_str()), b)))
        .collect()
}

fn load_report(path: &str) -> BenchmarkReport {
    let contents = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path, e);
        std::process::exit(1);
    });
    serde_json::from_str(&contents).unwrap_or_else(|e| {
        eprintln!("Error parsing {}: {}", path, e);
        std::process::exit(1);
    })
}

fn print_comparison(size: usize, phase: Phase, base: &BackendTimings, cand: &BackendTimings) {
    let base_ms = base.get(phase);
    let cand_ms = cand.get(phase);
    let delta_pct = if base_ms > 0 {
        ((cand_ms as f64 - base_ms as f64) / base_ms as f64) * 100.0
    } else {
        0.0
    };

    let hint = if delta_pct < -1.0 {
        "faster"
    } else if delta_pct > 1.0 {
        "slower"
    } else {
        "~same"
    };

    let name = format!("{}/{}/{}", cand.backend, phase, format_num(size as u64));
    println!(
        "{:<28} | {:>7} ms | {:>7} ms | {:>+.1}% ({})",
        name, base_ms, cand_ms, delta_pct, hint,
    );
}

fn format_num(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
