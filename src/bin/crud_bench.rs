//! CRUD benchmark: PostgreSQL vs Redis.
//!
//! Run:     `cargo run --release --bin crud-bench`
//! Large:   `cargo run --release --bin crud-bench -- --preset large`
//! Custom:  `cargo run --release --bin crud-bench -- --sizes 500,5000`
//! Simple:  `cargo run --release --bin crud-bench -- --no-availability`
//! JSON:    `cargo run --release --bin crud-bench -- --json > run.json`
//!
//! Connection settings come from `.env` / the environment
//! (`DB_HOST_POSTGRES`, `DB_PORT_POSTGRES`, `DB_USER_POSTGRES`,
//! `DB_PASSWORD_POSTGRES`, `DB_NAME_POSTGRES`, `DB_HOST_REDIS`,
//! `DB_PORT_REDIS`).

use std::path::PathBuf;
use std::process::ExitCode;

use crud_benchmarks::backend::{Phase, PostgresBackend, RedisBackend};
use crud_benchmarks::config::Config;
use crud_benchmarks::report::ChartRenderer;
use crud_benchmarks::runner::{Runner, LARGE_SIZES, SMALL_SIZES};
use crud_benchmarks::schema::{BenchmarkReport, RunMetadata, SizeResult};
use crud_benchmarks::{Error, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI parsing
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct Args {
    sizes: Vec<usize>,
    charts_dir: PathBuf,
    charts: bool,
    availability: bool,
    json: bool,
    quiet: bool,
}

fn parse_sizes(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.replace('_', "")
                .parse::<usize>()
                .map_err(|_| Error::Config(format!("invalid dataset size: {s:?}")))
        })
        .collect()
}

fn parse_args() -> Result<Args> {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        sizes: SMALL_SIZES.to_vec(),
        charts_dir: PathBuf::from("charts"),
        charts: true,
        availability: true,
        json: false,
        quiet: false,
    };

    let value = |i: usize, flag: &str| {
        args.get(i)
            .cloned()
            .ok_or_else(|| Error::Config(format!("{flag} expects a value")))
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sizes" => {
                i += 1;
                parsed.sizes = parse_sizes(&value(i, "--sizes")?)?;
            }
            "--preset" => {
                i += 1;
                parsed.sizes = match value(i, "--preset")?.as_str() {
                    "small" => SMALL_SIZES.to_vec(),
                    "large" => LARGE_SIZES.to_vec(),
                    other => {
                        return Err(Error::Config(format!(
                            "unknown preset {other:?} (expected small or large)"
                        )))
                    }
                };
            }
            "--charts-dir" => {
                i += 1;
                parsed.charts_dir = PathBuf::from(value(i, "--charts-dir")?);
            }
            "--no-charts" => parsed.charts = false,
            "--no-availability" => parsed.availability = false,
            "--json" => parsed.json = true,
            "-q" => parsed.quiet = true,
            other => eprintln!("Unknown argument: '{}', ignoring", other),
        }
        i += 1;
    }

    Ok(parsed)
}

// ---------------------------------------------------------------------------
// Output formatters
// ---------------------------------------------------------------------------

fn print_size_table(r: &SizeResult) {
    eprintln!("====== {} records ======", r.size);
    eprintln!(
        "  {:<10} {:>10} {:>10} {:>10} {:>10} {:>9}",
        "backend", "create", "read", "update", "delete", "failures"
    );
    for b in r.backends() {
        let [c, rd, u, d] = b.as_array();
        eprintln!(
            "  {:<10} {:>7} ms {:>7} ms {:>7} ms {:>7} ms {:>9}",
            b.backend, c, rd, u, d, b.failures
        );
    }
    eprintln!();
}

fn print_quiet(r: &SizeResult) {
    let cells: Vec<String> = r
        .backends()
        .iter()
        .flat_map(|b| {
            Phase::ALL
                .iter()
                .map(move |&p| format!("{}/{}={}ms", b.backend, p, b.get(p)))
        })
        .collect();
    eprintln!("{}: {}", r.size, cells.join(" "));
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

async fn run(args: &Args) -> Result<()> {
    let config = Config::from_env()?;

    if !args.quiet {
        eprintln!("=== CRUD Benchmark: PostgreSQL vs Redis ===");
        eprintln!(
            "Sizes: {:?}, availability: {}",
            args.sizes,
            if args.availability { "on" } else { "off" }
        );
    }

    let relational = PostgresBackend::connect(&config.postgres, args.availability).await?;
    let key_value = RedisBackend::connect(&config.redis, args.availability).await?;
    let runner = Runner::new(relational, key_value, args.sizes.clone());

    let matrix = runner.run().await?;

    for result in &matrix {
        if args.quiet {
            print_quiet(result);
        } else {
            print_size_table(result);
        }
    }

    if args.json {
        let report = BenchmarkReport::new(RunMetadata::capture(args.availability), matrix.clone());
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        println!("{json}");
    }

    if args.charts {
        let written = ChartRenderer::new(args.charts_dir.clone()).render(&matrix)?;
        info!(count = written.len(), dir = %args.charts_dir.display(), "charts rendered");
    }

    if !args.quiet {
        eprintln!("=== CRUD benchmark complete ===");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match parse_args() {
        Ok(args) => run(&args).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
