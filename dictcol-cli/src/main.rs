//! Command-line driver for the dictcol engine.
//!
//! Builds a dictionary-encoded column from a text file (one value per
//! line), prints summary statistics, and optionally runs ad-hoc queries or
//! persists the encoded image. Exit code 0 on success, 1 on any fatal
//! error with a message on stderr.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use dictcol_core::Result;
use dictcol_ingest::BuildOptions;

#[derive(Parser, Debug)]
#[command(
    name = "dictcol",
    version,
    about = "Dictionary-encode a text column and query it"
)]
struct Cli {
    /// Input file: one value per line.
    input: PathBuf,

    /// Worker threads for the build (0 = available parallelism).
    #[arg(long, default_value_t = 0)]
    workers: usize,

    /// Retain original values (enables the baseline search variants;
    /// inflates memory by the input size).
    #[arg(long)]
    retain_originals: bool,

    /// Write the encoded image to this path after the build.
    #[arg(long)]
    save: Option<PathBuf>,

    /// Run an exact search for this value.
    #[arg(long)]
    find: Option<String>,

    /// Run a prefix search for this prefix.
    #[arg(long)]
    prefix: Option<String>,
}

fn init_tracing() {
    // The libraries emit `tracing` events (build progress, image stats).
    // Default to "off" so output only changes when the user opts in via
    // `RUST_LOG`.
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "off".into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let opts = BuildOptions {
        workers: cli.workers,
        retain_originals: cli.retain_originals,
        ..BuildOptions::default()
    };

    let started = Instant::now();
    let col = dictcol_ingest::build(&cli.input, &opts)?;
    let elapsed = started.elapsed();

    println!("Lines:             {}", col.encoded_len());
    println!("Distinct values:   {}", col.dictionary_size());
    println!("Compression ratio: {:.2}x", col.compression_ratio());
    println!(
        "Memory usage:      {:.2} MB",
        col.memory_usage() as f64 / (1024.0 * 1024.0)
    );
    println!("Build time:        {:.2}s", elapsed.as_secs_f64());

    if let Some(value) = cli.find.as_deref() {
        let positions = dictcol_query::find_simd(&col, value);
        println!("Exact {value:?}: {} match(es)", positions.len());
    }

    if let Some(prefix) = cli.prefix.as_deref() {
        let matches = dictcol_query::find_prefix_simd(&col, prefix);
        let total: usize = matches.iter().map(|(_, p)| p.len()).sum();
        println!(
            "Prefix {prefix:?}: {} value(s), {} position(s)",
            matches.len(),
            total
        );
        for (value, positions) in &matches {
            println!("  {value}: {}", positions.len());
        }
    }

    if let Some(path) = cli.save.as_deref() {
        dictcol_store::save(&col, path)?;
        println!("Image saved to {}", path.display());
    }

    Ok(())
}
