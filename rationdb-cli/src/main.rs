use anyhow::{Context, Result};
use clap::Parser;
use rationdb_core::{init_logging, Store};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::{info, warn};

mod commands;
mod config;
mod seed;

use commands::execute_line;
use config::load_config;
use seed::load_seed;

#[derive(Parser)]
#[command(name = "rationdb")]
#[command(about = "Run JSON commands against an in-memory RationDB store")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "rationdb.toml")]
    config: PathBuf,

    /// JSON file mapping collection names to arrays of documents
    #[arg(long)]
    seed: Option<PathBuf>,

    /// File of line-delimited JSON commands (defaults to stdin)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, env = "RATIONDB_JSON_LOGS")]
    json_logs: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config, cli.verbose, cli.json_logs)?;
    init_logging(&config.logging)?;

    info!("RationDB v{} starting", env!("CARGO_PKG_VERSION"));

    let store = Store::with_config(config);
    if let Some(path) = &cli.seed {
        let count = load_seed(&store, path)?;
        info!("Loaded {} seed documents", count);
    }

    let input: Box<dyn BufRead> = match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut executed = 0usize;

    for line in input.lines() {
        let line = line.context("Failed to read command")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let result = execute_line(&store, line);
        writeln!(out, "{}", result).context("Failed to write result")?;
        executed += 1;
    }

    out.flush()?;

    let stats = store.slow_query_logger().get_stats();
    if stats.total_count > 0 {
        warn!(
            "{} slow queries (max {}ms, threshold {}ms)",
            stats.total_count, stats.max_duration_ms, stats.threshold_ms
        );
    }
    info!("Executed {} commands", executed);

    Ok(())
}
