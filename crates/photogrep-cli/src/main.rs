//! Photogrep CLI - prefix search over the text inside your photos.
//!
//! # Usage
//!
//! ```bash
//! # Make a directory of photos searchable (reads OCR sidecars)
//! pg sync ~/Pictures/export
//!
//! # Search recognized text by prefix
//! pg search rec
//! pg search sun --json
//!
//! # Show cache and index counters
//! pg status
//! ```

mod config;
mod library;
mod ocr;
mod output;
mod search;
mod status;
mod sync;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Photogrep prefix-search CLI.
///
/// Finds photos by the text recognized inside them. `sync` reads OCR
/// sidecar files and fills a durable cache; `search` answers from the
/// cache alone.
#[derive(Parser)]
#[command(name = "pg", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Custom data directory (default: platform standard location)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a photo directory against the OCR cache
    Sync {
        /// Directory holding images and their `.ocr.json` sidecars
        library_dir: PathBuf,

        /// Maximum concurrent extractions
        #[arg(long)]
        concurrency: Option<usize>,

        /// Per-image OCR timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Search cached photo text by prefix
    Search {
        /// Prefix to look up
        term: String,

        /// Maximum number of results to return
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show cache and index counters
    Status {
        /// Output counters as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Sync {
            library_dir,
            concurrency,
            timeout_secs,
        } => {
            let report =
                sync::run_sync(&library_dir, cli.data_dir.as_ref(), concurrency, timeout_secs)
                    .await?;
            println!("{}", output::format_sync_report(&report));
        }
        Commands::Search { term, limit, json } => {
            let hits = search::execute_search(&term, limit, cli.data_dir.as_ref()).await?;
            let rendered = if json {
                output::format_json(&term, &hits)
            } else {
                output::format_human(&term, &hits)
            };
            println!("{}", rendered);
        }
        Commands::Status { json } => {
            let report = status::gather_status(cli.data_dir.as_ref()).await?;
            let rendered = if json {
                output::format_status_json(&report)
            } else {
                output::format_status(&report)
            };
            println!("{}", rendered);
        }
    }

    Ok(())
}
