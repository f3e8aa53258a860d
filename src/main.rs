//! Replay driver CLI.
//!
//! `replay <event-log>` reconstructs the book from a log file and prints a
//! JSON summary. Exits non-zero with a diagnostic if the log cannot be
//! replayed.

use anyhow::Context;
use clap::{Parser, Subcommand};
use journal_matching_engine::{replay, Price, RestingOrder};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "journal-matching-engine")]
#[command(about = "Journaled limit order-book matching engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconstruct the book from an event log and print a summary
    Replay {
        /// Path to the event log file
        log: PathBuf,
    },
}

#[derive(serde::Serialize)]
struct ReplaySummary {
    sequence: u64,
    open_orders: usize,
    best_bid: Option<Price>,
    best_ask: Option<Price>,
    resting: Vec<RestingOrder>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Replay { log } => {
            let engine = replay::replay(&log)
                .with_context(|| format!("replay of {} failed", log.display()))?;
            let summary = ReplaySummary {
                sequence: engine.seq(),
                open_orders: engine.open_orders(),
                best_bid: engine.best_bid(),
                best_ask: engine.best_ask(),
                resting: engine.resting_orders(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
