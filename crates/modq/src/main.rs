//! modq - headless moderation queue replay
//!
//! Seeds the interaction engine from a JSON item file, replays an operator
//! script against the virtual clock and prints the resulting state.

#![forbid(unsafe_code)]

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use modq_core::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "modq")]
#[command(version, about = "Moderation queue engine replay driver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay an operator script and print the final engine snapshot
    Replay {
        /// JSON array of items to seed the queue with
        #[arg(long)]
        items: PathBuf,

        /// Script of operator actions, one per line
        #[arg(long)]
        script: PathBuf,

        /// Pretty-print the snapshot
        #[arg(long)]
        pretty: bool,
    },
    /// Print a deterministic sample item file
    Sample {
        #[arg(long, default_value_t = 25)]
        count: usize,

        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
}

fn run(cli: Cli) -> modq_core::Result<()> {
    match cli.command {
        Commands::Replay {
            items,
            script,
            pretty,
        } => {
            let config = Config::from_env();
            let items = modq::load_items(&items)?;
            let script = modq::load_script(&script)?;
            tracing::info!(items = items.len(), steps = script.len(), "replaying");
            let snapshot = modq::replay(items, config, &script)?;
            let out = if pretty {
                serde_json::to_string_pretty(&snapshot)?
            } else {
                serde_json::to_string(&snapshot)?
            };
            println!("{out}");
        }
        Commands::Sample { count, seed } => {
            let items = modq::sample_items(count, seed, Utc::now());
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        tracing::error!(code = err.error_type(), "modq failed: {err}");
        std::process::exit(1);
    }
}
