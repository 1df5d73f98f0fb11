// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orderly - record customer orders in SQLite.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod history;
mod place;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use orderly_config::OrderlyConfig;
use orderly_core::OrderError;

/// Orderly - record customer orders in SQLite.
#[derive(Parser, Debug)]
#[command(name = "orderly", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the usual locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Place an order. Prompts for anything not given as a flag.
    Place(place::PlaceArgs),
    /// Show stored orders, newest first.
    History {
        /// Show at most this many orders.
        #[arg(long)]
        limit: Option<u32>,
    },
    /// List the product catalog.
    Products,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => orderly_config::load_and_validate_path(path),
        None => orderly_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            orderly_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    if let Err(e) = run(cli.command, config).await {
        eprintln!("{} {e}", "Error:".red().bold());
        std::process::exit(1);
    }
}

async fn run(command: Option<Commands>, config: OrderlyConfig) -> Result<(), OrderError> {
    match command.unwrap_or(Commands::Place(place::PlaceArgs::default())) {
        Commands::Place(args) => place::run_place(&config, args).await,
        Commands::History { limit } => history::run_history(&config, limit).await,
        Commands::Products => {
            history::print_products();
            Ok(())
        }
    }
}

/// Logs go to stderr so they never interleave with receipts on stdout.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("orderly={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
