//! Sift CLI - Exchange ledger-export classifier
//!
//! Usage:
//!   sift classify --file export.csv   Classify a CSV export
//!   sift serve --port 3000            Start web server
//!   sift status                       Show backend and cache configuration

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Classify { file, rows, json } => {
            commands::cmd_classify(&file, rows, json).await
        }
        Commands::Serve { port, host } => commands::cmd_serve(&host, port).await,
        Commands::Status => commands::cmd_status().await,
    }
}
