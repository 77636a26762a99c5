//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sift - Identify the source of exchange ledger exports
#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Hybrid classifier for exchange ledger exports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a CSV export file
    Classify {
        /// CSV file to classify
        #[arg(short, long)]
        file: PathBuf,

        /// Number of sample rows to send to the fallback classifier
        #[arg(long, default_value = "3")]
        rows: usize,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Show AI backend status and cache strategy configuration
    Status,
}
