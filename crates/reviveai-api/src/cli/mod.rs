//! CLI argument definitions and command implementations.

pub mod carbon;
pub mod ingest;
pub mod search;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

/// ReviveAI -- second-hand listing generator service.
#[derive(Debug, Parser)]
#[command(name = "reviveai", version, about = "AI listing generator for second-hand goods")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the REST API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Bind port
        #[arg(long)]
        port: Option<u16>,

        /// Export spans via OpenTelemetry (stdout exporter)
        #[arg(long)]
        otel: bool,
    },

    /// Load a carbon catalogue CSV into the vector store
    Ingest {
        /// Path to the cleaned carbon catalogue CSV
        csv: PathBuf,
    },

    /// Estimate the carbon savings for a product description
    Carbon {
        /// Product description to match against the catalogue
        query: String,
    },

    /// Research a product with the web-search agent
    Search {
        /// Product search query
        query: String,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}
