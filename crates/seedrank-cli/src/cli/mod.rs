//! CLI command definitions and dispatch for the `srank` binary.
//!
//! Uses clap derive macros for argument parsing. Every command works against
//! the embedding store in the resolved data directory.

pub mod embedding;
pub mod neighbors;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Store item embeddings and query their nearest neighbors.
#[derive(Parser)]
#[command(name = "srank", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log errors only (ignored when -v is given). Command output is unaffected.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "SEEDRANK_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store (or replace) one item's embedding.
    Put {
        /// Item identifier.
        item_id: String,

        /// Comma-separated vector components, e.g. "0.1,0.2,0.3".
        #[arg(allow_hyphen_values = true)]
        vector: String,
    },

    /// Import embeddings from a JSON Lines file in one atomic batch.
    ///
    /// Each line: {"item_id": "...", "vector": [..], "timestamp": "..."}
    /// (timestamp optional).
    Import {
        /// Path to the JSON Lines file.
        path: PathBuf,
    },

    /// Show one item's embedding.
    Get {
        item_id: String,
    },

    /// Delete an item's embedding (no error if absent).
    #[command(alias = "rm")]
    Delete {
        item_id: String,
    },

    /// List the items most similar to an item.
    Similar {
        item_id: String,

        /// Number of results.
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },

    /// Page through stored embeddings in item id order.
    #[command(alias = "ls")]
    Scan {
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Maximum rows to return (all when omitted).
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Compute nearest-neighbor lists for every stored item.
    ///
    /// Writes one JSON object per line: {"item_id": .., "neighbors": [..]}.
    Neighbors {
        /// Neighbors per item (defaults to `recommend.num_similar`).
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Output file (stdout when omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
