//! CLI argument definitions using clap
//!
//! Commands:
//! - mirrordb init --config <path>
//! - mirrordb count|find|find-one|distinct|aggregate|upsert --config <path>
//!   (request JSON on stdin)
//! - mirrordb stats|search|recent|top --config <path>

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// mirrordb - embedded fallback document store
#[derive(Parser, Debug)]
#[command(name = "mirrordb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and seed the table
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./mirrordb.json")]
        config: PathBuf,
    },

    /// Count documents: {"filter": {...}}
    Count {
        #[arg(long, default_value = "./mirrordb.json")]
        config: PathBuf,
    },

    /// Find documents: {"filter", "sort", "skip", "limit"}
    Find {
        #[arg(long, default_value = "./mirrordb.json")]
        config: PathBuf,
    },

    /// First matching document: {"filter", "sort"}
    FindOne {
        #[arg(long, default_value = "./mirrordb.json")]
        config: PathBuf,
    },

    /// Distinct values: {"field": "..."}
    Distinct {
        #[arg(long, default_value = "./mirrordb.json")]
        config: PathBuf,
    },

    /// Run a pipeline: {"pipeline": [...]}
    Aggregate {
        #[arg(long, default_value = "./mirrordb.json")]
        config: PathBuf,
    },

    /// Insert or replace: {"document": {...}}
    Upsert {
        #[arg(long, default_value = "./mirrordb.json")]
        config: PathBuf,

        /// Normalize scraped metadata before storing
        #[arg(long)]
        raw: bool,
    },

    /// Collection statistics
    Stats {
        #[arg(long, default_value = "./mirrordb.json")]
        config: PathBuf,
    },

    /// Search videos: {"text", "channel", "min_views", ...}
    Search {
        #[arg(long, default_value = "./mirrordb.json")]
        config: PathBuf,
    },

    /// Newest uploads
    Recent {
        #[arg(long, default_value = "./mirrordb.json")]
        config: PathBuf,

        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Case-insensitive channel pattern
        #[arg(long)]
        channel: Option<String>,
    },

    /// Highest values of a metric
    Top {
        #[arg(long, default_value = "./mirrordb.json")]
        config: PathBuf,

        #[arg(long, default_value = "view_count")]
        sort_by: String,

        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

impl Command {
    /// Configuration file path
    pub fn config(&self) -> &Path {
        match self {
            Command::Init { config }
            | Command::Count { config }
            | Command::Find { config }
            | Command::FindOne { config }
            | Command::Distinct { config }
            | Command::Aggregate { config }
            | Command::Upsert { config, .. }
            | Command::Stats { config }
            | Command::Search { config }
            | Command::Recent { config, .. }
            | Command::Top { config, .. } => config,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
