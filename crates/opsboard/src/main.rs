//! CLI entry point for opsboard.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Task tracking for multi-site operations teams.
#[derive(Parser, Debug)]
#[command(
    name = "opsboard",
    version,
    about = "opsboard: track tasks per center with local durable snapshots"
)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the storage scope key.
    #[arg(long)]
    scope: Option<String>,

    /// Override the storage directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new task.
    Add {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Due date as YYYY-MM-DD.
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        center: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,
        /// Prefill title, description, and priority from a built-in template.
        #[arg(long)]
        template: Option<String>,
    },

    /// List tasks with the active filters applied.
    List {
        /// Case-insensitive text search over title, description, center.
        #[arg(long)]
        search: Option<String>,
        /// Center value, or `all`.
        #[arg(long)]
        center: Option<String>,
        /// Status token, or `all`.
        #[arg(long)]
        status: Option<String>,
        /// `all`, `month`, or `year`.
        #[arg(long)]
        period: Option<String>,
        /// `date-asc`, `date-desc`, or `priority`.
        #[arg(long)]
        sort: Option<String>,
    },

    /// Edit fields of an existing task.
    Edit {
        /// Task identifier.
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Due date as YYYY-MM-DD.
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        center: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// Replace the whole tag set.
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,
    },

    /// Delete a task.
    Rm {
        /// Task identifier.
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Advance a task's status one step along the cycle.
    Cycle {
        /// Task identifier.
        id: String,
    },

    /// Write a portable export document.
    Export {
        /// Output file; defaults to opsboard-tasks-<date>.json.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Import a previously exported document.
    Import {
        /// Export document to read.
        path: PathBuf,
    },

    /// Show status counts for the collection.
    Stats,

    /// Keep a timestamped archive copy of the current snapshot.
    Archive,

    /// Check storage health and sync state.
    Doctor,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    commands::run(cli)
}
