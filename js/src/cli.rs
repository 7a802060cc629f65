//! CLI argument parsing for journalstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "journalstore")]
#[command(author, version, about = "Inspect and manage the deard conversation store", long_about = None)]
pub struct Cli {
    /// Path to the SQLite database
    #[arg(short, long)]
    pub db: Option<PathBuf>,

    /// User id to operate on
    #[arg(short, long, default_value = "local")]
    pub user: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show recent conversation turns, newest first
    Recent {
        /// Maximum turns to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Toggle the moderation flag on a turn
    Flag {
        /// Turn id
        #[arg(required = true)]
        id: i64,

        /// Clear the flag instead of setting it
        #[arg(long)]
        unset: bool,
    },

    /// Delete a turn
    Delete {
        /// Turn id
        #[arg(required = true)]
        id: i64,
    },

    /// Add a journal entry
    AddEntry {
        /// Entry title
        #[arg(required = true)]
        title: String,

        /// Entry body
        #[arg(required = true)]
        content: String,

        /// Optional mood tag
        #[arg(short, long)]
        mood: Option<String>,
    },

    /// Show the latest journal entry
    Latest,
}

/// Default database path under the platform data directory
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("deard")
        .join(crate::DEFAULT_DB_NAME)
}
