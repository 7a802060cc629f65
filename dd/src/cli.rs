//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// deard - empathetic journaling companion
#[derive(Parser)]
#[command(name = "deard", about = "Empathetic journaling companion with a planner/generator chat pipeline")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// User id to operate as
    #[arg(short, long, global = true, default_value = "local")]
    pub user: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send one message and print the reply
    Chat {
        /// The message text
        message: String,

        /// Affect label describing the message's emotional tone
        #[arg(short, long)]
        affect: Option<String>,
    },

    /// Interactive conversation over stdin
    Repl,

    /// Show recent conversation turns
    History {
        /// Maximum turns to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Toggle the moderation flag on a turn
    Flag {
        /// Turn id
        id: i64,

        /// Clear the flag instead of setting it
        #[arg(long)]
        unset: bool,
    },

    /// Delete a turn
    Delete {
        /// Turn id
        id: i64,
    },

    /// Record a journal entry
    Journal {
        /// Entry title
        title: String,

        /// Entry body
        content: String,

        /// Optional mood tag
        #[arg(short, long)]
        mood: Option<String>,
    },
}
