//! deard - empathetic journaling companion
//!
//! CLI entry point for the chat pipeline and the moderation/journal
//! operations around it.

use std::io::{BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use deard::chat::{ChatError, ChatService};
use deard::cli::{Cli, Command};
use deard::config::Config;
use deard::generator::Generator;
use deard::llm::create_client;
use deard::planner::Planner;
use journalstore::{NewEntry, Store};

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let level = match cli_log_level.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", s);
                tracing::Level::WARN
            }
        },
        None => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, user = %cli.user, "main: dispatching command");
    match cli.command {
        Some(Command::Chat { message, affect }) => cmd_chat(&config, &cli.user, &message, affect.as_deref()).await,
        Some(Command::Repl) | None => cmd_repl(&config, &cli.user).await,
        Some(Command::History { limit }) => cmd_history(&config, &cli.user, limit),
        Some(Command::Flag { id, unset }) => cmd_flag(&config, &cli.user, id, !unset),
        Some(Command::Delete { id }) => cmd_delete(&config, &cli.user, id),
        Some(Command::Journal { title, content, mood }) => cmd_journal(&config, &cli.user, title, content, mood),
    }
}

/// Build the full chat service (requires the API key to be present)
fn build_service(config: &Config) -> Result<ChatService> {
    debug!("build_service: called");
    config.validate()?;

    let store = Arc::new(Store::open(&config.storage.store_path).context("Failed to open store")?);
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;

    let planner = Planner::new(llm.clone(), &config.llm);
    let generator = Generator::new(llm, &config.llm);

    Ok(ChatService::new(store, planner, generator, config.history.window))
}

/// Open the store without the LLM stack (for offline operations)
fn open_store(config: &Config) -> Result<Store> {
    debug!(path = ?config.storage.store_path, "open_store: called");
    Store::open(&config.storage.store_path).context("Failed to open store")
}

/// Send one message and print the reply
async fn cmd_chat(config: &Config, user: &str, message: &str, affect: Option<&str>) -> Result<()> {
    debug!(%user, "cmd_chat: called");
    let service = build_service(config)?;

    match service.handle_message(user, message, affect).await {
        Ok(turn) => {
            print_reply(&turn.content, turn.technique.as_deref());
            Ok(())
        }
        Err(ChatError::EmptyMessage) => {
            eprintln!("{} Message must not be empty", "✗".red());
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Interactive conversation over stdin
async fn cmd_repl(config: &Config, user: &str) -> Result<()> {
    debug!(%user, "cmd_repl: called");
    let service = build_service(config)?;

    println!("deard - type a message, or 'exit' to quit\n");

    let stdin = std::io::stdin();
    loop {
        print!("{} ", ">".cyan());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            debug!("cmd_repl: stdin closed");
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            debug!("cmd_repl: exit requested");
            break;
        }

        match service.handle_message(user, line, None).await {
            Ok(turn) => print_reply(&turn.content, turn.technique.as_deref()),
            Err(e) => eprintln!("{} {}", "✗".red(), e),
        }
    }

    Ok(())
}

/// Show recent conversation turns, newest first
fn cmd_history(config: &Config, user: &str, limit: usize) -> Result<()> {
    debug!(%user, limit, "cmd_history: called");
    let store = open_store(config)?;

    let turns = store.recent_turns(user, limit)?;
    if turns.is_empty() {
        println!("No turns found");
        return Ok(());
    }

    for turn in turns {
        let when = chrono::DateTime::from_timestamp_millis(turn.created_at)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let technique = turn
            .technique
            .as_deref()
            .map(|t| format!(" [{}]", t.cyan()))
            .unwrap_or_default();
        let flag = if turn.flagged { " ⚑".red().to_string() } else { String::new() };
        println!(
            "{} {} {}{}{} {}",
            turn.id.to_string().yellow(),
            when.dimmed(),
            turn.sender.to_string().dimmed(),
            technique,
            flag,
            turn.content
        );
    }

    Ok(())
}

/// Toggle the moderation flag on a turn
fn cmd_flag(config: &Config, user: &str, id: i64, flag: bool) -> Result<()> {
    debug!(%user, id, flag, "cmd_flag: called");
    let store = open_store(config)?;

    match store.set_flag(user, id, flag) {
        Ok(turn) => {
            let state = if turn.flagged { "flagged" } else { "unflagged" };
            println!("{} Turn {} {}", "✓".green(), id, state);
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            eprintln!("{} Turn {} not found", "✗".red(), id);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a turn
fn cmd_delete(config: &Config, user: &str, id: i64) -> Result<()> {
    debug!(%user, id, "cmd_delete: called");
    let store = open_store(config)?;

    match store.delete_turn(user, id) {
        Ok(()) => {
            println!("{} Turn {} deleted", "✓".green(), id);
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            eprintln!("{} Turn {} not found", "✗".red(), id);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Record a journal entry
fn cmd_journal(config: &Config, user: &str, title: String, content: String, mood: Option<String>) -> Result<()> {
    debug!(%user, %title, "cmd_journal: called");
    let store = open_store(config)?;

    let mut entry = NewEntry::new(user, title, content);
    if let Some(mood) = mood {
        entry = entry.with_mood(mood);
    }
    let entry = store.add_entry(entry)?;
    println!("{} Journal entry {} added", "✓".green(), entry.id.to_string().cyan());
    Ok(())
}

/// Print an ai reply with its technique tag
fn print_reply(content: &str, technique: Option<&str>) {
    let tag = technique.map(|t| format!(" [{}]", t.cyan())).unwrap_or_default();
    println!("{}{} {}", "dear".green(), tag, content);
}
