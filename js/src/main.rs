use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use journalstore::cli::{Cli, Command, default_db_path};
use journalstore::{NewEntry, Store, StoreError};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let db_path = cli.db.clone().unwrap_or_else(default_db_path);

    info!("journalstore starting (db: {})", db_path.display());

    let store = Store::open(&db_path).context("Failed to open store")?;

    match cli.command {
        Command::Recent { limit } => {
            let turns = store.recent_turns(&cli.user, limit)?;
            if turns.is_empty() {
                println!("No turns found");
            }
            for turn in turns {
                let flag = if turn.flagged { " ⚑".red().to_string() } else { String::new() };
                let technique = turn
                    .technique
                    .as_deref()
                    .map(|t| format!(" [{}]", t.cyan()))
                    .unwrap_or_default();
                println!(
                    "{} {}{}{} {}",
                    turn.id.to_string().yellow(),
                    turn.sender.to_string().dimmed(),
                    technique,
                    flag,
                    turn.content
                );
            }
        }
        Command::Flag { id, unset } => match store.set_flag(&cli.user, id, !unset) {
            Ok(turn) => {
                let state = if turn.flagged { "flagged" } else { "unflagged" };
                println!("{} Turn {} {}", "✓".green(), id, state);
            }
            Err(StoreError::NotFound) => {
                eprintln!("{} Turn {} not found", "✗".red(), id);
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },
        Command::Delete { id } => match store.delete_turn(&cli.user, id) {
            Ok(()) => println!("{} Turn {} deleted", "✓".green(), id),
            Err(StoreError::NotFound) => {
                eprintln!("{} Turn {} not found", "✗".red(), id);
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },
        Command::AddEntry { title, content, mood } => {
            let mut entry = NewEntry::new(&cli.user, title, content);
            if let Some(mood) = mood {
                entry = entry.with_mood(mood);
            }
            let entry = store.add_entry(entry)?;
            println!("{} Journal entry {} added", "✓".green(), entry.id.to_string().cyan());
        }
        Command::Latest => match store.latest_entry(&cli.user)? {
            Some(entry) => {
                println!("{} {}", entry.title.cyan(), entry.mood.as_deref().unwrap_or("").dimmed());
                println!("{}", entry.content);
            }
            None => println!("No journal entries"),
        },
    }

    Ok(())
}
