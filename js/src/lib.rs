//! JournalStore - conversation and journal persistence
//!
//! Stores chat turns and journal entries in a single SQLite database and
//! exposes the narrow interface the chat pipeline needs: append a turn, read
//! the most recent N turns newest-first, toggle a moderation flag, delete a
//! turn, and fetch the latest journal entry for context.
//!
//! # Example
//!
//! ```ignore
//! use journalstore::{NewTurn, Sender, Store};
//!
//! let store = Store::open(".journalstore/deard.db")?;
//! store.append_turn(NewTurn::user("local", "had a rough day"))?;
//! let turns = store.recent_turns("local", 10)?; // newest first
//! ```

pub mod cli;
mod error;
mod store;
mod types;

pub use error::StoreError;
pub use store::Store;
pub use types::{ConversationTurn, JournalEntry, NewEntry, NewTurn, Sender};

/// Default database filename inside the store directory
pub const DEFAULT_DB_NAME: &str = "deard.db";
