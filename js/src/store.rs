//! Core Store implementation
//!
//! One SQLite database holds both conversation turns and journal entries.
//! Every insert is a single-row write, so per-conversation consistency only
//! needs SQLite's row-level atomicity - no explicit locking beyond the
//! connection mutex.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, params};
use tracing::debug;

use crate::error::StoreError;
use crate::types::{ConversationTurn, JournalEntry, NewEntry, NewTurn, Sender};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS turns (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id    TEXT    NOT NULL,
    sender      TEXT    NOT NULL,
    content     TEXT    NOT NULL,
    technique   TEXT,
    affect      TEXT,
    flagged     INTEGER NOT NULL DEFAULT 0,
    created_at  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_turns_owner_created ON turns(owner_id, created_at);

CREATE TABLE IF NOT EXISTS journal_entries (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id    TEXT    NOT NULL,
    title       TEXT    NOT NULL,
    content     TEXT    NOT NULL,
    mood        TEXT,
    created_at  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_journal_owner_created ON journal_entries(owner_id, created_at);
";

/// Current Unix timestamp in milliseconds
fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// The conversation and journal store
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open or create a store at the given database path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!(?path, "Store::open: called");
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store (for tests)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        debug!("Store::open_in_memory: called");
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        debug!("Store::from_connection: schema ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the connection; poisoning is unrecoverable
    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("store mutex poisoned")
    }

    /// Append a turn and return the persisted row
    pub fn append_turn(&self, turn: NewTurn) -> Result<ConversationTurn, StoreError> {
        debug!(owner_id = %turn.owner_id, sender = %turn.sender, "Store::append_turn: called");
        let created_at = now_ms();
        let conn = self.conn();
        conn.execute(
            "INSERT INTO turns (owner_id, sender, content, technique, affect, flagged, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
            params![
                turn.owner_id,
                turn.sender.as_str(),
                turn.content,
                turn.technique,
                turn.affect,
                created_at,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(id, "Store::append_turn: inserted");

        Ok(ConversationTurn {
            id,
            owner_id: turn.owner_id,
            sender: turn.sender,
            content: turn.content,
            technique: turn.technique,
            affect: turn.affect,
            flagged: false,
            created_at,
        })
    }

    /// Most recent turns for an owner, newest first
    pub fn recent_turns(&self, owner_id: &str, limit: usize) -> Result<Vec<ConversationTurn>, StoreError> {
        debug!(%owner_id, limit, "Store::recent_turns: called");
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, sender, content, technique, affect, flagged, created_at
             FROM turns WHERE owner_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2",
        )?;

        let turns: Vec<ConversationTurn> = stmt
            .query_map(params![owner_id, limit as i64], turn_from_row)?
            .collect::<Result<_, _>>()?;

        debug!(count = turns.len(), "Store::recent_turns: returning turns");
        Ok(turns)
    }

    /// Fetch a single turn, scoped to its owner
    pub fn get_turn(&self, owner_id: &str, id: i64) -> Result<ConversationTurn, StoreError> {
        debug!(%owner_id, id, "Store::get_turn: called");
        let conn = self.conn();
        let result = conn.query_row(
            "SELECT id, owner_id, sender, content, technique, affect, flagged, created_at
             FROM turns WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
            turn_from_row,
        );

        match result {
            Ok(turn) => Ok(turn),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                debug!(id, "Store::get_turn: not found");
                Err(StoreError::NotFound)
            }
            Err(e) => Err(StoreError::Sqlite(e)),
        }
    }

    /// Set the moderation flag on a turn
    ///
    /// Idempotent: setting an already-set flag is a no-op that still succeeds.
    /// Returns the updated row, or `NotFound` when the turn does not exist or
    /// belongs to a different owner.
    pub fn set_flag(&self, owner_id: &str, id: i64, flag: bool) -> Result<ConversationTurn, StoreError> {
        debug!(%owner_id, id, flag, "Store::set_flag: called");
        {
            let conn = self.conn();
            let changed = conn.execute(
                "UPDATE turns SET flagged = ?1 WHERE id = ?2 AND owner_id = ?3",
                params![flag as i64, id, owner_id],
            )?;
            if changed == 0 {
                debug!(id, "Store::set_flag: no matching row");
                return Err(StoreError::NotFound);
            }
        }
        self.get_turn(owner_id, id)
    }

    /// Delete a turn, scoped to its owner
    pub fn delete_turn(&self, owner_id: &str, id: i64) -> Result<(), StoreError> {
        debug!(%owner_id, id, "Store::delete_turn: called");
        let conn = self.conn();
        let changed = conn.execute(
            "DELETE FROM turns WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
        )?;
        if changed == 0 {
            debug!(id, "Store::delete_turn: no matching row");
            return Err(StoreError::NotFound);
        }
        debug!(id, "Store::delete_turn: deleted");
        Ok(())
    }

    /// Add a journal entry and return the persisted row
    pub fn add_entry(&self, entry: NewEntry) -> Result<JournalEntry, StoreError> {
        debug!(owner_id = %entry.owner_id, title = %entry.title, "Store::add_entry: called");
        let created_at = now_ms();
        let conn = self.conn();
        conn.execute(
            "INSERT INTO journal_entries (owner_id, title, content, mood, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![entry.owner_id, entry.title, entry.content, entry.mood, created_at],
        )?;
        let id = conn.last_insert_rowid();
        debug!(id, "Store::add_entry: inserted");

        Ok(JournalEntry {
            id,
            owner_id: entry.owner_id,
            title: entry.title,
            content: entry.content,
            mood: entry.mood,
            created_at,
        })
    }

    /// Latest journal entry for an owner, if any
    pub fn latest_entry(&self, owner_id: &str) -> Result<Option<JournalEntry>, StoreError> {
        debug!(%owner_id, "Store::latest_entry: called");
        let conn = self.conn();
        let result = conn.query_row(
            "SELECT id, owner_id, title, content, mood, created_at
             FROM journal_entries WHERE owner_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT 1",
            params![owner_id],
            |row| {
                Ok(JournalEntry {
                    id: row.get(0)?,
                    owner_id: row.get(1)?,
                    title: row.get(2)?,
                    content: row.get(3)?,
                    mood: row.get(4)?,
                    created_at: row.get(5)?,
                })
            },
        );

        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                debug!("Store::latest_entry: no entries");
                Ok(None)
            }
            Err(e) => Err(StoreError::Sqlite(e)),
        }
    }
}

/// Map a turns row to a ConversationTurn
fn turn_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConversationTurn> {
    let sender_str: String = row.get(2)?;
    let sender = Sender::parse(&sender_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown sender: {}", sender_str).into(),
        )
    })?;

    Ok(ConversationTurn {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        sender,
        content: row.get(3)?,
        technique: row.get(4)?,
        affect: row.get(5)?,
        flagged: row.get::<_, i64>(6)? != 0,
        created_at: row.get(7)?,
    })
}
