//! Store error types

use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested row does not exist or is owned by someone else
    #[error("Not found")]
    NotFound,

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Check if this is the not-found case (maps to a client-facing 404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}
