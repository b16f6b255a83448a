//! Common error types for tagdesk

use thiserror::Error;

/// Common result type for tagdesk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds surfaced by the store, navigator, tracker, mutator and registry
///
/// End-of-sequence and empty-review-queue outcomes are NOT errors; they are
/// returned as ordinary values (see [`crate::db::models::Step`] and
/// [`crate::db::models::ReviewPick`]).
#[derive(Error, Debug)]
pub enum Error {
    /// Storage engine failure (wraps sqlx::Error)
    #[error("Storage unavailable: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown dataset, session, item or input
    #[error("Not found: {0}")]
    NotFound(String),

    /// Parent collection name already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Payload or request not parseable, or of the wrong shape
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Internal error (e.g. a stored payload that no longer parses)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map a sqlx error from an INSERT on a uniquely-named parent table.
    ///
    /// Unique violations become [`Error::Conflict`]; everything else stays a
    /// storage failure.
    pub fn from_insert(err: sqlx::Error, what: &str, name: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::Conflict(format!("{} name already exists: {}", what, name))
            }
            _ => Error::Database(err),
        }
    }
}
