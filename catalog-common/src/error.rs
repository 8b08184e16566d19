//! Common error types for the composer catalog

use thiserror::Error;

/// Common result type for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the catalog library and the web service
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid user-submitted field
    #[error("{0}")]
    Validation(String),
}

/// UNIQUE constraint a rejected write ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueConstraint {
    /// `composers.name`
    ComposerName,
    /// `compositions.url`
    CompositionUrl,
    Other,
}

impl Error {
    /// True when the underlying store rejected a write because of a
    /// UNIQUE constraint (duplicate composer name or composition url).
    pub fn is_unique_violation(&self) -> bool {
        self.unique_violation().is_some()
    }

    /// Which UNIQUE constraint rejected the write, if any.
    ///
    /// SQLite names the column in the message:
    /// `UNIQUE constraint failed: compositions.url`.
    pub fn unique_violation(&self) -> Option<UniqueConstraint> {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                let message = db_err.message();
                Some(if message.contains("composers.name") {
                    UniqueConstraint::ComposerName
                } else if message.contains("compositions.url") {
                    UniqueConstraint::CompositionUrl
                } else {
                    UniqueConstraint::Other
                })
            }
            _ => None,
        }
    }
}
