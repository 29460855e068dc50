//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// The migrations ledger could not be created or written
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// The migrations ledger exists but could not be read
    #[error("Ledger unreadable: {0}")]
    LedgerUnreadable(String),

    /// A migration file failed to apply; its transaction was rolled back
    #[error("Migration {name} failed: {message}")]
    MigrationFailed { name: String, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a migration failure for the named migration
    pub fn migration_failed(name: impl Into<String>, message: impl ToString) -> Self {
        Self::MigrationFailed {
            name: name.into(),
            message: message.to_string(),
        }
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::validation("missing landing_page_id");
        assert_eq!(e.to_string(), "Validation error: missing landing_page_id");

        let e = Error::migration_failed("002_add_col", "syntax error at or near \"TABL\"");
        assert_eq!(
            e.to_string(),
            "Migration 002_add_col failed: syntax error at or near \"TABL\""
        );

        let e = Error::LedgerUnreadable("table locked".into());
        assert_eq!(e.to_string(), "Ledger unreadable: table locked");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: Error = io.into();
        assert!(matches!(e, Error::Io(_)));
    }
}
