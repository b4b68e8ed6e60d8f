//! Error types for the bookmark core.
//!
//! Store failures are propagated unchanged; nothing on the reconciliation or
//! query paths is retried or swallowed. A missing bookmark is not an error:
//! lookups return `None` and mutations return `false`/`None`.

use thiserror::Error;

/// Result type alias for bookmark operations
pub type BookmarkResult<T> = Result<T, BookmarkError>;

/// Main error type for bookmark operations
#[derive(Error, Debug)]
pub enum BookmarkError {
    #[error("Validation error in {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BookmarkError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BookmarkError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new integrity violation error
    pub fn integrity(message: impl Into<String>) -> Self {
        BookmarkError::Integrity(message.into())
    }

    /// True for caller-side input problems (as opposed to store failures)
    pub fn is_validation(&self) -> bool {
        matches!(self, BookmarkError::Validation { .. })
    }
}
