//! Error types shared by the catalog core. The binary and the TUI wrap these in
//! `anyhow` the same way the rest of the app reports failures. Forms get a
//! [`ValidationError`] before anything reaches the store; the store keeps its
//! own errors typed so callers can tell a missing record from a failed save.

use thiserror::Error;

/// Reasons a set of book fields is refused before it reaches the collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required.")]
    MissingField(&'static str),
    #[error("Pages must be a whole number, got \"{0}\".")]
    InvalidPages(String),
    #[error("{field} must be a date (YYYY-MM-DD), got \"{value}\".")]
    InvalidDate { field: &'static str, value: String },
    #[error("{field} must be 0 or 1, got \"{value}\".")]
    InvalidFlag { field: &'static str, value: String },
    #[error("Unknown theme setting \"{0}\".")]
    UnknownStyle(String),
}

/// Failures of the key-value persistence backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage backend is unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by [`crate::store::LibraryStore`] operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("No book with id {0}.")]
    NotFound(String),
    #[error(transparent)]
    Persistence(#[from] StorageError),
    #[error("Could not load the default books: {0}")]
    SourceFetch(String),
}

pub type Result<T> = std::result::Result<T, LibraryError>;
