//! Error types for book store operations.
//!
//! A missing record is not an error: lookups return `Ok(None)` and callers
//! decide how to report it.

use thiserror::Error;

/// Everything that can go wrong while talking to a book store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached or configured at startup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The record would violate the book schema (empty title or author).
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// The underlying backend reported a failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result alias used by every [`crate::BookStore`] method.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}
