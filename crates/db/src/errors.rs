//! Errors raised by the storage layer.

use thiserror::Error;

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// A key listed by the database has no entry.
    #[error("could not find entry: {0}")]
    NotFound(String),
}

/// The result type for storage operations.
pub type DbResult<T> = Result<T, DbError>;
