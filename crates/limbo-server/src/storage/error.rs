//! Storage error types.
//!
//! Defines errors that can occur during storage operations:
//! - `NotFound`: Requested record doesn't exist
//! - `Conflict`: Insert would overwrite an existing record
//! - `Serialization`: Failed to encode/decode a record
//! - `Io`: Underlying storage system errors

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Record not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Record already exists
    ///
    /// Returned by inserts when the key is taken. Concurrent registrations of
    /// the same username are resolved here: exactly one insert wins.
    #[error("conflict: {0} already exists")]
    Conflict(String),

    /// Serialization or deserialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error (file system, database, poisoned lock, etc.)
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}
