//! Server error types.

use std::fmt;

use crate::storage::StorageError;

/// Errors that can occur in the server runtime.
///
/// Command failures never appear here; they become `error` responses. These
/// are the failures that stop a connection or the whole process.
#[derive(Debug)]
pub enum ServerError {
    /// Configuration error (unreadable file, bad TOML, invalid value).
    ///
    /// Fatal at startup. Fix configuration and restart.
    Config(String),

    /// Transport/network error (bind failure, I/O error on a connection).
    ///
    /// Fatal at startup (bind address in use); ends only the affected
    /// connection afterwards.
    Transport(String),

    /// Client violated the line protocol (oversized line, invalid UTF-8).
    ///
    /// Fatal for that connection only.
    Protocol(String),

    /// Storage could not be opened.
    Storage(StorageError),

    /// Internal error (handler task failed, logic bug).
    Internal(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Self::Storage(err) => write!(f, "storage error: {err}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for ServerError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
