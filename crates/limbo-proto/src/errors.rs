//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors from decoding or encoding wire messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Line was empty or whitespace only
    #[error("empty message")]
    Empty,

    /// Line exceeded the maximum accepted length
    #[error("message too large: {size} bytes (max {max})")]
    TooLarge {
        /// Size of the rejected line
        size: usize,
        /// Maximum accepted size
        max: usize,
    },

    /// JSON was malformed or did not match any command shape
    #[error("malformed message: {0}")]
    Malformed(String),

    /// Encoding a response failed
    #[error("encode error: {0}")]
    Encode(String),
}

