//! Error types for the board core.
//!
//! Almost everything in this crate degrades instead of failing: malformed
//! tokens fall back to defaults and tag expressions never error. The one
//! hard failure is a thread id that does not parse.

use thiserror::Error;

/// A thread id in text form could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// Not exactly 24 hex characters
    #[error("invalid thread id format: {0:?}")]
    InvalidFormat(String),
}
