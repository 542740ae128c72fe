//! Thread identifiers.
//!
//! 12 bytes: the creation second as big-endian `u32`, then 8 random bytes.
//! The canonical text form is 24 lowercase hex characters. Ids order by
//! their bytes, which the listing engine uses as the deterministic tie-break
//! between threads with equal activity timestamps.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{env::Environment, error::IdError};

/// Length of a thread id in bytes.
pub const THREAD_ID_LEN: usize = 12;

/// Opaque, unique thread identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ThreadId([u8; THREAD_ID_LEN]);

impl ThreadId {
    /// Smallest possible id (all zero bytes).
    pub const MIN: Self = Self([0; THREAD_ID_LEN]);

    /// Wrap raw id bytes.
    pub const fn from_bytes(bytes: [u8; THREAD_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw id bytes.
    pub const fn as_bytes(&self) -> &[u8; THREAD_ID_LEN] {
        &self.0
    }

    /// Generate a fresh id stamped with the environment's current second.
    pub fn generate(env: &impl Environment) -> Self {
        let mut bytes = [0u8; THREAD_ID_LEN];
        let secs = env.now().timestamp().clamp(0, i64::from(u32::MAX)) as u32;
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        env.random_bytes(&mut bytes[4..]);
        Self(bytes)
    }

    /// Parse the canonical hex form.
    pub fn parse(text: &str) -> Result<Self, IdError> {
        let mut bytes = [0u8; THREAD_ID_LEN];
        hex::decode_to_slice(text, &mut bytes)
            .map_err(|_| IdError::InvalidFormat(text.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ThreadId({self})")
    }
}

impl FromStr for ThreadId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
