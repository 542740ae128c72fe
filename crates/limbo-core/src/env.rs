//! Environment abstraction for deterministic testing.
//!
//! Decouples board logic from the wall clock and the OS RNG. Production uses
//! `SystemEnv` from `limbo-server`; tests use `SimEnv` from `limbo-harness`
//! with a manual clock and a seeded RNG.

use chrono::{DateTime, Utc};

/// Abstract environment providing wall-clock time and randomness.
///
/// Timestamps are persisted and compared across requests, so unlike a
/// monotonic instant this is calendar time in UTC.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Given the same RNG seed, this produces the same sequence of bytes
    /// - Uses cryptographically secure RNG in production
    fn random_bytes(&self, buffer: &mut [u8]);
}
