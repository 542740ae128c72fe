//! Simulated environment with a manual clock and seeded randomness.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use limbo_core::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Start of simulated time: 2014-05-13T16:53:20Z.
pub const EPOCH_SECS: i64 = 1_400_000_000;

/// Deterministic environment for tests.
///
/// Clones share the clock and the RNG stream, so a test can hold one handle
/// to advance time while the driver holds another.
#[derive(Clone)]
pub struct SimEnv {
    clock: Arc<Mutex<DateTime<Utc>>>,
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl SimEnv {
    /// Environment at [`EPOCH_SECS`] with seed 0.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Environment at [`EPOCH_SECS`] with the given RNG seed.
    pub fn with_seed(seed: u64) -> Self {
        let start = Utc.timestamp_opt(EPOCH_SECS, 0).single().unwrap_or_default();
        Self {
            clock: Arc::new(Mutex::new(start)),
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
        }
    }

    /// Move the clock forward (or backward, for negative deltas).
    pub fn advance(&self, delta: TimeDelta) {
        let mut clock = lock(&self.clock);
        *clock += delta;
    }

    /// Set the clock to an absolute time.
    pub fn set(&self, now: DateTime<Utc>) {
        *lock(&self.clock) = now;
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SimEnv {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.clock)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        lock(&self.rng).fill_bytes(buffer);
    }
}

// A test that panicked mid-update already failed; the value is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_only_moves_when_told() {
        let env = SimEnv::new();
        let t0 = env.now();
        assert_eq!(env.now(), t0);

        env.advance(TimeDelta::seconds(90));
        assert_eq!(env.now(), t0 + TimeDelta::seconds(90));
    }

    #[test]
    fn clones_share_the_clock() {
        let env = SimEnv::new();
        let other = env.clone();
        other.advance(TimeDelta::minutes(1));
        assert_eq!(env.now(), other.now());
    }

    #[test]
    fn same_seed_same_bytes() {
        let a = SimEnv::with_seed(42);
        let b = SimEnv::with_seed(42);
        let c = SimEnv::with_seed(43);

        let (mut x, mut y, mut z) = ([0u8; 16], [0u8; 16], [0u8; 16]);
        a.random_bytes(&mut x);
        b.random_bytes(&mut y);
        c.random_bytes(&mut z);

        assert_eq!(x, y);
        assert_ne!(x, z);
    }

    #[test]
    fn starts_at_epoch() {
        let env = SimEnv::new();
        assert_eq!(env.now().timestamp(), EPOCH_SECS);
        env.set(Utc.timestamp_opt(0, 0).unwrap());
        assert_eq!(env.now().timestamp(), 0);
    }
}
