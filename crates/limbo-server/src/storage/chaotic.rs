//! Chaotic storage wrapper for fault injection testing
//!
//! Storage wrapper that randomly fails operations to test error handling.
//! Used for chaos testing to ensure command handlers report storage failures
//! without corrupting session or board state.

#![allow(clippy::disallowed_types, reason = "Locking simple RNG state")]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use chrono::{DateTime, Utc};
use limbo_core::{Post, Tag, Thread, ThreadId, User};

use super::{Storage, StorageError, ThreadQuery};

/// Chaotic storage wrapper that randomly injects failures
///
/// Delegates to an underlying storage implementation but randomly fails
/// operations based on a configured failure rate. A failed operation never
/// reaches the inner storage, so the inner state only ever reflects
/// operations that reported success.
#[derive(Clone)]
pub struct ChaoticStorage<S: Storage> {
    inner: S,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    /// RNG state for deterministic chaos
    rng: Arc<Mutex<ChaoticRng>>,
    /// Operations attempted
    operation_count: Arc<AtomicUsize>,
    /// Operations that failed by injection
    failure_count: Arc<AtomicUsize>,
}

/// Simple deterministic RNG for chaos injection
///
/// Uses linear congruential generator (LCG) for fast, deterministic randomness.
/// This ensures chaos tests are reproducible with the same seed.
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate next random value [0.0, 1.0)
    fn next(&mut self) -> f64 {
        // LCG constants from Numerical Recipes
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64)
    }
}

impl<S: Storage> ChaoticStorage<S> {
    /// Create a new chaotic storage wrapper with a fixed seed.
    ///
    /// `failure_rate` is clamped to [0.0, 1.0].
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
    }

    /// Create with explicit seed for reproducible chaos
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        Self {
            inner,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            rng: Arc::new(Mutex::new(ChaoticRng::new(seed))),
            operation_count: Arc::new(AtomicUsize::new(0)),
            failure_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Underlying storage (for checking invariants after chaos).
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Total number of storage operations attempted.
    pub fn operation_count(&self) -> usize {
        self.operation_count.load(Ordering::Relaxed)
    }

    /// Number of operations failed by injection.
    pub fn failure_count(&self) -> usize {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Count the operation and decide whether it fails.
    fn chaos(&self, op: &str) -> Result<(), StorageError> {
        self.operation_count.fetch_add(1, Ordering::Relaxed);

        let fail = match self.rng.lock() {
            Ok(mut rng) => rng.next() < self.failure_rate,
            Err(_) => true,
        };

        if fail {
            self.failure_count.fetch_add(1, Ordering::Relaxed);
            return Err(StorageError::Io(format!("chaotic failure injection: {op}")));
        }
        Ok(())
    }
}

impl<S: Storage> Storage for ChaoticStorage<S> {
    fn find_user(&self, key: &str) -> Result<Option<User>, StorageError> {
        self.chaos("find_user")?;
        self.inner.find_user(key)
    }

    fn count_users(&self, key: &str) -> Result<usize, StorageError> {
        self.chaos("count_users")?;
        self.inner.count_users(key)
    }

    fn insert_user(&self, user: &User) -> Result<(), StorageError> {
        self.chaos("insert_user")?;
        self.inner.insert_user(user)
    }

    fn find_thread(&self, id: ThreadId) -> Result<Option<Thread>, StorageError> {
        self.chaos("find_thread")?;
        self.inner.find_thread(id)
    }

    fn insert_thread(&self, thread: &Thread) -> Result<(), StorageError> {
        self.chaos("insert_thread")?;
        self.inner.insert_thread(thread)
    }

    fn append_post(
        &self,
        id: ThreadId,
        post: &Post,
        touched_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        self.chaos("append_post")?;
        self.inner.append_post(id, post, touched_at)
    }

    fn query_threads(&self, query: &ThreadQuery) -> Result<Vec<Thread>, StorageError> {
        self.chaos("query_threads")?;
        self.inner.query_threads(query)
    }

    fn list_tags(&self) -> Result<Vec<Tag>, StorageError> {
        self.chaos("list_tags")?;
        self.inner.list_tags()
    }

    fn store_tag(&self, tag: &Tag) -> Result<(), StorageError> {
        self.chaos("store_tag")?;
        self.inner.store_tag(tag)
    }
}
