//! Storage abstraction for the board.
//!
//! Trait-based abstraction for persisting users, threads and tags. The trait
//! is synchronous (no async) to keep the command handlers a plain function of
//! their inputs; the runtime moves calls off the async executor.

mod chaotic;
mod error;
mod memory;
mod redb;

pub use chaotic::ChaoticStorage;
pub use error::StorageError;
use chrono::{DateTime, Utc};
use limbo_core::{ListCursor, Post, Tag, TagQuery, Thread, ThreadId, User};
pub use memory::MemoryStorage;

pub use self::redb::RedbStorage;

/// Selection of threads for one listing page.
///
/// Threads come back ordered by last activity descending, ties broken by id
/// descending, and only those the cursor admits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadQuery {
    /// Page position
    pub cursor: ListCursor,
    /// Tag filter, already widened through the tag hierarchy
    pub tags: TagQuery,
    /// Maximum number of threads returned
    pub limit: usize,
}

impl ThreadQuery {
    /// Query from a cursor and a tag filter.
    pub fn new(cursor: ListCursor, tags: TagQuery, limit: usize) -> Self {
        Self { cursor, tags, limit }
    }

    /// Whether `thread` passes the tag filter.
    pub fn matches_tags(&self, thread: &Thread) -> bool {
        self.tags.matches(&thread.tags)
    }
}

/// Storage abstraction for board records
///
/// Must be Clone (shared by every connection), Send + Sync (thread-safe), and
/// synchronous (no async methods). Implementations share internal state via
/// Arc, so clones access the same underlying storage.
pub trait Storage: Clone + Send + Sync + 'static {
    /// Look up a user by identity key (lower-cased username).
    fn find_user(&self, key: &str) -> Result<Option<User>, StorageError>;

    /// Number of users registered under `key` (0 or 1).
    fn count_users(&self, key: &str) -> Result<usize, StorageError>;

    /// Store a new user.
    ///
    /// # Errors
    ///
    /// `Conflict` if a user with the same key exists.
    fn insert_user(&self, user: &User) -> Result<(), StorageError>;

    /// Look up a thread. `None` if it doesn't exist.
    fn find_thread(&self, id: ThreadId) -> Result<Option<Thread>, StorageError>;

    /// Store a new thread.
    ///
    /// # Errors
    ///
    /// `Conflict` if a thread with the same id exists.
    fn insert_thread(&self, thread: &Thread) -> Result<(), StorageError>;

    /// Append a post and set the thread's last activity to `touched_at`.
    ///
    /// Both changes happen atomically. Returns `false` if the thread doesn't
    /// exist.
    fn append_post(
        &self,
        id: ThreadId,
        post: &Post,
        touched_at: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// Threads for one listing page, see [`ThreadQuery`].
    fn query_threads(&self, query: &ThreadQuery) -> Result<Vec<Thread>, StorageError>;

    /// All stored tags. Order is not guaranteed.
    fn list_tags(&self) -> Result<Vec<Tag>, StorageError>;

    /// Create or replace a tag.
    fn store_tag(&self, tag: &Tag) -> Result<(), StorageError>;
}

/// Activity-index key bounding a cursor from above (exclusive).
///
/// `(before, MIN)` excludes every thread at `before`, which is the plain
/// "strictly earlier" cursor.
pub(crate) fn cursor_bound(cursor: &ListCursor) -> (DateTime<Utc>, ThreadId) {
    (cursor.before, cursor.tie.unwrap_or(ThreadId::MIN))
}
