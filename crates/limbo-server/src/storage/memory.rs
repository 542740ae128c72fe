#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::{
    collections::{BTreeSet, HashMap},
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use limbo_core::{Post, Tag, Thread, ThreadId, User};

use super::{Storage, StorageError, ThreadQuery, cursor_bound};

/// In-memory storage implementation for testing and simulation
///
/// Uses `HashMap` for lookups and a `BTreeSet` activity index for listing
/// order. All state is wrapped in `Arc<Mutex<>>` to allow Clone and
/// concurrent access; one lock covers every table, so `append_post` updates
/// the thread and its index entry atomically. A poisoned lock surfaces as
/// `StorageError::Io` rather than a panic.
#[derive(Clone)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryStorageInner>>,
}

#[derive(Default)]
struct MemoryStorageInner {
    /// Users by identity key
    users: HashMap<String, User>,

    /// Threads by id
    threads: HashMap<ThreadId, Thread>,

    /// `(last_activity, id)` for every thread, ascending
    activity: BTreeSet<(DateTime<Utc>, ThreadId)>,

    /// Tags by lower-cased name
    tags: HashMap<String, Tag>,
}

impl MemoryStorage {
    /// Create a new empty `MemoryStorage`
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(MemoryStorageInner::default())) }
    }

    /// Total number of stored threads.
    pub fn thread_count(&self) -> Result<usize, StorageError> {
        Ok(self.lock()?.threads.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryStorageInner>, StorageError> {
        self.inner.lock().map_err(|_| StorageError::Io("memory storage lock poisoned".to_string()))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn find_user(&self, key: &str) -> Result<Option<User>, StorageError> {
        Ok(self.lock()?.users.get(key).cloned())
    }

    fn count_users(&self, key: &str) -> Result<usize, StorageError> {
        Ok(usize::from(self.lock()?.users.contains_key(key)))
    }

    fn insert_user(&self, user: &User) -> Result<(), StorageError> {
        let mut inner = self.lock()?;
        if inner.users.contains_key(&user.key) {
            return Err(StorageError::Conflict(format!("user {}", user.key)));
        }
        inner.users.insert(user.key.clone(), user.clone());
        Ok(())
    }

    fn find_thread(&self, id: ThreadId) -> Result<Option<Thread>, StorageError> {
        Ok(self.lock()?.threads.get(&id).cloned())
    }

    fn insert_thread(&self, thread: &Thread) -> Result<(), StorageError> {
        let mut inner = self.lock()?;
        if inner.threads.contains_key(&thread.id) {
            return Err(StorageError::Conflict(format!("thread {}", thread.id)));
        }
        inner.activity.insert((thread.last_activity, thread.id));
        inner.threads.insert(thread.id, thread.clone());

        debug_assert_eq!(inner.activity.len(), inner.threads.len());
        Ok(())
    }

    fn append_post(
        &self,
        id: ThreadId,
        post: &Post,
        touched_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let mut inner = self.lock()?;
        let inner = &mut *inner;

        let Some(thread) = inner.threads.get_mut(&id) else {
            return Ok(false);
        };

        inner.activity.remove(&(thread.last_activity, id));
        thread.append(post.clone(), touched_at);
        inner.activity.insert((thread.last_activity, id));

        debug_assert_eq!(inner.activity.len(), inner.threads.len());
        Ok(true)
    }

    fn query_threads(&self, query: &ThreadQuery) -> Result<Vec<Thread>, StorageError> {
        let inner = self.lock()?;

        let threads = inner
            .activity
            .range(..cursor_bound(&query.cursor))
            .rev()
            .filter_map(|(_, id)| inner.threads.get(id))
            .filter(|thread| query.matches_tags(thread))
            .take(query.limit)
            .cloned()
            .collect();

        Ok(threads)
    }

    fn list_tags(&self) -> Result<Vec<Tag>, StorageError> {
        Ok(self.lock()?.tags.values().cloned().collect())
    }

    fn store_tag(&self, tag: &Tag) -> Result<(), StorageError> {
        self.lock()?.tags.insert(tag.id.clone(), tag.clone());
        Ok(())
    }
}
