//! Redb-backed durable storage implementation.
//!
//! Uses Redb's ACID transactions with Copy-on-Write for crash safety.
//! All state survives server restarts. Records are CBOR-encoded; the
//! activity index is a key-only table whose byte order equals listing order.

use std::{path::Path, sync::Arc};

use chrono::{DateTime, Utc};
use limbo_core::{Post, Tag, Thread, ThreadId, User, id::THREAD_ID_LEN};
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::{Serialize, de::DeserializeOwned};

use super::{Storage, StorageError, ThreadQuery, cursor_bound};

/// Byte-keyed table holding byte values.
type Table = TableDefinition<'static, &'static [u8], &'static [u8]>;

/// Table: users
/// Key: identity key (lower-cased username) as UTF-8
/// Value: CBOR-encoded User
const USERS: Table = TableDefinition::new("users");

/// Table: threads
/// Key: thread id [12 bytes]
/// Value: CBOR-encoded Thread
const THREADS: Table = TableDefinition::new("threads");

/// Table: activity
/// Key: (last_activity, thread id) [24 bytes], see `encode_activity_key`
/// Value: empty
const ACTIVITY: Table = TableDefinition::new("activity");

/// Table: tags
/// Key: lower-cased tag name as UTF-8
/// Value: CBOR-encoded Tag
const TAGS: Table = TableDefinition::new("tags");

/// Activity entries carry no value.
const EMPTY: &[u8] = &[];

/// Length of an activity key.
const ACTIVITY_KEY_LEN: usize = 12 + THREAD_ID_LEN;

/// Durable storage backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbStorage {
    db: Arc<Database>,
}

impl RedbStorage {
    /// Open or create a Redb database at the given path.
    ///
    /// Creates tables if they don't exist (USERS, THREADS, ACTIVITY, TAGS).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path.as_ref()).map_err(io)?;

        let txn = db.begin_write().map_err(io)?;
        {
            let _ = txn.open_table(USERS).map_err(io)?;
            let _ = txn.open_table(THREADS).map_err(io)?;
            let _ = txn.open_table(ACTIVITY).map_err(io)?;
            let _ = txn.open_table(TAGS).map_err(io)?;
        }
        txn.commit().map_err(io)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn get<T: DeserializeOwned>(
        &self,
        table: Table,
        key: &[u8],
    ) -> Result<Option<T>, StorageError> {
        let txn = self.db.begin_read().map_err(io)?;
        let table = txn.open_table(table).map_err(io)?;

        match table.get(key).map_err(io)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    /// Insert `value` under `key`, failing if the key is taken.
    fn insert_new<T: Serialize>(
        &self,
        table: Table,
        key: &[u8],
        value: &T,
        what: impl FnOnce() -> String,
    ) -> Result<(), StorageError> {
        let bytes = encode(value)?;
        let txn = self.db.begin_write().map_err(io)?;
        {
            let mut table = txn.open_table(table).map_err(io)?;
            if table.get(key).map_err(io)?.is_some() {
                return Err(StorageError::Conflict(what()));
            }
            table.insert(key, bytes.as_slice()).map_err(io)?;
        }
        txn.commit().map_err(io)?;
        Ok(())
    }
}

impl Storage for RedbStorage {
    fn find_user(&self, key: &str) -> Result<Option<User>, StorageError> {
        self.get(USERS, key.as_bytes())
    }

    fn count_users(&self, key: &str) -> Result<usize, StorageError> {
        let txn = self.db.begin_read().map_err(io)?;
        let table = txn.open_table(USERS).map_err(io)?;
        Ok(usize::from(table.get(key.as_bytes()).map_err(io)?.is_some()))
    }

    fn insert_user(&self, user: &User) -> Result<(), StorageError> {
        self.insert_new(USERS, user.key.as_bytes(), user, || format!("user {}", user.key))
    }

    fn find_thread(&self, id: ThreadId) -> Result<Option<Thread>, StorageError> {
        self.get(THREADS, id.as_bytes())
    }

    fn insert_thread(&self, thread: &Thread) -> Result<(), StorageError> {
        let bytes = encode(thread)?;
        let txn = self.db.begin_write().map_err(io)?;
        {
            let mut threads = txn.open_table(THREADS).map_err(io)?;
            if threads.get(thread.id.as_bytes().as_slice()).map_err(io)?.is_some() {
                return Err(StorageError::Conflict(format!("thread {}", thread.id)));
            }
            threads.insert(thread.id.as_bytes().as_slice(), bytes.as_slice()).map_err(io)?;

            let mut activity = txn.open_table(ACTIVITY).map_err(io)?;
            let key = encode_activity_key(thread.last_activity, thread.id);
            activity.insert(key.as_slice(), EMPTY).map_err(io)?;
        }
        txn.commit().map_err(io)?;
        Ok(())
    }

    fn append_post(
        &self,
        id: ThreadId,
        post: &Post,
        touched_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let txn = self.db.begin_write().map_err(io)?;
        {
            let mut threads = txn.open_table(THREADS).map_err(io)?;
            let stored =
                threads.get(id.as_bytes().as_slice()).map_err(io)?.map(|v| v.value().to_vec());
            let Some(stored) = stored else {
                return Ok(false);
            };

            let mut thread: Thread = decode(&stored)?;
            let old_key = encode_activity_key(thread.last_activity, id);
            thread.append(post.clone(), touched_at);
            let new_key = encode_activity_key(thread.last_activity, id);

            let bytes = encode(&thread)?;
            threads.insert(id.as_bytes().as_slice(), bytes.as_slice()).map_err(io)?;

            let mut activity = txn.open_table(ACTIVITY).map_err(io)?;
            activity.remove(old_key.as_slice()).map_err(io)?;
            activity.insert(new_key.as_slice(), EMPTY).map_err(io)?;
        }
        txn.commit().map_err(io)?;
        Ok(true)
    }

    fn query_threads(&self, query: &ThreadQuery) -> Result<Vec<Thread>, StorageError> {
        let txn = self.db.begin_read().map_err(io)?;
        let activity = txn.open_table(ACTIVITY).map_err(io)?;
        let threads = txn.open_table(THREADS).map_err(io)?;

        let (before, tie) = cursor_bound(&query.cursor);
        let bound = encode_activity_key(before, tie);

        let mut page = Vec::with_capacity(query.limit.min(64));
        for result in activity.range(..bound.as_slice()).map_err(io)?.rev() {
            if page.len() >= query.limit {
                break;
            }

            let (key, _) = result.map_err(io)?;
            let id = decode_activity_id(key.value())?;

            let Some(value) = threads.get(id.as_bytes().as_slice()).map_err(io)? else {
                return Err(StorageError::NotFound(format!("indexed thread {id}")));
            };
            let thread: Thread = decode(value.value())?;

            if query.matches_tags(&thread) {
                page.push(thread);
            }
        }

        Ok(page)
    }

    fn list_tags(&self) -> Result<Vec<Tag>, StorageError> {
        let txn = self.db.begin_read().map_err(io)?;
        let table = txn.open_table(TAGS).map_err(io)?;

        let mut tags = Vec::with_capacity(table.len().map_err(io)? as usize);
        for result in table.iter().map_err(io)? {
            let (_, value) = result.map_err(io)?;
            tags.push(decode(value.value())?);
        }

        Ok(tags)
    }

    fn store_tag(&self, tag: &Tag) -> Result<(), StorageError> {
        let bytes = encode(tag)?;
        let txn = self.db.begin_write().map_err(io)?;
        {
            let mut table = txn.open_table(TAGS).map_err(io)?;
            table.insert(tag.id.as_bytes(), bytes.as_slice()).map_err(io)?;
        }
        txn.commit().map_err(io)?;
        Ok(())
    }
}

fn io(err: impl std::fmt::Display) -> StorageError {
    StorageError::Io(err.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(bytes)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StorageError> {
    ciborium::from_reader(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Encode (last_activity, id) as a 24-byte key.
///
/// Layout: [seconds: 8 bytes BE, sign bit flipped][nanos: 4 bytes BE][id: 12 bytes]
/// Flipping the sign bit makes lexicographic order match numeric order for
/// negative timestamps too.
fn encode_activity_key(at: DateTime<Utc>, id: ThreadId) -> [u8; ACTIVITY_KEY_LEN] {
    let mut key = [0u8; ACTIVITY_KEY_LEN];
    let secs = (at.timestamp() as u64) ^ (1 << 63);
    key[..8].copy_from_slice(&secs.to_be_bytes());
    key[8..12].copy_from_slice(&at.timestamp_subsec_nanos().to_be_bytes());
    key[12..].copy_from_slice(id.as_bytes());
    key
}

/// Thread id from an activity key.
fn decode_activity_id(key: &[u8]) -> Result<ThreadId, StorageError> {
    let bytes: [u8; THREAD_ID_LEN] = key
        .get(12..)
        .and_then(|id| id.try_into().ok())
        .ok_or_else(|| {
            StorageError::Serialization(format!("bad activity key length {}", key.len()))
        })?;
    Ok(ThreadId::from_bytes(bytes))
}
