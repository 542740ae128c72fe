//! Thread listing engine.
//!
//! Turns a tag expression and an optional listing cursor into one page of
//! thread summaries, most recently active first. Malformed tokens fall back
//! to a fresh listing anchored slightly in the future, so threads touched
//! while a request is in flight are not missed.
//!
//! When the board has stored tags, the query is widened through the tag
//! hierarchy first: asking for `media` also matches threads tagged with any
//! descendant of `media`.

use chrono::{DateTime, TimeDelta, Utc};
use limbo_core::{ListCursor, TagQuery, TagTree};
use limbo_proto::ThreadListing;

use crate::storage::{Storage, StorageError, ThreadQuery};

/// One page of a thread listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPage {
    /// Summaries in listing order
    pub threads: Vec<ThreadListing>,
    /// Token for the following page
    pub next: Option<String>,
}

/// List threads matching `query`, resuming at `token`.
///
/// A next-page token is emitted only when the page is exactly full. A page
/// that happens to end on the last matching thread therefore still carries a
/// token, and following it yields an empty page.
pub fn list_threads<S: Storage>(
    storage: &S,
    query: Option<&str>,
    token: Option<&str>,
    limit: usize,
    skew: TimeDelta,
    now: DateTime<Utc>,
) -> Result<ThreadPage, StorageError> {
    let cursor = ListCursor::resolve(token, now, skew);
    let tags = expand_tags(storage, TagQuery::parse(query.unwrap_or_default()))?;

    let threads = storage.query_threads(&ThreadQuery::new(cursor, tags, limit))?;
    debug_assert!(threads.len() <= limit);

    let next = match threads.last() {
        Some(last) if threads.len() == limit => Some(ListCursor::after(last).encode()),
        _ => None,
    };

    Ok(ThreadPage { threads: threads.iter().map(|t| t.listing()).collect(), next })
}

fn expand_tags<S: Storage>(storage: &S, tags: TagQuery) -> Result<TagQuery, StorageError> {
    if tags.is_empty() {
        return Ok(tags);
    }

    let tree = TagTree::new(storage.list_tags()?);
    if tree.is_empty() {
        return Ok(tags);
    }

    Ok(tree.expand(&tags))
}
