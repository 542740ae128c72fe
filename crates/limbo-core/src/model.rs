//! Users, threads and posts.
//!
//! A thread is created together with its first post and only ever grows by
//! appending. Post positions are 1-based and derived from append order; they
//! are never stored.

use chrono::{DateTime, SecondsFormat, Utc};
use limbo_proto::ThreadListing;
use serde::{Deserialize, Serialize};

use crate::id::ThreadId;

/// Render a timestamp the way clients expect it (RFC-3339, whole seconds).
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Lower-cased username, unique and immutable
    pub key: String,
    /// Username as typed at registration
    pub name: String,
    /// Opaque password hash
    pub password: Vec<u8>,
    /// Registration time
    pub registered: DateTime<Utc>,
    /// Elevated privilege (may reply to closed threads)
    pub admin: bool,
}

impl User {
    /// Create an ordinary user.
    pub fn new(name: &str, password: Vec<u8>, registered: DateTime<Utc>) -> Self {
        Self {
            key: Self::key_for(name),
            name: name.to_string(),
            password,
            registered,
            admin: false,
        }
    }

    /// Identity key for a username.
    pub fn key_for(username: &str) -> String {
        username.to_lowercase()
    }
}

/// One message in a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Author display name
    pub author: String,
    /// When the post was made
    pub date: DateTime<Utc>,
    /// Body text
    pub body: String,
}

/// A titled, ordered collection of posts.
///
/// # Invariants
///
/// - `posts` is never empty
/// - `last_activity >= created`
/// - `last_activity` is the timestamp of the most recent post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    /// Unique id
    pub id: ThreadId,
    /// Title, never empty
    pub title: String,
    /// Creator display name
    pub creator: String,
    /// Creation time
    pub created: DateTime<Utc>,
    /// Time of the most recent post
    pub last_activity: DateTime<Utc>,
    /// Posts in append order
    pub posts: Vec<Post>,
    /// Tags in insertion order
    pub tags: Vec<String>,
    /// Pinned by moderators
    pub sticky: bool,
    /// Replies restricted to admins
    pub closed: bool,
}

impl Thread {
    /// Create a thread with its opening post.
    pub fn new(
        id: ThreadId,
        title: String,
        author: String,
        body: String,
        tags: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let first = Post { author: author.clone(), date: now, body };
        Self {
            id,
            title,
            creator: author,
            created: now,
            last_activity: now,
            posts: vec![first],
            tags,
            sticky: false,
            closed: false,
        }
    }

    /// Number of posts, which is also the last valid position.
    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    /// Append a post and move the activity timestamp to `touched_at`.
    ///
    /// The timestamp never moves before the thread's creation, so a clock
    /// step backwards cannot break `last_activity >= created`.
    pub fn append(&mut self, post: Post, touched_at: DateTime<Utc>) {
        self.posts.push(post);
        self.last_activity = touched_at.max(self.created);
    }

    /// Post at a 1-based position.
    pub fn post(&self, position: usize) -> Option<&Post> {
        position.checked_sub(1).and_then(|i| self.posts.get(i))
    }

    /// Composite id of the post at `position`.
    pub fn post_id(&self, position: usize) -> String {
        format!("{}:{}", self.id, position)
    }

    /// Summary for thread listings.
    pub fn listing(&self) -> ThreadListing {
        ThreadListing {
            id: self.id.to_string(),
            title: self.title.clone(),
            user: self.creator.clone(),
            date: format_date(&self.created),
            posts: self.post_count(),
            tags: self.tags.clone(),
            sticky: self.sticky,
            closed: self.closed,
        }
    }
}
