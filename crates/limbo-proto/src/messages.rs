//! Server responses.
//!
//! These structs are the wire-visible contract: ids, titles, authors,
//! RFC-3339 dates, tags, flags, post counts, ranges, the more flag and
//! continuation tokens.

use serde::{Deserialize, Serialize};

use crate::errors::{ProtocolError, Result};

/// Inclusive 1-based window over a thread's post positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// First position, inclusive
    pub start: usize,
    /// Last position, inclusive
    pub end: usize,
}

impl Range {
    /// Create a range `[start, end]`.
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Distance between the bounds (`end - start`), zero for inverted ranges.
    pub const fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether `position` falls inside the window.
    pub const fn contains(&self, position: usize) -> bool {
        position >= self.start && position <= self.end
    }
}

/// All responses the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum Response {
    /// Server information
    Hello(HelloMessage),
    /// Command succeeded
    Ok(OkMessage),
    /// Command failed
    Error(ErrorMessage),
    /// A window of one thread
    Msg(ThreadMessage),
    /// A page of thread summaries
    List(ListMessage),
}

impl Response {
    /// Encode as a single JSON line without the trailing newline.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    /// Decode one response line.
    pub fn decode(line: &str) -> Result<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ProtocolError::Empty);
        }
        serde_json::from_str(line).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    /// Success reply to `wrt` without a result value.
    pub fn ok(wrt: impl Into<String>) -> Self {
        Self::Ok(OkMessage { wrt: wrt.into(), result: None })
    }

    /// Failure reply to `wrt`.
    pub fn error(wrt: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Error(ErrorMessage { wrt: wrt.into(), error: error.into() })
    }
}

/// Reply to `hello`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloMessage {
    /// Board name
    pub name: String,
    /// Protocol version
    pub version: u32,
    /// Board description
    pub desc: String,
    /// Server software identifier
    pub server: String,
    /// Optional protocol features supported
    pub options: Vec<String>,
    /// Commands available per authentication state
    pub access: AccessInfo,
    /// Body formats the server can emit
    pub formats: Vec<String>,
    /// Listing kinds served
    pub lists: Vec<String>,
    /// Board icon location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Window used by `get` when no range or token is given
    pub default_range: Range,
}

/// Commands by authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessInfo {
    /// Usable without logging in
    pub guest: Vec<String>,
    /// Additionally usable once logged in
    pub user: Vec<String>,
}

/// Generic success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OkMessage {
    /// Command this replies to
    pub wrt: String,
    /// Command-specific result, e.g. a new thread id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

/// Generic failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Command this replies to
    pub wrt: String,
    /// Human-readable reason
    pub error: String,
}

/// One window of a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    /// Thread id
    pub id: String,
    /// Thread title
    pub title: String,
    /// Window actually served
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    /// Whether replies are restricted
    #[serde(default)]
    pub closed: bool,
    /// Body format of `messages`
    pub format: String,
    /// Thread tags in insertion order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Whether posts exist past `range.end`
    #[serde(default)]
    pub more: bool,
    /// Token for the following window, present when `more` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Posts in the window, in thread order
    pub messages: Vec<Message>,
}

/// One post as rendered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Composite id `"<thread id>:<position>"`
    pub id: String,
    /// Author display name
    pub user: String,
    /// RFC-3339 timestamp
    pub date: String,
    /// Post body
    pub body: String,
}

/// Reply to `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMessage {
    /// Listing kind, echoed from the command
    #[serde(rename = "type")]
    pub kind: String,
    /// Tag expression, echoed from the command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Thread summaries, most recently active first
    pub threads: Vec<ThreadListing>,
    /// Token for the following page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Summary of one thread in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadListing {
    /// Thread id
    pub id: String,
    /// Thread title
    pub title: String,
    /// Creator display name
    pub user: String,
    /// RFC-3339 creation time
    pub date: String,
    /// Number of posts
    pub posts: usize,
    /// Thread tags in insertion order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Pinned to the top by moderators
    #[serde(default)]
    pub sticky: bool,
    /// Replies restricted
    #[serde(default)]
    pub closed: bool,
}
