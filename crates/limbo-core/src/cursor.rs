//! Continuation tokens.
//!
//! Two kinds, both opaque to clients:
//!
//! - Range tokens resume a thread view: `"<start>-<end>"` or the open-ended
//!   `"<start>-"`. Open-ended tokens are resolved against the thread's post
//!   count at the time of the *next* request, so a token handed out before new
//!   replies arrive still yields a full window afterwards.
//! - Listing cursors resume a thread listing: an RFC-3339 timestamp, meaning
//!   "threads active strictly before T", optionally suffixed with
//!   `@<thread id>` to break ties between threads sharing that timestamp.
//!
//! Decoding never fails loudly: malformed tokens fall back to the defaults.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use limbo_proto::Range;

use crate::{id::ThreadId, model::Thread};

/// Decode a range token relative to a thread with `post_count` posts.
///
/// `"<start>-"` spans one default window from `start`, clamped to
/// `post_count`. `"<start>-<end>"` is taken verbatim. Anything else yields
/// `default`.
pub fn decode_range_token(token: &str, post_count: usize, default: Range) -> Range {
    let Some((start, end)) = token.split_once('-') else {
        return default;
    };
    if end.contains('-') {
        return default;
    }
    let Ok(start) = start.parse::<usize>() else {
        return default;
    };

    if end.is_empty() {
        let end = start.saturating_add(default.width());
        return Range::new(start, end.min(post_count));
    }

    match end.parse::<usize>() {
        Ok(end) => Range::new(start, end),
        Err(_) => default,
    }
}

/// Token for the window following one that ended at `end`.
pub fn next_range_token(end: usize) -> String {
    format!("{}-", end.saturating_add(1))
}

/// Position in a thread listing.
///
/// Admits threads whose last activity is strictly before `before`. With a
/// tie-break id, threads active exactly at `before` are admitted when their
/// id is smaller, matching the listing order (activity descending, then id
/// descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListCursor {
    /// Upper activity bound
    pub before: DateTime<Utc>,
    /// Id of the last thread already served at `before`
    pub tie: Option<ThreadId>,
}

impl ListCursor {
    /// Cursor for a fresh listing: slightly in the future so threads touched
    /// while the request is in flight are still included.
    pub fn anchored(now: DateTime<Utc>, skew: TimeDelta) -> Self {
        Self { before: now + skew, tie: None }
    }

    /// Cursor resuming after `thread`.
    pub fn after(thread: &Thread) -> Self {
        Self { before: thread.last_activity, tie: Some(thread.id) }
    }

    /// Decode a listing token. `None` when malformed.
    pub fn decode(token: &str) -> Option<Self> {
        let (stamp, tie) = match token.split_once('@') {
            Some((stamp, id)) => (stamp, Some(ThreadId::parse(id).ok()?)),
            None => (token, None),
        };
        let before = DateTime::parse_from_rfc3339(stamp).ok()?.with_timezone(&Utc);
        Some(Self { before, tie })
    }

    /// Decode `token`, or anchor at `now + skew` when absent or malformed.
    pub fn resolve(token: Option<&str>, now: DateTime<Utc>, skew: TimeDelta) -> Self {
        token.and_then(Self::decode).unwrap_or_else(|| Self::anchored(now, skew))
    }

    /// Encode as an RFC-3339 timestamp with full precision.
    pub fn encode(&self) -> String {
        let stamp = self.before.to_rfc3339_opts(SecondsFormat::Nanos, true);
        match self.tie {
            Some(id) => format!("{stamp}@{id}"),
            None => stamp,
        }
    }

    /// Whether a thread at `(last_activity, id)` lies past this cursor.
    pub fn admits(&self, last_activity: DateTime<Utc>, id: ThreadId) -> bool {
        match self.tie {
            None => last_activity < self.before,
            Some(tie) => (last_activity, id) < (self.before, tie),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const DEFAULT: Range = Range::new(1, 50);

    #[test]
    fn explicit_range_is_verbatim() {
        assert_eq!(decode_range_token("3-7", 100, DEFAULT), Range::new(3, 7));
        assert_eq!(decode_range_token("90-200", 100, DEFAULT), Range::new(90, 200));
    }

    #[test]
    fn open_range_spans_one_default_window() {
        assert_eq!(decode_range_token("5-", 100, DEFAULT), Range::new(5, 54));
        assert_eq!(decode_range_token("5-", 54, DEFAULT), Range::new(5, 54));
    }

    #[test]
    fn open_range_clamps_to_post_count() {
        assert_eq!(decode_range_token("5-", 20, DEFAULT), Range::new(5, 20));
    }

    #[test]
    fn malformed_tokens_fall_back() {
        for token in ["", "5", "x-", "5-x", "1-2-3", "-5", "--", "no"] {
            assert_eq!(decode_range_token(token, 100, DEFAULT), DEFAULT, "token {token:?}");
        }
    }

    #[test]
    fn next_token_is_open_ended() {
        assert_eq!(next_range_token(50), "51-");
    }

    #[test]
    fn listing_cursor_plain_timestamp() {
        let cursor = ListCursor::decode("2014-05-13T16:53:20Z").unwrap();
        assert_eq!(cursor.before, Utc.timestamp_opt(1_400_000_000, 0).unwrap());
        assert!(cursor.tie.is_none());
    }

    #[test]
    fn listing_cursor_with_tie_break() {
        let before = Utc.timestamp_opt(1_400_000_000, 123_456_789).unwrap();
        let tie = ThreadId::from_bytes([9; 12]);
        let cursor = ListCursor { before, tie: Some(tie) };

        let token = cursor.encode();
        assert_eq!(token, "2014-05-13T16:53:20.123456789Z@090909090909090909090909");
        assert_eq!(ListCursor::decode(&token), Some(cursor));
    }

    #[test]
    fn listing_cursor_rejects_garbage() {
        assert!(ListCursor::decode("yesterday").is_none());
        assert!(ListCursor::decode("2014-05-13T16:53:20Z@nothex").is_none());
    }

    #[test]
    fn resolve_falls_back_to_anchor() {
        let now = Utc.timestamp_opt(1_400_000_000, 0).unwrap();
        let skew = TimeDelta::seconds(5);
        let anchored = ListCursor::anchored(now, skew);

        assert_eq!(ListCursor::resolve(None, now, skew), anchored);
        assert_eq!(ListCursor::resolve(Some("bogus"), now, skew), anchored);
        assert_eq!(anchored.before, now + skew);
    }

    #[test]
    fn admits_respects_tie_break() {
        let t = Utc.timestamp_opt(1_400_000_000, 0).unwrap();
        let low = ThreadId::from_bytes([1; 12]);
        let mid = ThreadId::from_bytes([5; 12]);
        let high = ThreadId::from_bytes([9; 12]);

        let plain = ListCursor { before: t, tie: None };
        assert!(!plain.admits(t, low));
        assert!(plain.admits(t - TimeDelta::seconds(1), high));

        let tied = ListCursor { before: t, tie: Some(mid) };
        assert!(tied.admits(t, low));
        assert!(!tied.admits(t, mid));
        assert!(!tied.admits(t, high));
        assert!(tied.admits(t - TimeDelta::nanoseconds(1), high));
    }
}
