//! Thread rendering.
//!
//! Turns a stored thread plus an optional range or continuation token into
//! one bounded window of posts. The served range is always clamped to the
//! posts that exist, and `more` is exact: it is set iff at least one post
//! lies past the window.

use limbo_proto::{Message, Range, ThreadMessage};

use crate::{
    cursor::{decode_range_token, next_range_token},
    model::{Thread, format_date},
};

/// Body format of rendered posts.
pub const FORMAT: &str = "markdown";

/// Window to serve for a request.
///
/// An explicit range takes precedence over a token; with neither, `default`
/// is used. The end is clamped to the post count and the start raised to 1.
pub fn effective_range(
    thread: &Thread,
    range: Option<Range>,
    token: Option<&str>,
    default: Range,
) -> Range {
    let total = thread.post_count();
    let requested = match (range, token) {
        (Some(range), _) => range,
        (None, Some(token)) => decode_range_token(token, total, default),
        (None, None) => default,
    };

    Range::new(requested.start.max(1), requested.end.min(total))
}

/// Render one window of `thread`.
pub fn render_thread(
    thread: &Thread,
    range: Option<Range>,
    token: Option<&str>,
    default: Range,
) -> ThreadMessage {
    let range = effective_range(thread, range, token, default);
    let more = range.end < thread.post_count();

    let messages = (range.start..=range.end)
        .filter_map(|position| thread.post(position).map(|post| (position, post)))
        .map(|(position, post)| Message {
            id: thread.post_id(position),
            user: post.author.clone(),
            date: format_date(&post.date),
            body: post.body.clone(),
        })
        .collect();

    ThreadMessage {
        id: thread.id.to_string(),
        title: thread.title.clone(),
        range: Some(range),
        closed: thread.closed,
        format: FORMAT.to_string(),
        tags: thread.tags.clone(),
        more,
        next: more.then(|| next_range_token(range.end)),
        messages,
    }
}
