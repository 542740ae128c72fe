//! Fuzz target for thread windows
//!
//! Any range token or explicit range against any thread length must produce
//! a window inside the thread, with `more` set iff posts remain past it.

#![no_main]

use arbitrary::Arbitrary;
use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use limbo_core::{Post, Thread, ThreadId, render_thread};
use limbo_proto::Range;

#[derive(Debug, Arbitrary)]
struct Input {
    token: String,
    explicit: Option<(usize, usize)>,
    posts: u8,
}

fuzz_target!(|input: Input| {
    let now = Utc.timestamp_opt(1_400_000_000, 0).unwrap();
    let mut thread = Thread::new(
        ThreadId::MIN,
        "fuzz".to_string(),
        "op".to_string(),
        String::new(),
        Vec::new(),
        now,
    );
    for _ in 0..input.posts {
        thread.append(Post { author: "u".to_string(), date: now, body: String::new() }, now);
    }

    let explicit = input.explicit.map(|(start, end)| Range::new(start, end));
    let view = render_thread(&thread, explicit, Some(&input.token), Range::new(1, 50));
    let range = view.range.expect("window is always reported");
    let total = thread.post_count();

    assert!(range.start >= 1);
    assert!(range.end <= total);
    assert_eq!(view.more, range.end < total);
    assert_eq!(view.next.is_some(), view.more);
    assert!(view.messages.len() <= total);
});
