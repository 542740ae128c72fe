//! Limbo board core.
//!
//! Pure logic with no I/O: the thread/post data model, the tag-expression
//! query language, range and listing cursors, and the thread rendering
//! engine. Storage and transport live in `limbo-server`; this crate only
//! consumes and produces plain records.
//!
//! # Components
//!
//! - [`tags`]: `music+art-spam` expressions and the tag hierarchy closure
//! - [`cursor`]: range tokens (`"51-"`) and listing cursors (RFC-3339)
//! - [`model`]: [`User`], [`Thread`], [`Post`]
//! - [`view`]: windowed thread views with "more data" signalling
//! - [`env`]: clock and randomness, so tests can run on virtual time

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cursor;
pub mod env;
pub mod error;
pub mod id;
pub mod model;
pub mod tags;
pub mod view;

pub use cursor::{ListCursor, decode_range_token, next_range_token};
pub use env::Environment;
pub use error::IdError;
pub use id::ThreadId;
pub use model::{Post, Thread, User, format_date};
pub use tags::{Tag, TagQuery, TagTree};
pub use view::{effective_range, render_thread};
