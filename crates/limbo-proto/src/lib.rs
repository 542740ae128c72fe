//! Limbo bulletin-board wire protocol.
//!
//! Commands and responses are JSON objects tagged by a `"cmd"` field and
//! exchanged one per line. Field names follow the BBS protocol the original
//! clients speak (`wrt` for "with regard to", `next` for continuation
//! tokens), so the Rust names are mapped with serde attributes where they
//! differ.
//!
//! # Invariants
//!
//! Every [`Command`] and [`Response`] variant has exactly one `cmd` tag.
//! Encoding never emits a newline, so a line is always one message.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod commands;
pub mod errors;
pub mod messages;

pub use commands::{
    Command, GetCommand, ListCommand, LoginCommand, PostCommand, RegisterCommand, ReplyCommand,
};
pub use errors::{ProtocolError, Result};
pub use messages::{
    AccessInfo, ErrorMessage, HelloMessage, ListMessage, Message, OkMessage, Range, Response,
    ThreadListing, ThreadMessage,
};

/// Protocol version advertised in the hello response.
pub const PROTOCOL_VERSION: u32 = 0;
