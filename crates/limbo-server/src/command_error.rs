//! Command failures.
//!
//! Display strings are what clients see in `error` responses. Storage causes
//! are logged at the failure site and never included here.

use thiserror::Error;

/// Why a command was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Username empty or over the length limit
    #[error("Invalid username.")]
    InvalidUsername,

    /// Password below the hasher's minimum
    #[error("Password too short.")]
    PasswordTooShort,

    /// Username registered already (case-insensitive)
    #[error("Username is already taken.")]
    UsernameTaken,

    /// Unknown user or wrong password; deliberately indistinguishable
    #[error("Invalid username or password.")]
    LoginFailed,

    /// Thread id not in canonical form
    #[error("Invalid thread ID.")]
    InvalidThreadId,

    /// No thread with this id
    #[error("No such thread: {0}")]
    ThreadNotFound(String),

    /// Command needs a logged-in session
    #[error("You need to log in first.")]
    AuthRequired,

    /// Blank thread title
    #[error("Thread title can't be blank.")]
    TitleRequired,

    /// Storing a new thread failed
    #[error("Couldn't post.")]
    PostFailed,

    /// Reply to a closed thread by an ordinary user
    #[error("Can't reply to a closed thread.")]
    ThreadClosed,

    /// Storing a reply failed
    #[error("DB error: couldn't add reply.")]
    ReplyFailed,

    /// Board listings requested; this server has a single board
    #[error("No boards!")]
    NoBoards,

    /// Listing type not served
    #[error("Unsupported list type: {0}")]
    UnsupportedList(String),

    /// Storage failed during a read-mostly command
    #[error("Operation failed, try again later.")]
    Unavailable,
}

/// Coarse failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Bad input shape; retrying unchanged fails again
    Validation,
    /// Not logged in, wrong credentials, or not permitted
    Auth,
    /// Referenced record absent
    NotFound,
    /// Backend failure; cause logged, not exposed
    Storage,
}

impl CommandError {
    /// Class of this failure.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidUsername
            | Self::PasswordTooShort
            | Self::UsernameTaken
            | Self::InvalidThreadId
            | Self::TitleRequired
            | Self::NoBoards
            | Self::UnsupportedList(_) => ErrorClass::Validation,
            Self::LoginFailed | Self::AuthRequired | Self::ThreadClosed => ErrorClass::Auth,
            Self::ThreadNotFound(_) => ErrorClass::NotFound,
            Self::PostFailed | Self::ReplyFailed | Self::Unavailable => ErrorClass::Storage,
        }
    }
}
