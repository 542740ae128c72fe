//! Client commands.
//!
//! One variant per protocol command. Payload structs carry only what the
//! client sends; authentication state lives in the server's session, never
//! in a command.

use serde::{Deserialize, Serialize};

use crate::{
    errors::{ProtocolError, Result},
    messages::Range,
};

/// Maximum accepted length of a single command line in bytes.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// All commands a client can send.
///
/// Serialized with an internal `"cmd"` tag, e.g.
/// `{"cmd":"get","id":"5f1d7c...","token":"51-"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum Command {
    /// Ask for server information
    Hello,
    /// Create an account
    Register(RegisterCommand),
    /// Authenticate the session
    Login(LoginCommand),
    /// Drop authentication
    Logout,
    /// Fetch a window of one thread
    Get(GetCommand),
    /// List threads
    List(ListCommand),
    /// Start a new thread
    Post(PostCommand),
    /// Reply to a thread
    Reply(ReplyCommand),
}

impl Command {
    /// Decode one command line.
    ///
    /// Surrounding whitespace (including the trailing newline) is ignored.
    pub fn decode(line: &str) -> Result<Self> {
        if line.len() > MAX_LINE_LEN {
            return Err(ProtocolError::TooLarge { size: line.len(), max: MAX_LINE_LEN });
        }

        let line = line.trim();
        if line.is_empty() {
            return Err(ProtocolError::Empty);
        }

        serde_json::from_str(line).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    /// Encode as a single JSON line without the trailing newline.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    /// Protocol name of the command, used as `wrt` in replies.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hello => "hello",
            Self::Register(_) => "register",
            Self::Login(_) => "login",
            Self::Logout => "logout",
            Self::Get(_) => "get",
            Self::List(_) => "list",
            Self::Post(_) => "post",
            Self::Reply(_) => "reply",
        }
    }
}

/// Account registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCommand {
    /// Desired username, case preserved for display
    pub username: String,
    /// Plaintext password
    pub password: String,
}

/// Session login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCommand {
    /// Username (matched case-insensitively)
    pub username: String,
    /// Plaintext password
    pub password: String,
    /// Client protocol version, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

/// Thread fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCommand {
    /// Thread id in canonical text form
    pub id: String,
    /// Explicit post window; takes precedence over `token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    /// Continuation token from a previous `msg` response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Requested body format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Thread listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCommand {
    /// Listing kind; only `"thread"` is served
    #[serde(rename = "type", default = "default_list_kind")]
    pub kind: String,
    /// Tag expression such as `"music+art-spam"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Continuation token from a previous `list` response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_list_kind() -> String {
    "thread".to_string()
}

/// New thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCommand {
    /// Thread title, must not be blank
    pub title: String,
    /// Body of the first post
    #[serde(default)]
    pub body: String,
    /// Body format hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Tags in display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Reply to an existing thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyCommand {
    /// Target thread id
    pub to: String,
    /// Reply body
    #[serde(default)]
    pub body: String,
    /// Body format hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_unit_commands() {
        assert_eq!(Command::decode(r#"{"cmd":"hello"}"#).unwrap(), Command::Hello);
        assert_eq!(Command::decode("{\"cmd\":\"logout\"}\n").unwrap(), Command::Logout);
    }

    #[test]
    fn decode_get_with_token() {
        let cmd = Command::decode(r#"{"cmd":"get","id":"abc","token":"51-"}"#).unwrap();
        let Command::Get(get) = cmd else { panic!("expected get") };
        assert_eq!(get.id, "abc");
        assert_eq!(get.token.as_deref(), Some("51-"));
        assert!(get.range.is_none());
    }

    #[test]
    fn decode_get_with_range() {
        let cmd =
            Command::decode(r#"{"cmd":"get","id":"abc","range":{"start":5,"end":9}}"#).unwrap();
        let Command::Get(get) = cmd else { panic!("expected get") };
        assert_eq!(get.range, Some(Range::new(5, 9)));
    }

    #[test]
    fn list_kind_defaults_to_thread() {
        let cmd = Command::decode(r#"{"cmd":"list","query":"a+b"}"#).unwrap();
        let Command::List(list) = cmd else { panic!("expected list") };
        assert_eq!(list.kind, "thread");
        assert_eq!(list.query.as_deref(), Some("a+b"));
    }

    #[test]
    fn reject_empty_and_unknown() {
        assert_eq!(Command::decode("  \n"), Err(ProtocolError::Empty));
        assert!(matches!(
            Command::decode(r#"{"cmd":"delete"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(Command::decode("not json"), Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn reject_oversized_line() {
        let line = "x".repeat(MAX_LINE_LEN + 1);
        assert!(matches!(Command::decode(&line), Err(ProtocolError::TooLarge { .. })));
    }

    #[test]
    fn command_names_match_tags() {
        let cmd = Command::Reply(ReplyCommand {
            to: "abc".to_string(),
            body: "hi".to_string(),
            format: None,
        });
        let encoded = cmd.encode().unwrap();
        assert!(encoded.starts_with(r#"{"cmd":"reply""#));
        assert_eq!(cmd.name(), "reply");
    }
}
