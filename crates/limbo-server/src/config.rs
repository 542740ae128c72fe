//! Board and runtime configuration.
//!
//! The driver receives a [`BoardConfig`]; only the binary reads files. The
//! optional TOML file uses the `[server]`, `[bbs]` and `[database]` sections;
//! command-line values override it.

use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use limbo_proto::Range;
use serde::Deserialize;

use crate::error::ServerError;

/// Settings the command handlers depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Board name, sent in `hello`
    pub name: String,
    /// Board description, sent in `hello`
    pub desc: String,
    /// Threads per listing page
    pub page_size: usize,
    /// Window served by `get` without range or token
    pub default_range: Range,
    /// Longest accepted username, in characters
    pub username_limit: usize,
    /// How far past "now" a fresh listing is anchored
    pub listing_skew: TimeDelta,
    /// Board icon location, sent in `hello`
    pub icon: Option<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "Limbo".to_string(),
            desc: "A text board.".to_string(),
            page_size: 50,
            default_range: Range::new(1, 50),
            username_limit: 32,
            listing_skew: TimeDelta::seconds(5),
            icon: Some("/static/icon.png".to_string()),
        }
    }
}

/// Process-level settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Address to bind to (e.g., "0.0.0.0:8080")
    pub bind_address: String,
    /// Database file; `None` keeps everything in memory
    pub database: Option<PathBuf>,
    /// Handler settings
    pub board: BoardConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            database: None,
            board: BoardConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Defaults overlaid with the values present in `file`.
    pub fn from_file(file: FileConfig) -> Self {
        let mut config = Self::default();
        let board = &mut config.board;

        if let Some(bind) = file.server.bind {
            config.bind_address = bind;
        }
        config.database = file.database.path;
        if let Some(name) = file.bbs.name {
            board.name = name;
        }
        if let Some(desc) = file.bbs.desc {
            board.desc = desc;
        }
        if let Some(page_size) = file.bbs.page_size {
            board.page_size = page_size;
        }
        if let Some(limit) = file.bbs.username_limit {
            board.username_limit = limit;
        }
        if let Some(icon) = file.bbs.icon {
            board.icon = (!icon.is_empty()).then_some(icon);
        }

        config
    }
}

/// On-disk configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// `[server]`
    pub server: ServerSection,
    /// `[bbs]`
    pub bbs: BbsSection,
    /// `[database]`
    pub database: DatabaseSection,
}

/// `[server]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Listen address
    pub bind: Option<String>,
}

/// `[bbs]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BbsSection {
    /// Board name
    pub name: Option<String>,
    /// Board description
    pub desc: Option<String>,
    /// Threads per listing page
    pub page_size: Option<usize>,
    /// Longest accepted username
    pub username_limit: Option<usize>,
    /// Icon location; empty disables it
    pub icon: Option<String>,
}

/// `[database]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// Database file
    pub path: Option<PathBuf>,
}

impl FileConfig {
    /// Parse TOML text.
    pub fn parse(text: &str) -> Result<Self, ServerError> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("couldn't read {}: {e}", path.display())))?;
        Self::parse(&text)
    }
}
