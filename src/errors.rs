// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

/// Which live set of a matcher an accessor asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Matched,
    Excluded,
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionKind::Matched => f.write_str("matched"),
            CollectionKind::Excluded => f.write_str("excluded"),
        }
    }
}

#[derive(Error, Debug)]
pub enum FolderWatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A matched/excluded accessor was used on a matcher that never enabled
    /// that collection. This is never reported as an empty set.
    #[error(
        "matcher for {root:?} is not collecting {kind} files; enable collect_{kind} before init"
    )]
    NotCollecting { kind: CollectionKind, root: PathBuf },

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FolderWatchError>;
