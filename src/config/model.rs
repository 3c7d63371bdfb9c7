// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::matcher::FileMatcherBuilder;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// burst_delay_ms = 20
/// command = "./build.sh"
///
/// [[matcher]]
/// root = "."
/// recursive = false
/// include = ["*.scss"]
///
/// [[matcher]]
/// root = "scss"
/// include = ["**.scss"]
/// ```
///
/// This is the unvalidated form; see [`ConfigFile`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Process-level behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All `[[matcher]]` tables, in file order.
    #[serde(default)]
    pub matcher: Vec<MatcherConfig>,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub matcher: Vec<MatcherConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, matcher: Vec<MatcherConfig>) -> Self {
        Self { config, matcher }
    }

    pub fn matchers(&self) -> &[MatcherConfig] {
        &self.matcher
    }

    pub fn burst_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.config.burst_delay_ms)
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Quiet window (ms) a batch must observe before it is handed out.
    #[serde(default = "default_burst_delay_ms")]
    pub burst_delay_ms: u64,

    /// Maximum number of undrained changes kept in memory.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// Write the changed paths to the command's stdin.
    #[serde(default)]
    pub post_changes: bool,

    /// Command to run for each batch; the CLI argument wins if both are set.
    #[serde(default)]
    pub command: Option<String>,
}

fn default_burst_delay_ms() -> u64 {
    50
}

fn default_buffer_capacity() -> usize {
    crate::batch::DEFAULT_CAPACITY
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            burst_delay_ms: default_burst_delay_ms(),
            buffer_capacity: default_buffer_capacity(),
            post_changes: false,
            command: None,
        }
    }
}

/// One `[[matcher]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct MatcherConfig {
    /// Optional display name used in logs.
    #[serde(default)]
    pub name: Option<String>,

    /// Root directory; relative roots are resolved against the config
    /// file's directory.
    pub root: PathBuf,

    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Include rules (glob, or `regex:` prefixed). Empty means "everything".
    #[serde(default)]
    pub include: Vec<String>,

    /// Exclude rules; any match rejects.
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default = "default_true")]
    pub collect_matched: bool,

    #[serde(default)]
    pub collect_excluded: bool,
}

fn default_true() -> bool {
    true
}

impl MatcherConfig {
    /// Builder for this matcher with its root resolved against `base_dir`.
    pub fn to_builder(&self, base_dir: &Path) -> FileMatcherBuilder {
        let root = if self.root.is_absolute() {
            self.root.clone()
        } else {
            base_dir.join(&self.root)
        };

        let mut builder = FileMatcherBuilder::new(root)
            .recursive(self.recursive)
            .includes(self.include.iter().cloned())
            .excludes(self.exclude.iter().cloned())
            .collect_matched(self.collect_matched)
            .collect_excluded(self.collect_excluded);
        if let Some(name) = &self.name {
            builder = builder.name(name.clone());
        }
        builder
    }
}
