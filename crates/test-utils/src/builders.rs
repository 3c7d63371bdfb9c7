#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use folderwatch::config::{ConfigFile, ConfigSection, MatcherConfig, RawConfigFile};
use tempfile::TempDir;

/// Temporary directory tree for tests touching the real filesystem.
///
/// The directory is removed when the value is dropped.
pub struct TempTree {
    dir: TempDir,
    root: PathBuf,
}

impl TempTree {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        // Canonical, so paths compare equal to what the watcher reports
        // (e.g. /private/var vs /var on macOS).
        let root = dir.path().canonicalize().expect("canonicalize temp dir");
        Self { dir, root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Absolute path of `rel` inside the tree.
    pub fn abs(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Write `contents` to `rel`, creating parent directories.
    pub fn file(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.abs(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    pub fn dir(&self, rel: &str) -> PathBuf {
        let path = self.abs(rel);
        fs::create_dir_all(&path).expect("create dir");
        path
    }

    pub fn with_file(self, rel: &str, contents: &str) -> Self {
        self.file(rel, contents);
        self
    }

    pub fn with_dir(self, rel: &str) -> Self {
        self.dir(rel);
        self
    }

    pub fn into_temp_dir(self) -> TempDir {
        self.dir
    }
}

impl Default for TempTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                matcher: Vec::new(),
            },
        }
    }

    pub fn with_matcher(mut self, matcher: MatcherConfig) -> Self {
        self.config.matcher.push(matcher);
        self
    }

    pub fn with_burst_delay_ms(mut self, ms: u64) -> Self {
        self.config.config.burst_delay_ms = ms;
        self
    }

    pub fn with_command(mut self, cmd: &str) -> Self {
        self.config.config.command = Some(cmd.to_string());
        self
    }

    pub fn with_post_changes(mut self, val: bool) -> Self {
        self.config.config.post_changes = val;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a single `[[matcher]]` table.
pub struct MatcherConfigBuilder {
    matcher: MatcherConfig,
}

impl MatcherConfigBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            matcher: MatcherConfig {
                name: None,
                root: root.into(),
                recursive: true,
                include: Vec::new(),
                exclude: Vec::new(),
                collect_matched: true,
                collect_excluded: false,
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.matcher.name = Some(name.to_string());
        self
    }

    pub fn include(mut self, pattern: &str) -> Self {
        self.matcher.include.push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.matcher.exclude.push(pattern.to_string());
        self
    }

    pub fn recursive(mut self, val: bool) -> Self {
        self.matcher.recursive = val;
        self
    }

    pub fn collect_excluded(mut self, val: bool) -> Self {
        self.matcher.collect_excluded = val;
        self
    }

    pub fn build(self) -> MatcherConfig {
        self.matcher
    }
}
