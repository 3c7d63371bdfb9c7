// src/types.rs

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::matcher::FileMatcher;
use crate::watch::event::RawEventKind;

/// Kind of change reported to batch consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileChangeType {
    Create,
    Modify,
    Delete,
}

impl FileChangeType {
    /// Classify a raw native event. Overflow and unknown kinds have no
    /// change type and are dropped by the dispatcher.
    pub fn from_raw(kind: RawEventKind) -> Option<Self> {
        match kind {
            RawEventKind::Create => Some(FileChangeType::Create),
            RawEventKind::Modify => Some(FileChangeType::Modify),
            RawEventKind::Delete => Some(FileChangeType::Delete),
            RawEventKind::Overflow | RawEventKind::Unsupported => None,
        }
    }
}

impl fmt::Display for FileChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileChangeType::Create => "CREATE",
            FileChangeType::Modify => "MODIFY",
            FileChangeType::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// One accepted change: a root-relative path, its change type and the
/// matcher that accepted it.
///
/// Two entries are equal iff path, type and matcher *identity* are equal.
#[derive(Clone)]
pub struct FileChangeEntry {
    path: PathBuf,
    change_type: FileChangeType,
    matcher: Arc<FileMatcher>,
}

impl FileChangeEntry {
    pub fn new(path: impl Into<PathBuf>, change_type: FileChangeType, matcher: Arc<FileMatcher>) -> Self {
        Self {
            path: path.into(),
            change_type,
            matcher,
        }
    }

    /// Path relative to the accepting matcher's root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn change_type(&self) -> FileChangeType {
        self.change_type
    }

    pub fn matcher(&self) -> &Arc<FileMatcher> {
        &self.matcher
    }

    /// True if this entry was accepted by exactly `matcher` (identity).
    pub fn is_from(&self, matcher: &Arc<FileMatcher>) -> bool {
        Arc::ptr_eq(&self.matcher, matcher)
    }

    /// Absolute path: matcher root joined with the relative path.
    pub fn absolute_path(&self) -> PathBuf {
        self.matcher.root_path_abs().join(&self.path)
    }
}

impl PartialEq for FileChangeEntry {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.change_type == other.change_type
            && Arc::ptr_eq(&self.matcher, &other.matcher)
    }
}

impl Eq for FileChangeEntry {}

impl Hash for FileChangeEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
        self.change_type.hash(state);
        std::ptr::hash(Arc::as_ptr(&self.matcher), state);
    }
}

impl fmt::Debug for FileChangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileChangeEntry")
            .field("path", &self.path)
            .field("change_type", &self.change_type)
            .field("matcher", &format_args!("{}", self.matcher))
            .finish()
    }
}
