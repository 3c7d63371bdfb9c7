// src/watch/event.rs

//! Raw per-directory notifications, as delivered by a native watch primitive
//! before any matching happens.

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEventKind {
    Create,
    Modify,
    Delete,
    /// The native queue dropped events; the tree should be considered stale.
    Overflow,
    /// Anything the native layer reports that we do not map (access, ...).
    Unsupported,
}

/// One raw event: a kind and the entry name relative to the notifying
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: RawEventKind,
    pub name: PathBuf,
}

impl RawEvent {
    pub fn new(kind: RawEventKind, name: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// A batch of raw events for one watched directory.
///
/// `invalid` signals that the directory's own registration is no longer
/// valid (deleted, moved away); it is applied after `events`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirNotification {
    pub dir: PathBuf,
    pub events: Vec<RawEvent>,
    pub invalid: bool,
}

impl DirNotification {
    pub fn new(dir: impl Into<PathBuf>, events: Vec<RawEvent>) -> Self {
        Self {
            dir: dir.into(),
            events,
            invalid: false,
        }
    }

    pub fn single(dir: impl Into<PathBuf>, kind: RawEventKind, name: impl Into<PathBuf>) -> Self {
        Self::new(dir, vec![RawEvent::new(kind, name)])
    }

    /// Notification carrying only the "registration became invalid" signal.
    pub fn invalidated(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            events: Vec::new(),
            invalid: true,
        }
    }
}
