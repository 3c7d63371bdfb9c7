// src/watch/dispatcher.rs

//! Raw per-directory notifications → typed [`FileChangeEntry`]s.

use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace, warn};

use crate::batch::PendingBuffer;
use crate::fs::FileSystem;
use crate::matcher::FileMatcher;
use crate::types::{FileChangeEntry, FileChangeType};
use crate::watch::event::{DirNotification, RawEvent, RawEventKind};
use crate::watch::registry::WatchRegistry;

/// Bridges raw notifications into the shared [`PendingBuffer`].
///
/// For every raw event the changed path is resolved against the notifying
/// directory and offered to each matcher registered on that directory; each
/// acceptance becomes one entry. Per-event problems are logged and the event
/// is dropped; dispatching always continues.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    registry: Arc<Mutex<WatchRegistry>>,
    pending: Arc<PendingBuffer>,
    fs: Arc<dyn FileSystem>,
}

impl EventDispatcher {
    pub fn new(
        registry: Arc<Mutex<WatchRegistry>>,
        pending: Arc<PendingBuffer>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            registry,
            pending,
            fs,
        }
    }

    pub fn pending(&self) -> &Arc<PendingBuffer> {
        &self.pending
    }

    /// Dispatch to every matcher registered on `note.dir`.
    ///
    /// Returns the number of entries queued.
    pub fn dispatch(&self, note: &DirNotification) -> usize {
        self.dispatch_scoped(note, None)
    }

    /// Dispatch only to `matcher`, if it is registered on `note.dir`.
    ///
    /// Used by per-matcher subscriptions so that overlapping roots do not
    /// report the same change twice for one matcher.
    pub fn dispatch_for(&self, note: &DirNotification, matcher: &Arc<FileMatcher>) -> usize {
        self.dispatch_scoped(note, Some(matcher))
    }

    fn dispatch_scoped(&self, note: &DirNotification, only: Option<&Arc<FileMatcher>>) -> usize {
        let interested: Vec<Arc<FileMatcher>> = self
            .registry()
            .interested(&note.dir)
            .into_iter()
            .filter(|m| only.is_none_or(|o| Arc::ptr_eq(m, o)))
            .collect();

        let mut entries = Vec::new();
        for event in &note.events {
            if event.kind == RawEventKind::Overflow {
                warn!(dir = ?note.dir, "overflow while listening; some changes were lost");
            } else if interested.is_empty() {
                trace!(dir = ?note.dir, name = ?event.name, "event for unregistered directory");
            } else {
                self.handle_event(&note.dir, event, &interested, only, &mut entries);
            }
        }

        let pushed = if entries.is_empty() {
            0
        } else {
            self.pending.push_all(entries)
        };

        if note.invalid {
            self.invalidate_tree(&note.dir, only);
        }

        pushed
    }

    fn handle_event(
        &self,
        dir: &Path,
        event: &RawEvent,
        interested: &[Arc<FileMatcher>],
        only: Option<&Arc<FileMatcher>>,
        entries: &mut Vec<FileChangeEntry>,
    ) {
        let Some(change_type) = FileChangeType::from_raw(event.kind) else {
            trace!(?dir, name = ?event.name, kind = ?event.kind, "ignoring unsupported event");
            return;
        };

        let Some(path) = resolve(dir, &event.name) else {
            warn!(?dir, name = ?event.name, "could not resolve event path; dropping event");
            return;
        };

        match change_type {
            FileChangeType::Delete if self.is_tracked_dir(&path, only) => {
                self.invalidate_tree(&path, only);
                return;
            }
            FileChangeType::Create if self.fs.is_dir(&path) => {
                self.track_new_dir(&path, interested, entries);
                return;
            }
            FileChangeType::Modify if self.fs.is_dir(&path) => return,
            _ => {}
        }

        for matcher in interested {
            let accepted = match change_type {
                FileChangeType::Delete => matcher.offer_deleted(&path),
                _ => matcher.offer(&path),
            };
            if !accepted {
                continue;
            }
            let Some(rel) = matcher.relativize(&path) else {
                continue;
            };
            debug!(matcher = %matcher, path = ?rel, %change_type, "change accepted");
            entries.push(FileChangeEntry::new(rel, change_type, Arc::clone(matcher)));
        }
    }

    /// Register a directory that appeared under a watched one, and report
    /// the files already inside it as created.
    fn track_new_dir(
        &self,
        dir: &Path,
        interested: &[Arc<FileMatcher>],
        entries: &mut Vec<FileChangeEntry>,
    ) {
        for matcher in interested.iter().filter(|m| m.should_descend(dir)) {
            let walked = self.registry().seed_subtree(self.fs.as_ref(), matcher, dir, true);
            match walked {
                Ok(outcome) => {
                    debug!(matcher = %matcher, ?dir, dirs = outcome.dirs.len(), "tracking new directory");
                    for file in outcome.accepted {
                        if let Some(rel) = matcher.relativize(&file) {
                            entries.push(FileChangeEntry::new(
                                rel,
                                FileChangeType::Create,
                                Arc::clone(matcher),
                            ));
                        }
                    }
                }
                Err(err) => {
                    warn!(matcher = %matcher, ?dir, error = %err, "failed to walk new directory");
                }
            }
        }
    }

    /// Forget `dir` and everything registered below it, purging the live
    /// sets of every matcher that was interested. A scoped dispatch
    /// withdraws only its own matcher.
    fn invalidate_tree(&self, dir: &Path, only: Option<&Arc<FileMatcher>>) {
        let removed: Vec<(PathBuf, Vec<Arc<FileMatcher>>)> = match only {
            Some(matcher) => self
                .registry()
                .unregister_tree_for(dir, matcher)
                .into_iter()
                .map(|gone| (gone, vec![Arc::clone(matcher)]))
                .collect(),
            None => self.registry().unregister_tree(dir),
        };
        for (gone, matchers) in removed {
            for matcher in matchers {
                let purged = matcher.dir_invalid(&gone);
                debug!(matcher = %matcher, dir = ?gone, purged, "directory invalidated");
            }
        }
    }

    fn is_tracked_dir(&self, path: &Path, only: Option<&Arc<FileMatcher>>) -> bool {
        let registry = self.registry();
        match only {
            Some(matcher) => registry.is_registered_for(path, matcher),
            None => registry.is_registered(path),
        }
    }

    fn registry(&self) -> MutexGuard<'_, WatchRegistry> {
        self.registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Join a reported entry name onto its directory.
///
/// Names must be plain relative paths; anything that could escape the
/// directory is rejected.
fn resolve(dir: &Path, name: &Path) -> Option<PathBuf> {
    if name.as_os_str().is_empty() {
        return None;
    }
    let plain = name.components().all(|c| matches!(c, Component::Normal(_)));
    plain.then(|| dir.join(name))
}
