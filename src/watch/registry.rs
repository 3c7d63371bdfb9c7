// src/watch/registry.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, trace, warn};

use crate::fs::FileSystem;
use crate::matcher::FileMatcher;

/// Outcome of walking (part of) a matcher's tree.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Directories that were descended into, in visit order.
    pub dirs: Vec<PathBuf>,
    /// Absolute paths of files the matcher accepted.
    pub accepted: Vec<PathBuf>,
    /// Number of files offered (accepted or not).
    pub offered: usize,
}

/// Which matchers care about which concrete directory.
///
/// A directory shared by overlapping roots is registered once and carries
/// every interested matcher, in registration order and without duplicates.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    dirs: HashMap<PathBuf, Vec<Arc<FileMatcher>>>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `matcher` with `dir`. Returns false if it already was.
    pub fn register(&mut self, dir: &Path, matcher: &Arc<FileMatcher>) -> bool {
        let interested = self.dirs.entry(dir.to_path_buf()).or_default();
        if interested.iter().any(|m| Arc::ptr_eq(m, matcher)) {
            return false;
        }
        trace!(?dir, matcher = %matcher, "registered directory");
        interested.push(Arc::clone(matcher));
        true
    }

    /// Drop `dir` and return the matchers that were interested in it.
    pub fn unregister(&mut self, dir: &Path) -> Vec<Arc<FileMatcher>> {
        self.dirs.remove(dir).unwrap_or_default()
    }

    /// Drop `dir` and every registered directory below it.
    ///
    /// Deepest directories come first.
    pub fn unregister_tree(&mut self, dir: &Path) -> Vec<(PathBuf, Vec<Arc<FileMatcher>>)> {
        self.subtree(dir)
            .into_iter()
            .map(|d| {
                let matchers = self.unregister(&d);
                (d, matchers)
            })
            .collect()
    }

    /// Withdraw only `matcher` from `dir` and every registered directory
    /// below it. Directories left with no interested matcher are dropped;
    /// other matchers keep their registrations.
    ///
    /// Returns the directories `matcher` was withdrawn from, deepest first.
    pub fn unregister_tree_for(&mut self, dir: &Path, matcher: &Arc<FileMatcher>) -> Vec<PathBuf> {
        let mut withdrawn = Vec::new();
        for d in self.subtree(dir) {
            let Some(interested) = self.dirs.get_mut(&d) else {
                continue;
            };
            let before = interested.len();
            interested.retain(|m| !Arc::ptr_eq(m, matcher));
            if interested.len() == before {
                continue;
            }
            if interested.is_empty() {
                self.dirs.remove(&d);
            }
            withdrawn.push(d);
        }
        withdrawn
    }

    /// Registered directories at or below `dir`, deepest first.
    fn subtree(&self, dir: &Path) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = self
            .dirs
            .keys()
            .filter(|d| d.starts_with(dir))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.components().count().cmp(&a.components().count()).then(a.cmp(b)));
        found
    }

    /// Matchers interested in `dir` (empty if it is not registered).
    pub fn interested(&self, dir: &Path) -> Vec<Arc<FileMatcher>> {
        self.dirs.get(dir).cloned().unwrap_or_default()
    }

    pub fn is_registered(&self, dir: &Path) -> bool {
        self.dirs.contains_key(dir)
    }

    /// Whether `matcher` in particular is registered on `dir`.
    pub fn is_registered_for(&self, dir: &Path, matcher: &Arc<FileMatcher>) -> bool {
        self.dirs
            .get(dir)
            .is_some_and(|interested| interested.iter().any(|m| Arc::ptr_eq(m, matcher)))
    }

    /// All registered directories, sorted.
    pub fn directories(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.dirs.keys().cloned().collect();
        dirs.sort();
        dirs
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Walk `matcher`'s tree from its root, offering every file to the
    /// matcher and (if `register`) registering every visited directory.
    ///
    /// Failing to read the root itself is an error; unreadable
    /// subdirectories are logged and skipped.
    pub fn seed(
        &mut self,
        fs: &dyn FileSystem,
        matcher: &Arc<FileMatcher>,
        register: bool,
    ) -> Result<WalkOutcome> {
        let root = matcher.root_path_abs().to_path_buf();
        let outcome = self
            .walk_from(fs, matcher, &root, register)
            .with_context(|| format!("seeding matcher {matcher} from {:?}", root))?;
        debug!(
            matcher = %matcher,
            dirs = outcome.dirs.len(),
            offered = outcome.offered,
            accepted = outcome.accepted.len(),
            "initial walk finished"
        );
        Ok(outcome)
    }

    /// Walk a directory that appeared after the initial walk.
    ///
    /// The caller decides whether `matcher` descends into `dir` at all.
    pub fn seed_subtree(
        &mut self,
        fs: &dyn FileSystem,
        matcher: &Arc<FileMatcher>,
        dir: &Path,
        register: bool,
    ) -> Result<WalkOutcome> {
        self.walk_from(fs, matcher, dir, register)
    }

    fn walk_from(
        &mut self,
        fs: &dyn FileSystem,
        matcher: &Arc<FileMatcher>,
        start: &Path,
        register: bool,
    ) -> Result<WalkOutcome> {
        let mut outcome = WalkOutcome::default();

        let first = fs.read_dir(start)?;
        let mut stack = vec![(start.to_path_buf(), first)];

        while let Some((dir, children)) = stack.pop() {
            if register {
                self.register(&dir, matcher);
            }
            outcome.dirs.push(dir.clone());

            let mut subdirs = Vec::new();
            for path in children {
                if fs.is_dir(&path) {
                    if matcher.should_descend(&path) {
                        subdirs.push(path);
                    }
                } else if fs.is_file(&path) {
                    outcome.offered += 1;
                    if matcher.offer(&path) {
                        outcome.accepted.push(path);
                    }
                }
            }

            // Reverse so the stack pops subdirectories in listing order.
            for sub in subdirs.into_iter().rev() {
                match fs.read_dir(&sub) {
                    Ok(children) => stack.push((sub, children)),
                    Err(err) => {
                        warn!(dir = ?sub, error = %err, "skipping unreadable directory");
                    }
                }
            }
        }

        Ok(outcome)
    }
}
