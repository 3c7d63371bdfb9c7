// src/matcher/file_matcher.rs

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::trace;

use crate::errors::{CollectionKind, FolderWatchError, Result};
use crate::matcher::match_set::MatchSet;
use crate::matcher::path_rules::PathRules;
use crate::matcher::rule::Rule;
use crate::watch::path_utils::{absolutize, normalize_lexically, relative_path, slash_string};

/// A root directory + recursion flag + rules + live matched/excluded sets.
///
/// Rules are fixed once built. The live sets sit behind one mutex per
/// matcher, so `matched()` snapshots never interleave with a half-applied
/// dispatcher update.
///
/// Matchers are shared as `Arc<FileMatcher>`; identity (not structural
/// equality) is what `FileChangeEntry` compares.
pub struct FileMatcher {
    name: Option<String>,
    root: PathBuf,
    root_abs: PathBuf,
    recursive: bool,
    rules: PathRules,
    live: Mutex<MatchSet>,
    collect_matched: bool,
    collect_excluded: bool,
}

impl fmt::Debug for FileMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileMatcher")
            .field("name", &self.name)
            .field("root", &self.root_abs)
            .field("recursive", &self.recursive)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for FileMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "FileMatcher:{}", slash_string(&self.root)),
        }
    }
}

impl FileMatcher {
    pub fn builder(root: impl Into<PathBuf>) -> FileMatcherBuilder {
        FileMatcherBuilder::new(root)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Root as configured (normalized, possibly relative).
    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// Absolute root all events and walks are resolved against.
    pub fn root_path_abs(&self) -> &Path {
        &self.root_abs
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn rules(&self) -> &PathRules {
        &self.rules
    }

    pub fn is_collecting_matched(&self) -> bool {
        self.collect_matched
    }

    pub fn is_collecting_excluded(&self) -> bool {
        self.collect_excluded
    }

    /// Express `path` relative to this matcher's root.
    ///
    /// Relative inputs are taken as already root-relative.
    pub fn relativize(&self, path: &Path) -> Option<PathBuf> {
        if path.is_absolute() {
            relative_path(&self.root_abs, path)
        } else {
            Some(normalize_lexically(path))
        }
    }

    fn evaluate(&self, path: &Path) -> Option<(PathBuf, bool)> {
        let rel = self.relativize(path)?;
        let abs = slash_string(&self.root_abs.join(&rel));
        let accepted = self.rules.is_match(&slash_string(&rel), &abs);
        Some((rel, accepted))
    }

    pub fn is_match(&self, path: &Path) -> bool {
        self.evaluate(path).is_some_and(|(_, accepted)| accepted)
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        match self.relativize(path) {
            Some(rel) => {
                let abs = slash_string(&self.root_abs.join(&rel));
                self.rules.is_excluded(&slash_string(&rel), &abs)
            }
            None => false,
        }
    }

    /// Evaluate `path` and record the result in the live sets.
    ///
    /// Returns true if the path is accepted. Paths outside the root are
    /// rejected without being recorded.
    pub fn offer(&self, path: &Path) -> bool {
        let Some((rel, accepted)) = self.evaluate(path) else {
            trace!(matcher = %self, ?path, "offered path outside matcher root");
            return false;
        };
        self.live().record(&rel, accepted);
        accepted
    }

    /// Evaluate a deleted path and drop it from the live sets in one step.
    ///
    /// Readers of `matched()` never observe the deleted path in between.
    pub fn offer_deleted(&self, path: &Path) -> bool {
        let Some((rel, accepted)) = self.evaluate(path) else {
            return false;
        };
        self.live().remove(&rel);
        accepted
    }

    /// Forget `path` in both live sets. Idempotent.
    pub fn file_deleted(&self, path: &Path) {
        if let Some(rel) = self.relativize(path) {
            self.live().remove(&rel);
        }
    }

    /// Forget every tracked file whose parent directory is `dir`.
    ///
    /// Returns how many entries were dropped.
    pub fn dir_invalid(&self, dir: &Path) -> usize {
        match self.relativize(dir) {
            Some(rel) => self.live().remove_dir(&rel),
            None => 0,
        }
    }

    /// Whether the initial walk (and lazy registration) descends into `dir`.
    pub fn should_descend(&self, dir: &Path) -> bool {
        let is_root = self.relativize(dir).is_some_and(|rel| rel.as_os_str().is_empty());
        is_root || (self.recursive && !self.is_excluded(dir))
    }

    /// Snapshot of accepted paths, relative to the root.
    pub fn matched(&self) -> Result<BTreeSet<PathBuf>> {
        self.snapshot(CollectionKind::Matched)
    }

    /// Snapshot of rejected paths, relative to the root.
    pub fn excluded(&self) -> Result<BTreeSet<PathBuf>> {
        self.snapshot(CollectionKind::Excluded)
    }

    pub fn matched_count(&self) -> Result<usize> {
        self.count(CollectionKind::Matched)
    }

    pub fn excluded_count(&self) -> Result<usize> {
        self.count(CollectionKind::Excluded)
    }

    fn snapshot(&self, kind: CollectionKind) -> Result<BTreeSet<PathBuf>> {
        let live = self.live();
        self.side(&live, kind).cloned()
    }

    fn count(&self, kind: CollectionKind) -> Result<usize> {
        let live = self.live();
        self.side(&live, kind).map(BTreeSet::len)
    }

    fn side<'a>(&self, live: &'a MatchSet, kind: CollectionKind) -> Result<&'a BTreeSet<PathBuf>> {
        let side = match kind {
            CollectionKind::Matched => live.matched(),
            CollectionKind::Excluded => live.excluded(),
        };
        side.ok_or_else(|| FolderWatchError::NotCollecting {
            kind,
            root: self.root.clone(),
        })
    }

    fn live(&self) -> MutexGuard<'_, MatchSet> {
        // The sets stay structurally valid even if a holder panicked.
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Configuration for a [`FileMatcher`].
///
/// Defaults mirror the usual "watch a tree" setup: recursive, collecting
/// matched files, not collecting excluded ones.
#[derive(Debug, Clone)]
pub struct FileMatcherBuilder {
    name: Option<String>,
    root: PathBuf,
    recursive: bool,
    includes: Vec<String>,
    excludes: Vec<String>,
    extra_includes: Vec<Rule>,
    extra_excludes: Vec<Rule>,
    collect_matched: bool,
    collect_excluded: bool,
}

impl FileMatcherBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            name: None,
            root: root.into(),
            recursive: true,
            includes: Vec::new(),
            excludes: Vec::new(),
            extra_includes: Vec::new(),
            extra_excludes: Vec::new(),
            collect_matched: true,
            collect_excluded: false,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.includes.push(pattern.into());
        self
    }

    pub fn includes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add an already built include rule (e.g. [`Rule::predicate`]).
    pub fn include_rule(mut self, rule: Rule) -> Self {
        self.extra_includes.push(rule);
        self
    }

    pub fn exclude_rule(mut self, rule: Rule) -> Self {
        self.extra_excludes.push(rule);
        self
    }

    pub fn collect_matched(mut self, collect: bool) -> Self {
        self.collect_matched = collect;
        self
    }

    pub fn collect_excluded(mut self, collect: bool) -> Self {
        self.collect_excluded = collect;
        self
    }

    /// Compile all rules and resolve the root.
    pub fn build(self) -> Result<FileMatcher> {
        if self.root.as_os_str().is_empty() {
            return Err(FolderWatchError::ConfigError(
                "matcher root must not be empty".to_string(),
            ));
        }

        let compiled = PathRules::compile(&self.includes, &self.excludes)?;
        let mut includes = compiled.includes().to_vec();
        includes.extend(self.extra_includes);
        let mut excludes = compiled.excludes().to_vec();
        excludes.extend(self.extra_excludes);

        let normalized = normalize_lexically(&self.root);
        let root = if normalized.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            normalized
        };
        let root_abs = absolutize(&root);

        Ok(FileMatcher {
            name: self.name,
            root,
            root_abs,
            recursive: self.recursive,
            rules: PathRules::new(includes, excludes),
            live: Mutex::new(MatchSet::new(self.collect_matched, self.collect_excluded)),
            collect_matched: self.collect_matched,
            collect_excluded: self.collect_excluded,
        })
    }
}
