// src/matcher/match_set.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Live bookkeeping of the paths one matcher currently accepts and rejects.
///
/// Each side is `None` when collection is disabled so that callers can tell
/// "not tracking" apart from "nothing matched". Paths are stored relative to
/// the matcher root.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    matched: Option<BTreeSet<PathBuf>>,
    excluded: Option<BTreeSet<PathBuf>>,
}

impl MatchSet {
    pub fn new(collect_matched: bool, collect_excluded: bool) -> Self {
        Self {
            matched: collect_matched.then(BTreeSet::new),
            excluded: collect_excluded.then(BTreeSet::new),
        }
    }

    pub fn matched(&self) -> Option<&BTreeSet<PathBuf>> {
        self.matched.as_ref()
    }

    pub fn excluded(&self) -> Option<&BTreeSet<PathBuf>> {
        self.excluded.as_ref()
    }

    /// Record the outcome of an offer. A path lives in at most one side.
    pub fn record(&mut self, path: &Path, accepted: bool) {
        let (keep, drop) = if accepted {
            (&mut self.matched, &mut self.excluded)
        } else {
            (&mut self.excluded, &mut self.matched)
        };
        if let Some(set) = drop {
            set.remove(path);
        }
        if let Some(set) = keep {
            set.insert(path.to_path_buf());
        }
    }

    /// Remove `path` from both sides. Returns true if anything was removed.
    pub fn remove(&mut self, path: &Path) -> bool {
        let a = self.matched.as_mut().is_some_and(|s| s.remove(path));
        let b = self.excluded.as_mut().is_some_and(|s| s.remove(path));
        a || b
    }

    /// Remove every path whose parent is exactly `dir`.
    ///
    /// `dir` is relative to the matcher root; the root itself is the empty
    /// path.
    pub fn remove_dir(&mut self, dir: &Path) -> usize {
        let mut removed = 0;
        for set in [self.matched.as_mut(), self.excluded.as_mut()].into_iter().flatten() {
            let before = set.len();
            set.retain(|p| p.parent() != Some(dir));
            removed += before - set.len();
        }
        removed
    }
}
