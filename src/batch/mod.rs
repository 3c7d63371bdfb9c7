// src/batch/mod.rs

//! Consumer-facing batching.
//!
//! [`PendingBuffer`] is the shared queue dispatchers push into;
//! [`BatchCollector`] drains it with blocking, timed and debounced
//! (`take_batch`) variants. The helpers below reduce a batch to what glue
//! code usually needs: the set of changed absolute paths.

pub mod collector;
pub mod pending;

use std::collections::BTreeSet;
use std::path::PathBuf;

pub use collector::{BatchCollector, Interrupted};
pub use pending::{DEFAULT_CAPACITY, PendingBuffer};

use crate::types::FileChangeEntry;

/// Absolute paths of a batch, duplicates kept, in batch order.
pub fn paths(batch: &[FileChangeEntry]) -> Vec<PathBuf> {
    batch.iter().map(FileChangeEntry::absolute_path).collect()
}

/// Unique absolute paths of a batch; change types and matchers are dropped.
pub fn unique_paths(batch: &[FileChangeEntry]) -> BTreeSet<PathBuf> {
    batch.iter().map(FileChangeEntry::absolute_path).collect()
}

/// Newline-terminated UTF-8 listing of `paths`, used as script stdin.
pub fn post_body<'a, I>(paths: I) -> String
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    let mut body = String::new();
    for path in paths {
        body.push_str(&path.to_string_lossy());
        body.push('\n');
    }
    body
}
