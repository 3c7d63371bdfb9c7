// src/watch/session.rs

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::batch::{BatchCollector, DEFAULT_CAPACITY, PendingBuffer};
use crate::errors::{FolderWatchError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::matcher::{FileMatcher, FileMatcherBuilder};
use crate::types::{FileChangeEntry, FileChangeType};
use crate::watch::dispatcher::EventDispatcher;
use crate::watch::registry::WatchRegistry;
use crate::watch::watcher::{Subscription, subscribe};

/// A watch session: a set of matchers, the directory registry they share,
/// the pending buffer, and one native subscription per matcher.
///
/// Typical use:
///
/// 1. `add` matchers,
/// 2. `init(true)` to walk the trees and start watching,
/// 3. drain batches through [`collector`](Self::collector) or
///    [`take_batch`](Self::take_batch),
/// 4. `close` (or drop) to release the subscriptions.
///
/// The initial walk only seeds the live sets; it does not queue entries.
#[derive(Debug)]
pub struct FolderWatcher {
    matchers: Vec<Arc<FileMatcher>>,
    registry: Arc<Mutex<WatchRegistry>>,
    pending: Arc<PendingBuffer>,
    fs: Arc<dyn FileSystem>,
    subscriptions: Vec<Subscription>,
    initialized: bool,
}

impl Default for FolderWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FolderWatcher {
    pub fn new() -> Self {
        Self::with_options(Arc::new(RealFileSystem), DEFAULT_CAPACITY)
    }

    /// Session over a custom filesystem and pending-buffer bound.
    pub fn with_options(fs: Arc<dyn FileSystem>, capacity: usize) -> Self {
        Self {
            matchers: Vec::new(),
            registry: Arc::new(Mutex::new(WatchRegistry::new())),
            pending: Arc::new(PendingBuffer::new(capacity)),
            fs,
            subscriptions: Vec::new(),
            initialized: false,
        }
    }

    /// Session with a single matcher built from `builder`.
    pub fn single(builder: FileMatcherBuilder) -> Result<(Self, Arc<FileMatcher>)> {
        let mut watcher = Self::new();
        let matcher = watcher.add(builder.build()?)?;
        Ok((watcher, matcher))
    }

    /// Add a matcher. Matchers cannot be added once `init` has run.
    pub fn add(&mut self, matcher: impl Into<Arc<FileMatcher>>) -> Result<Arc<FileMatcher>> {
        if self.initialized {
            return Err(FolderWatchError::ConfigError(
                "matchers must be added before init".to_string(),
            ));
        }
        let matcher = matcher.into();
        self.matchers.push(Arc::clone(&matcher));
        Ok(matcher)
    }

    pub fn matchers(&self) -> &[Arc<FileMatcher>] {
        &self.matchers
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Seed every matcher from its tree and, if `register_for_watch`,
    /// register the visited directories and open one native subscription
    /// per matcher.
    ///
    /// Watching requires a Tokio runtime. Any subscription failure closes
    /// the ones already opened and is returned.
    pub fn init(&mut self, register_for_watch: bool) -> Result<()> {
        if self.initialized {
            return Err(FolderWatchError::ConfigError(
                "watch session already initialised".to_string(),
            ));
        }
        if self.matchers.is_empty() {
            return Err(FolderWatchError::ConfigError(
                "watch session has no matchers".to_string(),
            ));
        }
        if register_for_watch && tokio::runtime::Handle::try_current().is_err() {
            return Err(FolderWatchError::ConfigError(
                "init(true) must be called from within a Tokio runtime".to_string(),
            ));
        }

        for matcher in &self.matchers {
            self.registry().seed(self.fs.as_ref(), matcher, register_for_watch)?;
        }

        if register_for_watch {
            let dispatcher = self.dispatcher();
            for matcher in self.matchers.clone() {
                match subscribe(matcher, dispatcher.clone()) {
                    Ok(sub) => self.subscriptions.push(sub),
                    Err(err) => {
                        self.close();
                        return Err(err);
                    }
                }
            }
        }

        self.initialized = true;
        info!(
            matchers = self.matchers.len(),
            directories = self.registry().len(),
            watching = register_for_watch,
            "watch session initialised"
        );
        Ok(())
    }

    /// Release every native subscription. Live sets and queued changes are
    /// left as they are.
    pub fn close(&mut self) {
        for sub in &mut self.subscriptions {
            sub.close();
        }
        self.subscriptions.clear();
    }

    /// Consumer handle over this session's pending buffer.
    pub fn collector(&self) -> BatchCollector {
        BatchCollector::new(Arc::clone(&self.pending))
    }

    /// Dispatcher feeding this session; useful for custom watch primitives.
    pub fn dispatcher(&self) -> EventDispatcher {
        EventDispatcher::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.pending),
            Arc::clone(&self.fs),
        )
    }

    /// Debounced batch, see [`BatchCollector::take_batch`].
    pub async fn take_batch(
        &self,
        burst_delay: Duration,
        cancel: &CancellationToken,
    ) -> Option<Vec<FileChangeEntry>> {
        self.collector().take_batch(burst_delay, cancel).await
    }

    /// Directories currently registered for watching.
    pub fn watched_directories(&self) -> Vec<PathBuf> {
        self.registry().directories()
    }

    /// Every currently matched file as an entry tagged `Modify`, together
    /// with the matcher that holds it.
    pub fn matched(&self) -> Result<Vec<FileChangeEntry>> {
        let mut out = Vec::new();
        for matcher in &self.matchers {
            for path in matcher.matched()? {
                out.push(FileChangeEntry::new(path, FileChangeType::Modify, Arc::clone(matcher)));
            }
        }
        Ok(out)
    }

    /// Absolute paths of all matched files; a file held by several matchers
    /// appears once per matcher.
    pub fn matched_files(&self) -> Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        for matcher in &self.matchers {
            let root = matcher.root_path_abs();
            out.extend(matcher.matched()?.into_iter().map(|p| root.join(p)));
        }
        Ok(out)
    }

    /// Unique absolute paths of all matched files.
    pub fn matched_files_unique(&self) -> Result<BTreeSet<PathBuf>> {
        Ok(self.matched_files()?.into_iter().collect())
    }

    fn registry(&self) -> MutexGuard<'_, WatchRegistry> {
        self.registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for FolderWatcher {
    fn drop(&mut self) {
        self.close();
    }
}
