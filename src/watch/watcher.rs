// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::matcher::FileMatcher;
use crate::watch::dispatcher::EventDispatcher;
use crate::watch::native::translate;

/// One native subscription: a `notify` watcher on a matcher's root plus the
/// task that feeds its events to the dispatcher.
///
/// Dropping the handle stops watching: the watcher closes the event channel
/// and the task winds down.
pub struct Subscription {
    matcher: Arc<FileMatcher>,
    watcher: Option<RecommendedWatcher>,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("root", &self.matcher.root_path_abs())
            .field("active", &self.watcher.is_some())
            .finish()
    }
}

impl Subscription {
    pub fn matcher(&self) -> &Arc<FileMatcher> {
        &self.matcher
    }

    pub fn is_active(&self) -> bool {
        self.watcher.is_some()
    }

    /// Release the native watch and stop the worker task.
    pub fn close(&mut self) {
        if self.watcher.take().is_some() {
            info!(root = ?self.matcher.root_path_abs(), "file watcher stopped");
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

/// Start watching `matcher`'s root and route its events through
/// `dispatcher`, restricted to this matcher.
///
/// Must be called from within a Tokio runtime. Failing to open the native
/// watch is returned to the caller, never retried.
pub fn subscribe(matcher: Arc<FileMatcher>, dispatcher: EventDispatcher) -> Result<Subscription> {
    let root: PathBuf = matcher.root_path_abs().to_path_buf();

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            // Receiver gone means the subscription is shutting down.
            let _ = event_tx.send(res);
        },
        Config::default(),
    )?;

    let mode = if matcher.is_recursive() {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher.watch(&root, mode)?;

    info!(root = ?root, recursive = matcher.is_recursive(), matcher = %matcher, "file watcher started");

    let task_matcher = Arc::clone(&matcher);
    let task = tokio::spawn(async move {
        while let Some(res) = event_rx.recv().await {
            match res {
                Ok(event) => {
                    debug!(?event, "received notify event");
                    for note in translate(&root, &event) {
                        dispatcher.dispatch_for(&note, &task_matcher);
                    }
                }
                Err(err) => {
                    warn!(root = ?root, error = %err, "file watch error");
                }
            }
        }
        debug!(root = ?root, "watcher event loop finished");
    });

    Ok(Subscription {
        matcher,
        watcher: Some(watcher),
        task: Some(task),
    })
}
