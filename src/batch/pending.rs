// src/batch/pending.rs

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::Notify;
use tokio::sync::futures::Notified;
use tracing::warn;

use crate::types::FileChangeEntry;

/// Default bound on the number of undrained entries.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Queue of accepted changes shared by all dispatchers of a session and
/// drained by [`BatchCollector`](crate::batch::BatchCollector)s.
///
/// Every push happens under the queue lock and wakes *all* waiters before
/// the lock is released, so a waiter that checked the queue while holding
/// an enabled `Notified` can never miss data.
#[derive(Debug)]
pub struct PendingBuffer {
    queue: Mutex<VecDeque<FileChangeEntry>>,
    notify: Notify,
    capacity: usize,
}

impl Default for PendingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PendingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append entries, dropping (and logging) any that do not fit.
    ///
    /// Returns how many were queued.
    pub fn push_all<I>(&self, entries: I) -> usize
    where
        I: IntoIterator<Item = FileChangeEntry>,
    {
        let mut queue = self.lock();
        let mut pushed = 0;
        for entry in entries {
            if queue.len() >= self.capacity {
                warn!(
                    path = ?entry.path(),
                    matcher = %entry.matcher(),
                    capacity = self.capacity,
                    "pending buffer full; dropping change"
                );
                continue;
            }
            queue.push_back(entry);
            pushed += 1;
        }
        if pushed > 0 {
            self.notify.notify_waiters();
        }
        pushed
    }

    pub fn push(&self, entry: FileChangeEntry) -> bool {
        self.push_all(std::iter::once(entry)) == 1
    }

    /// Remove and return everything queued, in arrival order.
    pub fn drain(&self) -> Vec<FileChangeEntry> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Future resolving on the next push. Enable it before checking the
    /// queue to avoid lost wakeups.
    pub(crate) fn notified(&self) -> Notified<'_> {
        self.notify.notified()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<FileChangeEntry>> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
