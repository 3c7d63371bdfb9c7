// src/batch/collector.rs

use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::batch::pending::PendingBuffer;
use crate::types::FileChangeEntry;

/// The wait was cancelled through its [`CancellationToken`].
///
/// Only [`BatchCollector::poll`] surfaces this, so that a quiet window can
/// be told apart from a cancellation. It is a shutdown signal, not a
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("wait for changes was interrupted")]
pub struct Interrupted;

/// Consumer side of a [`PendingBuffer`].
///
/// Every blocking call takes the caller's cancellation token; cancelling it
/// makes the call return promptly without touching the buffer, so anything
/// already queued stays there for the next call. Dropping a pending future
/// has the same effect.
#[derive(Debug, Clone)]
pub struct BatchCollector {
    buffer: Arc<PendingBuffer>,
}

impl BatchCollector {
    pub fn new(buffer: Arc<PendingBuffer>) -> Self {
        Self { buffer }
    }

    pub fn buffer(&self) -> &Arc<PendingBuffer> {
        &self.buffer
    }

    /// Drain whatever is queued right now without waiting.
    pub fn drain_now(&self) -> Vec<FileChangeEntry> {
        self.buffer.drain()
    }

    /// Wait until at least one change is queued, then drain everything.
    ///
    /// Returns `None` if `cancel` fires first (or had already fired).
    pub async fn take(&self, cancel: &CancellationToken) -> Option<Vec<FileChangeEntry>> {
        loop {
            if cancel.is_cancelled() {
                return None;
            }

            let mut notified = pin!(self.buffer.notified());
            notified.as_mut().enable();

            let batch = self.buffer.drain();
            if !batch.is_empty() {
                return Some(batch);
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                _ = notified.as_mut() => {}
            }
        }
    }

    /// Wait up to `timeout` for changes.
    ///
    /// Returns as soon as something is queued. `Ok(None)` means the whole
    /// window passed with nothing queued.
    pub async fn poll(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<FileChangeEntry>>, Interrupted> {
        let deadline = Instant::now() + timeout;

        loop {
            if cancel.is_cancelled() {
                return Err(Interrupted);
            }

            let mut notified = pin!(self.buffer.notified());
            notified.as_mut().enable();

            let batch = self.buffer.drain();
            if !batch.is_empty() {
                return Ok(Some(batch));
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Interrupted),
                _ = notified.as_mut() => {}
                _ = sleep_until(deadline) => {
                    let batch = self.buffer.drain();
                    return Ok((!batch.is_empty()).then_some(batch));
                }
            }
        }
    }

    /// Debounced take.
    ///
    /// Blocks for the first change, then keeps merging further changes until
    /// a full `burst_delay` passes without any. Cancellation at any point
    /// discards the partial batch and returns `None`.
    pub async fn take_batch(
        &self,
        burst_delay: Duration,
        cancel: &CancellationToken,
    ) -> Option<Vec<FileChangeEntry>> {
        let mut batch = self.take(cancel).await?;
        trace!(first = batch.len(), "burst started");

        loop {
            match self.poll(burst_delay, cancel).await {
                Ok(Some(more)) => {
                    trace!(more = more.len(), total = batch.len() + more.len(), "burst extended");
                    batch.extend(more);
                }
                Ok(None) => {
                    debug!(entries = batch.len(), ?burst_delay, "burst settled");
                    return Some(batch);
                }
                Err(Interrupted) => {
                    debug!(discarded = batch.len(), "take_batch interrupted");
                    return None;
                }
            }
        }
    }
}
