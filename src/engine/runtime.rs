// src/engine/runtime.rs

use std::fmt;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::batch::{BatchCollector, unique_paths};
use crate::errors::Result;
use crate::exec::BatchSink;

use super::RunSummary;

/// Pulls settled batches from a [`BatchCollector`] and hands each one to a
/// [`BatchSink`], until the cancellation token fires.
pub struct Runtime<S: BatchSink> {
    collector: BatchCollector,
    sink: S,
    burst_delay: Duration,
}

impl<S: BatchSink> fmt::Debug for Runtime<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("collector", &self.collector)
            .field("burst_delay", &self.burst_delay)
            .finish_non_exhaustive()
    }
}

impl<S: BatchSink> Runtime<S> {
    pub fn new(collector: BatchCollector, sink: S, burst_delay: Duration) -> Self {
        Self {
            collector,
            sink,
            burst_delay,
        }
    }

    /// Main loop.
    ///
    /// A sink error is logged and the loop keeps going; only cancellation
    /// ends it. A batch still settling at that point is dropped.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<RunSummary> {
        info!(burst_delay = ?self.burst_delay, "folderwatch runtime started");
        let mut summary = RunSummary::default();

        loop {
            let Some(batch) = self.collector.take_batch(self.burst_delay, &cancel).await else {
                info!("runtime interrupted; exiting");
                break;
            };

            let changed = unique_paths(&batch);
            debug!(entries = batch.len(), unique = changed.len(), "batch settled");
            info!("{} files changed", changed.len());

            summary.batches += 1;
            summary.files += changed.len();

            if let Err(err) = self.sink.deliver(changed).await {
                summary.failures += 1;
                warn!(error = %err, "failed to deliver batch");
            }
        }

        info!(
            batches = summary.batches,
            files = summary.files,
            failures = summary.failures,
            "runtime exiting"
        );
        Ok(summary)
    }

    /// Give the sink back, e.g. to inspect a fake after a test run.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
