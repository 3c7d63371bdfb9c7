use std::collections::BTreeSet;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use folderwatch::errors::{FolderWatchError, Result};
use folderwatch::exec::BatchSink;
use tokio_util::sync::CancellationToken;

/// A fake sink that:
/// - records every delivered batch
/// - optionally fails each delivery
/// - optionally cancels a token once a given number of batches arrived,
///   which lets a test stop the runtime deterministically.
#[derive(Clone, Default)]
pub struct RecordingSink {
    delivered: Arc<Mutex<Vec<BTreeSet<PathBuf>>>>,
    fail: bool,
    stop_after: Option<(usize, CancellationToken)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn stop_after(mut self, batches: usize, cancel: CancellationToken) -> Self {
        self.stop_after = Some((batches, cancel));
        self
    }

    /// Snapshot of the batches delivered so far.
    pub fn batches(&self) -> Vec<BTreeSet<PathBuf>> {
        self.delivered.lock().unwrap().clone()
    }
}

impl BatchSink for RecordingSink {
    fn deliver(
        &mut self,
        changed: BTreeSet<PathBuf>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let delivered = Arc::clone(&self.delivered);
        let fail = self.fail;
        let stop_after = self.stop_after.clone();

        Box::pin(async move {
            let count = {
                let mut guard = delivered.lock().unwrap();
                guard.push(changed);
                guard.len()
            };

            if let Some((limit, cancel)) = stop_after {
                if count >= limit {
                    cancel.cancel();
                }
            }

            if fail {
                return Err(FolderWatchError::ConfigError("fake sink failure".to_string()));
            }
            Ok(())
        })
    }
}
