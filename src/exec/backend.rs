// src/exec/backend.rs

//! Pluggable batch sink abstraction.
//!
//! The runtime hands each settled batch to a `BatchSink` instead of running
//! processes itself, so tests can swap in a recording fake.

use std::collections::BTreeSet;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::errors::Result;

use super::script_runner::run_script;

/// Receiver of settled batches.
///
/// Production code uses [`ScriptSink`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait BatchSink: Send {
    /// Handle one batch of unique, absolute changed paths.
    fn deliver(
        &mut self,
        changed: BTreeSet<PathBuf>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Runs a shell command once per batch.
///
/// A command exiting non-zero is logged and does not stop watching; only a
/// failure to start it is reported back.
#[derive(Debug, Clone)]
pub struct ScriptSink {
    command: String,
    post_changes: bool,
}

impl ScriptSink {
    pub fn new(command: impl Into<String>, post_changes: bool) -> Self {
        Self {
            command: command.into(),
            post_changes,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn posts_changes(&self) -> bool {
        self.post_changes
    }
}

impl BatchSink for ScriptSink {
    fn deliver(
        &mut self,
        changed: BTreeSet<PathBuf>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            run_script(&self.command, &changed, self.post_changes).await?;
            Ok(())
        })
    }
}
