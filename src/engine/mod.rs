// src/engine/mod.rs

//! Batch-to-command loop for the `folderwatch` binary.
//!
//! The watch session fills the pending buffer; [`Runtime`] waits for each
//! burst to settle and passes the unique changed paths to a sink.

pub mod runtime;

pub use runtime::Runtime;

/// Counters reported when the runtime stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Batches handed to the sink.
    pub batches: usize,
    /// Unique paths across all batches.
    pub files: usize,
    /// Batches the sink reported an error for.
    pub failures: usize,
}
