// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`script_runner`] runs the user command for a batch with
//!   `tokio::process::Command`, optionally posting the changed paths on
//!   stdin.
//! - [`backend`] provides the `BatchSink` trait and the `ScriptSink` the
//!   runtime uses in production, and which tests replace with a fake.

pub mod backend;
pub mod script_runner;

pub use backend::{BatchSink, ScriptSink};
pub use script_runner::{ScriptOutcome, run_script, shell_command};
