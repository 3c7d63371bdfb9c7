// src/exec/script_runner.rs

//! Runs the user command for one batch.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::batch::post_body;

/// How a batch command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    Success,
    Failed(i32),
}

impl ScriptOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, ScriptOutcome::Success)
    }
}

/// Build a shell command appropriate for the platform.
pub fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    }
}

/// Run `command` through the shell and wait for it.
///
/// The child's stdout and stderr go straight to ours. With `post_changes`
/// the changed paths are written to its stdin, one per line; a child that
/// closes stdin early is not an error.
pub async fn run_script(
    command: &str,
    changed: &BTreeSet<PathBuf>,
    post_changes: bool,
) -> Result<ScriptOutcome> {
    info!(cmd = %command, files = changed.len(), "starting batch command");

    let mut cmd = shell_command(command);
    cmd.stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .stdin(if post_changes { Stdio::piped() } else { Stdio::null() })
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning batch command '{command}'"))?;

    if let Some(mut stdin) = child.stdin.take() {
        let body = post_body(changed.iter());
        if let Err(err) = stdin.write_all(body.as_bytes()).await {
            debug!(error = %err, "batch command closed stdin early");
        }
        // Dropping stdin sends EOF.
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for batch command '{command}'"))?;

    let code = status.code().unwrap_or(-1);
    let outcome = if status.success() {
        ScriptOutcome::Success
    } else {
        ScriptOutcome::Failed(code)
    };

    if outcome.is_success() {
        info!(exit_code = code, "batch command exited");
    } else {
        warn!(exit_code = code, cmd = %command, "batch command failed");
    }

    Ok(outcome)
}
