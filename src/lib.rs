// src/lib.rs

pub mod batch;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod matcher;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::batch::DEFAULT_CAPACITY;
use crate::cli::CliArgs;
use crate::config::{ConfigFile, config_root_dir, load_and_validate};
use crate::engine::Runtime;
use crate::exec::ScriptSink;
use crate::fs::RealFileSystem;
use crate::matcher::FileMatcherBuilder;
use crate::watch::FolderWatcher;

pub use crate::batch::{BatchCollector, PendingBuffer};
pub use crate::errors::FolderWatchError;
pub use crate::matcher::{FileMatcher, Rule};
pub use crate::types::{FileChangeEntry, FileChangeType};

/// Burst delay used when neither the CLI nor a config file sets one.
pub const DEFAULT_BURST_DELAY: Duration = Duration::from_millis(50);

/// Effective process settings after merging CLI flags over the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub command: Option<String>,
    pub burst_delay: Duration,
    pub post_changes: bool,
    pub buffer_capacity: usize,
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (or matcher construction from DIR + patterns)
/// - the watch session
/// - the batch runtime and script sink
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let (mut watcher, settings) = build_session(&args)?;

    if args.list {
        watcher.init(false)?;
        for path in watcher.matched_files_unique()? {
            println!("{}", path.display());
        }
        debug!("list complete (no watching)");
        return Ok(());
    }

    let Some(command) = settings.command.clone() else {
        bail!("no COMMAND given (pass it after DIR or set [config].command)");
    };

    watcher.init(true)?;
    for matcher in watcher.matchers() {
        info!(
            matcher = %matcher,
            root = %matcher.root_path_abs().display(),
            recursive = matcher.is_recursive(),
            matched = matcher.matched_count().ok(),
            "watching"
        );
    }

    // Ctrl-C → cancel the runtime.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            cancel.cancel();
        });
    }

    let sink = ScriptSink::new(command, settings.post_changes);
    let mut runtime = Runtime::new(watcher.collector(), sink, settings.burst_delay);
    runtime.run(cancel).await?;

    watcher.close();
    Ok(())
}

/// Build the (uninitialised) watch session and merged settings from the CLI.
///
/// With `--config`, matchers come from the file and DIR/patterns are
/// ignored; otherwise a single matcher is built from DIR and the
/// `--include`/`--exclude` flags.
pub fn build_session(args: &CliArgs) -> Result<(FolderWatcher, Settings)> {
    let cfg = match &args.config {
        Some(path) => Some((load_and_validate(path)?, config_root_dir(path))),
        None => None,
    };

    let settings = merge_settings(args, cfg.as_ref().map(|(c, _)| c));
    let mut watcher = FolderWatcher::with_options(Arc::new(RealFileSystem), settings.buffer_capacity);

    match &cfg {
        Some((cfg, base_dir)) => {
            for matcher in cfg.matchers() {
                watcher.add(matcher.to_builder(base_dir).build()?)?;
            }
        }
        None => {
            let Some(dir) = &args.dir else {
                bail!("no DIR given (pass a folder to watch or use --config)");
            };
            watcher.add(cli_matcher(dir.clone(), args).build()?)?;
        }
    }

    Ok((watcher, settings))
}

fn cli_matcher(dir: PathBuf, args: &CliArgs) -> FileMatcherBuilder {
    FileMatcherBuilder::new(dir)
        .recursive(!args.non_recursive)
        .includes(args.include.iter().cloned())
        .excludes(args.exclude.iter().cloned())
}

/// CLI values win over config values, which win over defaults.
pub fn merge_settings(args: &CliArgs, cfg: Option<&ConfigFile>) -> Settings {
    let section = cfg.map(|c| &c.config);

    let burst_delay = args
        .burst_delay
        .map(Duration::from_millis)
        .or_else(|| cfg.map(ConfigFile::burst_delay))
        .unwrap_or(DEFAULT_BURST_DELAY);

    Settings {
        command: args
            .command
            .clone()
            .or_else(|| section.and_then(|s| s.command.clone())),
        burst_delay,
        post_changes: args.post_changes || section.is_some_and(|s| s.post_changes),
        buffer_capacity: section.map_or(DEFAULT_CAPACITY, |s| s.buffer_capacity),
    }
}
