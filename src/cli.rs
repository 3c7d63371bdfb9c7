// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `folderwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "folderwatch",
    version,
    about = "Watch a folder and run a command once per burst of file changes.",
    after_help = "Example patterns:\n  \
        *.txt          all .txt files in the root folder\n  \
        **.txt         all .txt files in all folders\n  \
        nice/*.txt     all .txt files in folder \"nice\"\n  \
        nice/**.txt    all .txt files in all subfolders of \"nice\"\n  \
        regex:.*/x\\.txt$  regex over the absolute path"
)]
pub struct CliArgs {
    /// Folder to watch. Ignored when `--config` is given.
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Command (or script) to run after each batch of changes.
    #[arg(value_name = "COMMAND")]
    pub command: Option<String>,

    /// Include pattern; may be repeated.
    #[arg(long = "include", value_name = "PATTERN")]
    pub include: Vec<String>,

    /// Exclude pattern; may be repeated.
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Milliseconds without changes before a batch is handed to COMMAND.
    ///
    /// Some programs emit several events for one write; this merges them.
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub burst_delay: Option<u64>,

    /// Write the changed paths (one per line) to the command's stdin.
    #[arg(long)]
    pub post_changes: bool,

    /// Only look at direct children of DIR.
    #[arg(long)]
    pub non_recursive: bool,

    /// Load matchers and settings from a TOML file instead of DIR/patterns.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the currently matched files and exit without watching.
    #[arg(long)]
    pub list: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FOLDERWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
