// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{FolderWatchError, Result};
use crate::matcher::PathRules;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::FolderWatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.matcher))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_matchers(cfg)?;
    validate_global_config(cfg)?;
    validate_matchers(cfg)?;
    Ok(())
}

fn ensure_has_matchers(cfg: &RawConfigFile) -> Result<()> {
    if cfg.matcher.is_empty() {
        return Err(FolderWatchError::ConfigError(
            "config must contain at least one [[matcher]] table".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.burst_delay_ms == 0 {
        return Err(FolderWatchError::ConfigError(
            "[config].burst_delay_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.config.buffer_capacity == 0 {
        return Err(FolderWatchError::ConfigError(
            "[config].buffer_capacity must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_matchers(cfg: &RawConfigFile) -> Result<()> {
    for (idx, matcher) in cfg.matcher.iter().enumerate() {
        if matcher.root.as_os_str().is_empty() {
            return Err(FolderWatchError::ConfigError(format!(
                "matcher #{} has an empty `root`",
                idx + 1
            )));
        }
        // Compile once here so a bad rule aborts loading, not watching.
        PathRules::compile(&matcher.include, &matcher.exclude)?;
    }
    Ok(())
}
