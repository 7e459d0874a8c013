//! Configuration module for fieldsync-daemon.
//!
//! Handles loading configuration from the TOML file and CLI overrides,
//! and validating the result before anything is spawned.

pub mod file;

use crate::config::file::{EventConfig, FileConfig};
use fieldsync_sdk::config::SeasonLayout;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub snapshot_dir: PathBuf,
    pub output_dir: PathBuf,
    pub fetch_timeout: Duration,
    pub events: Vec<EventConfig>,
    pub seasons: Vec<SeasonLayout>,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    snapshot_dir_override: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, snapshot_dir_override: Option<PathBuf>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            snapshot_dir_override,
        }
    }

    /// Read the TOML file, apply CLI overrides, and validate.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(dir) = &self.snapshot_dir_override {
            file_config.daemon.snapshot_dir = dir.clone();
        }

        validate(&file_config)?;
        Ok(LoadedConfig {
            snapshot_dir: file_config.daemon.snapshot_dir,
            output_dir: file_config.daemon.output_dir,
            fetch_timeout: Duration::from_secs(file_config.daemon.fetch_timeout_secs),
            events: file_config.events,
            seasons: file_config.seasons,
        })
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.daemon.fetch_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "fetch_timeout_secs must be positive".to_owned(),
        ));
    }

    let mut seen = BTreeSet::new();
    for event in &config.events {
        if !seen.insert(&event.key) {
            return Err(ConfigError::ValidationError(format!(
                "event {} is configured more than once",
                event.key
            )));
        }
        if event.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationError(format!(
                "event {} has a zero poll interval",
                event.key
            )));
        }
        if event.season().is_none() {
            return Err(ConfigError::ValidationError(format!(
                "event {} has no year prefix; set `year` explicitly",
                event.key
            )));
        }
    }

    let mut layouts = BTreeSet::new();
    for layout in &config.seasons {
        if !layouts.insert((layout.year, layout.format)) {
            return Err(ConfigError::ValidationError(format!(
                "season {} ({:?}) is overridden more than once",
                layout.year, layout.format
            )));
        }
    }
    Ok(())
}
