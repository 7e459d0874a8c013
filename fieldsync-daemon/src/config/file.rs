//! TOML file configuration structures.
//!
//! These structs directly map to the `fieldsync.toml` file format.

use fieldsync_sdk::config::SeasonLayout;
use fieldsync_sdk::objects::{EventKey, PlayoffFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub events: Vec<EventConfig>,
    /// Replace or add ranking layouts by `(year, format)`.
    #[serde(default)]
    pub seasons: Vec<SeasonLayout>,
}

/// Daemon configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Directory holding one `<event>.json` feed snapshot per event.
    pub snapshot_dir: PathBuf,
    /// Directory the `<event>.jsonl` publication logs are appended to.
    pub output_dir: PathBuf,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

/// One event to keep in sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventConfig {
    pub key: EventKey,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Defaults to the year prefix of `key`.
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub playoff_format: PlayoffFormat,
}

fn default_poll_interval_secs() -> u64 {
    60
}

impl EventConfig {
    pub fn season(&self) -> Option<u16> {
        self.year.or_else(|| self.key.year())
    }
}
