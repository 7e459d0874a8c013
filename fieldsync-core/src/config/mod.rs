//! Runtime configuration shared between the engine and its host.
//!
//! Loading and parsing configuration files is the daemon's job; this module
//! only holds the validated shapes and the snapshot store they live in.

mod config_store;

pub use config_store::{ConfigStore, ConfigWatcher};
