use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::io::storage::DEFAULT_STORAGE_KEY;
use crate::ops::seed::StatusStrategy;
use crate::ops::store::UnknownIdPolicy;

/// Configuration from taskdesk.toml. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Key the task list is mirrored under (file `<key>.json`)
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            key: default_storage_key(),
        }
    }
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `ignore` or `report`
    #[serde(default)]
    pub unknown_id: UnknownIdPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Seed from this file when no mirror exists yet. Relative paths are
    /// resolved against the data directory.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Status for incomplete todo records
    #[serde(default)]
    pub status_strategy: StatusStrategy,
    /// Keep at most this many records
    #[serde(default)]
    pub limit: Option<usize>,
    /// Fall back to the built-in sample tasks when there is no seed file
    #[serde(default)]
    pub demo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive; TASKDESK_LOG overrides it
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
