use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

pub const CONFIG_FILE: &str = "taskdesk.toml";

/// Error type for config reads
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Read `<data_dir>/taskdesk.toml`. A missing file yields the defaults.
pub fn read_config(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    let config_path = data_dir.join(CONFIG_FILE);
    let config_text = match fs::read_to_string(&config_path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: config_path,
                source: e,
            });
        }
    };
    toml::from_str(&config_text).map_err(|e| ConfigError::ParseError {
        path: config_path,
        source: e,
    })
}

/// Resolve the configured seed file against the data directory
pub fn seed_file_path(data_dir: &Path, config: &AppConfig) -> Option<PathBuf> {
    config.seed.file.as_ref().map(|file| {
        if file.is_absolute() {
            file.clone()
        } else {
            data_dir.join(file)
        }
    })
}
