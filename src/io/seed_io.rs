use std::fs;
use std::path::{Path, PathBuf};

use crate::ops::seed::SeedRecord;

/// Error type for reading seed sources
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("could not read seed file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("seed file {path} is not a JSON array of task or todo records: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read a JSON array of seed records (full tasks or todo records)
pub fn read_seed_file(path: &Path) -> Result<Vec<SeedRecord>, SeedError> {
    let text = fs::read_to_string(path).map_err(|e| SeedError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_seed(&text).map_err(|e| SeedError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn parse_seed(text: &str) -> Result<Vec<SeedRecord>, serde_json::Error> {
    serde_json::from_str(text)
}
