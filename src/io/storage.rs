use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::NamedTempFile;

/// Default key the task list is mirrored under
pub const DEFAULT_STORAGE_KEY: &str = "tasks";

/// Error type for persistence operations
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
    #[error("could not encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable key-value sink that mirrors the task store.
///
/// The store hands it the full serialized task list on every change.
pub trait PersistenceSink {
    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistError>;

    /// Read back a previously written value, `None` if the key was never written
    fn read(&self, key: &str) -> Result<Option<String>, PersistError>;
}

// ---------------------------------------------------------------------------
// File sink
// ---------------------------------------------------------------------------

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileSink { dir: dir.into() }
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf, PersistError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(PersistError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl PersistenceSink for JsonFileSink {
    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| PersistError::WriteError {
            path: self.dir.clone(),
            source: e,
        })?;
        atomic_write(&path, value.as_bytes()).map_err(|e| PersistError::WriteError { path, source: e })
    }

    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistError::ReadError { path, source: e }),
        }
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory sinks
// ---------------------------------------------------------------------------

/// Keeps written values in memory. Clones share the same map, so a test can
/// hold one handle while the store owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Rc<RefCell<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    values: HashMap<String, String>,
    writes: usize,
    fail_with: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.inner.borrow().writes
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.borrow().values.get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.inner
            .borrow_mut()
            .values
            .insert(key.to_string(), value.to_string());
    }

    /// Make every subsequent write fail with `reason` (`None` to recover)
    pub fn set_failure(&self, reason: Option<&str>) {
        self.inner.borrow_mut().fail_with = reason.map(str::to_string);
    }
}

impl PersistenceSink for MemorySink {
    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut state = self.inner.borrow_mut();
        if let Some(reason) = &state.fail_with {
            return Err(PersistError::Unavailable(reason.clone()));
        }
        state.values.insert(key.to_string(), value.to_string());
        state.writes += 1;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.get(key))
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PersistenceSink for NullSink {
    fn write(&mut self, _key: &str, _value: &str) -> Result<(), PersistError> {
        Ok(())
    }

    fn read(&self, _key: &str) -> Result<Option<String>, PersistError> {
        Ok(None)
    }
}
