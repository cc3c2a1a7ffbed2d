use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// Name of the lock file inside the data directory
pub const LOCK_FILE: &str = ".lock";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const FIRST_BACKOFF: Duration = Duration::from_millis(2);
const MAX_BACKOFF: Duration = Duration::from_millis(50);

/// Exclusive advisory lock on a data directory, held for the length of a
/// `td` command that opens the store.
///
/// The lock lives on the open handle, so dropping the guard releases it.
/// The `.lock` file itself is never removed: a waiter may already hold a
/// handle to it, and unlinking would let a later process lock a fresh file
/// while that waiter locks the old one.
#[derive(Debug)]
pub struct FileLock {
    _handle: File,
    path: PathBuf,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("could not lock {path}: {source}")]
    Flock { path: PathBuf, source: io::Error },
    #[error("gave up waiting for {path}: another td process is writing")]
    Timeout { path: PathBuf },
}

impl FileLock {
    /// Lock `data_dir` (created if missing), waiting up to `timeout` with
    /// exponential backoff.
    pub fn acquire(data_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = data_dir.join(LOCK_FILE);
        let handle = open_lock_file(data_dir, &path)
            .map_err(|source| LockError::Open { path: path.clone(), source })?;

        let deadline = Instant::now() + timeout;
        let mut backoff = FIRST_BACKOFF;
        loop {
            let locked = flock_exclusive(&handle)
                .map_err(|source| LockError::Flock { path: path.clone(), source })?;
            if locked {
                tracing::debug!(path = %path.display(), "data dir locked");
                return Ok(FileLock { _handle: handle, path });
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(LockError::Timeout { path });
            }
            thread::sleep(backoff.min(deadline - now));
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    pub fn acquire_default(data_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(data_dir, DEFAULT_TIMEOUT)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn open_lock_file(data_dir: &Path, path: &Path) -> io::Result<File> {
    fs::create_dir_all(data_dir)?;
    OpenOptions::new().create(true).append(true).open(path)
}

/// Non-blocking exclusive flock. `Ok(false)` means someone else holds it.
#[cfg(unix)]
fn flock_exclusive(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;

    if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) } == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(false),
        _ => Err(err),
    }
}

// No advisory locking off Unix
#[cfg(not(unix))]
fn flock_exclusive(_file: &File) -> io::Result<bool> {
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_missing_data_dir_and_keeps_lock_file() {
        let tmp = TempDir::new().unwrap();
        let data_dir = tmp.path().join("nested").join(".taskdesk");
        let lock = FileLock::acquire_default(&data_dir).unwrap();
        assert_eq!(lock.path(), data_dir.join(LOCK_FILE));
        drop(lock);

        assert!(data_dir.join(LOCK_FILE).exists());
        assert!(FileLock::acquire_default(&data_dir).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn second_writer_times_out() {
        let tmp = TempDir::new().unwrap();
        let _held = FileLock::acquire_default(tmp.path()).unwrap();
        let err = FileLock::acquire(tmp.path(), Duration::from_millis(50)).unwrap_err();
        assert!(matches!(err, LockError::Timeout { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn waiter_that_takes_over_still_excludes_newcomers() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(LOCK_FILE);
        let first = FileLock::acquire_default(tmp.path()).unwrap();

        // A waiter opened the lock file while `first` held it
        let waiter = open_lock_file(tmp.path(), &path).unwrap();
        assert!(!flock_exclusive(&waiter).unwrap());

        drop(first);
        assert!(flock_exclusive(&waiter).unwrap());

        let err = FileLock::acquire(tmp.path(), Duration::from_millis(50)).unwrap_err();
        assert!(matches!(err, LockError::Timeout { .. }));

        drop(waiter);
        assert!(FileLock::acquire(tmp.path(), Duration::from_millis(50)).is_ok());
    }
}
