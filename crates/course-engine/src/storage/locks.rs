//! Lazily created mutexes keyed by record identity, and lock files for
//! exclusion across processes.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::error::{CourseError, Result};

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(5);

/// One mutex per key, created on first use.
///
/// The guarded value is `()`: the lock only orders writers, so a poisoned
/// lock is recovered rather than propagated.
pub(crate) struct KeyedLocks<K> {
    locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub(crate) fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The mutex for `key`.
    pub(crate) fn handle(&self, key: &K) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(key.clone()).or_default())
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Acquire a handle's lock, ignoring poisoning.
pub(crate) fn acquire(handle: &Mutex<()>) -> MutexGuard<'_, ()> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Exclusive lock held by the existence of a file.
///
/// Created with `create_new`, so at most one holder exists across every
/// process sharing the directory. Removed on drop.
pub(crate) struct LockFile {
    path: PathBuf,
}

impl LockFile {
    /// Create `path`, retrying until `timeout` elapses while another
    /// holder has it.
    pub(crate) fn acquire(path: PathBuf, timeout: Duration) -> Result<Self> {
        let deadline = Instant::now() + timeout;
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        return Err(CourseError::StorageError(format!(
                            "timed out waiting for lock {} (remove it if no process holds it)",
                            path.display()
                        )));
                    }
                    std::thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(e) => return Err(CourseError::Io(e)),
            }
        }
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            log::warn!("failed to release lock {}: {e}", self.path.display());
        }
    }
}
