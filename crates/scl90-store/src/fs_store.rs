//! Directory-backed [`KvStore`].
//!
//! Each key is stored in its own file under the data directory. Writes go
//! through a temp file that is renamed over the target, so readers never see
//! a torn value. `compare_and_swap` holds an exclusive OS file lock on a
//! per-key lock file for its read-compare-write; the OS drops the lock when
//! the holder exits, so a crashed writer never leaves the key locked.

use std::fs::{self, File, OpenOptions, TryLockError};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::StorageError;
use crate::storage_traits::{validate_key, KvStore, StorageResult};

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Directory-backed key-value store, one file per key.
///
/// Layout: `<root>/<key>.val` for values, `<root>/<key>.lock` for the file
/// whose exclusive lock guards `compare_and_swap` on that key. Lock files are
/// left in place; only the OS lock on them matters.
pub struct FsKvStore {
    root: PathBuf,
    lock_wait: Duration,
}

impl FsKvStore {
    /// Create a new `FsKvStore` rooted at `root`. Creates the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        Self::from_config(&StoreConfig::new(root.as_ref()))
    }

    /// Create a store from a [`StoreConfig`].
    pub fn from_config(config: &StoreConfig) -> StorageResult<Self> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self {
            root: config.data_dir.clone(),
            lock_wait: config.lock_wait,
        })
    }

    /// Root directory holding the value files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.val"))
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.lock"))
    }

    fn read_value(&self, key: &str) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.value_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    // Atomic write: temp file in the same directory, then rename over the target.
    fn write_value(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.value_path(key)).map_err(|e| e.error)?;
        Ok(())
    }

    // Each call opens its own handle, so two handles in one process exclude
    // each other just like two processes do.
    fn acquire_lock(&self, key: &str) -> StorageResult<KeyLock> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path(key))?;
        let started = Instant::now();
        loop {
            match file.try_lock() {
                Ok(()) => return Ok(KeyLock { file }),
                Err(TryLockError::WouldBlock) => {
                    if started.elapsed() >= self.lock_wait {
                        return Err(StorageError::LockContended {
                            key: key.to_string(),
                        });
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(TryLockError::Error(e)) => return Err(StorageError::Io(e)),
            }
        }
    }
}

/// Held for the duration of a read-compare-write; unlocks on drop.
struct KeyLock {
    file: File,
}

impl Drop for KeyLock {
    fn drop(&mut self) {
        // Closing the handle releases the lock as well.
        if let Err(e) = self.file.unlock() {
            warn!(error = %e, "failed to release key lock");
        }
    }
}

impl KvStore for FsKvStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        self.read_value(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.write_value(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        match fs::remove_file(self.value_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> StorageResult<bool> {
        validate_key(key)?;
        let _lock = self.acquire_lock(key)?;
        let current = self.read_value(key)?;
        if current.as_deref() != expected {
            debug!(key = %key, "compare_and_swap lost: value changed since read");
            return Ok(false);
        }
        self.write_value(key, new)?;
        Ok(true)
    }
}
