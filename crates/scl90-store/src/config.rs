//! Store location and locking configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = ".scl90";

/// Default time a writer waits for a contended key lock.
pub const DEFAULT_LOCK_WAIT_MS: u64 = 2_000;

/// Configuration for the on-disk store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding one file per key
    pub data_dir: PathBuf,
    /// How long `compare_and_swap` waits for a held lock
    pub lock_wait: Duration,
}

impl StoreConfig {
    /// Create a configuration rooted at `data_dir` with the default lock wait
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            lock_wait: Duration::from_millis(DEFAULT_LOCK_WAIT_MS),
        }
    }

    /// Set the lock wait window
    pub fn with_lock_wait(mut self, wait: Duration) -> Self {
        self.lock_wait = wait;
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - SCL90_DATA_DIR (optional, default: ".scl90")
    /// - SCL90_LOCK_WAIT_MS (optional, default: 2000)
    pub fn from_env() -> Self {
        let data_dir =
            std::env::var("SCL90_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        let wait_ms = std::env::var("SCL90_LOCK_WAIT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_LOCK_WAIT_MS);

        Self::new(data_dir).with_lock_wait(Duration::from_millis(wait_ms))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}
