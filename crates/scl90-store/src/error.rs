//! Error types for scl90-store

use thiserror::Error;

/// Errors that can occur in the key-value persistence layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem failure while reading or writing a value
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    /// Key contains characters the backend cannot represent
    #[error("invalid storage key: {key:?}")]
    InvalidKey { key: String },

    /// Another writer held the key lock for the whole wait window
    #[error("lock for key {key} is held by another writer")]
    LockContended { key: String },

    /// Backend-specific failure (poisoned lock, unsupported operation)
    #[error("storage backend failure: {0}")]
    Backend(String),
}
