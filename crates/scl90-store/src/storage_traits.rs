//! Storage trait definitions for the assessment engine
//!
//! The engine persists three kinds of state, all as opaque strings:
//! - the redemption code collection (`keys::CODES`)
//! - the administrator credential (`keys::ADMIN_PASSWORD`)
//! - the in-progress answer set and cursor (`keys::ANSWERS`, `keys::CURSOR`)
//!
//! The trait is synchronous and backend-agnostic. An in-memory fake is
//! provided via the `fakes` module, a directory-backed store via `fs_store`.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Well-known keys shared by the registry and the session engine.
pub mod keys {
    /// Serialized ordered sequence of redemption code records.
    pub const CODES: &str = "cdks";
    /// Administrator credential, stored in clear text.
    pub const ADMIN_PASSWORD: &str = "adminPassword";
    /// Serialized answer set of the in-progress session.
    pub const ANSWERS: &str = "scl90Answers";
    /// Cursor of the in-progress session.
    pub const CURSOR: &str = "scl90Cursor";
}

/// Check that `key` is non-empty and limited to `[A-Za-z0-9_-]`.
///
/// Every backend enforces the same key alphabet so that data written by the
/// in-memory store is always representable on disk.
pub fn validate_key(key: &str) -> StorageResult<()> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// ContentVersion
// ---------------------------------------------------------------------------

/// SHA-256 of a stored value, used to describe which version of a value a
/// reader based its update on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentVersion(String);

impl ContentVersion {
    /// Version of an optional value. Absent keys hash as the empty string.
    pub fn of(value: Option<&str>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(value.unwrap_or_default().as_bytes());
        ContentVersion(hex::encode(hasher.finalize()))
    }

    /// Return the full hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl std::fmt::Display for ContentVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// KvStore
// ---------------------------------------------------------------------------

/// String key-value store.
///
/// Guarantees:
/// - `get` after `set` on the same key returns the value just written.
/// - `remove` is a no-op for absent keys.
/// - `compare_and_swap` is exclusive with respect to every other
///   `compare_and_swap` on the same key and store location.
pub trait KvStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a value. No-op if absent.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Write `new` only if the current value equals `expected`
    /// (`None` meaning "key absent"). Returns whether the write happened.
    fn compare_and_swap(&self, key: &str, expected: Option<&str>, new: &str)
        -> StorageResult<bool>;
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> StorageResult<bool> {
        (**self).compare_and_swap(key, expected, new)
    }
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> StorageResult<bool> {
        (**self).compare_and_swap(key, expected, new)
    }
}

impl<T: KvStore + ?Sized> KvStore for Box<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> StorageResult<bool> {
        (**self).compare_and_swap(key, expected, new)
    }
}
