//! scl90-store: Key-Value Persistence for the SCL-90 engine
//!
//! This crate provides the persistence layer for the assessment engine.
//! Everything the engine keeps between runs (redemption codes, the admin
//! credential, in-progress answers) is a string value under a string key.
//!
//! ## Key Components
//!
//! - `KvStore`: get/set/remove plus `compare_and_swap` for single-writer updates
//! - `MemoryKvStore`: in-process map, used by tests and ephemeral runs
//! - `FsKvStore`: one file per key, atomic writes, lock-file arbitration
//! - `StoreConfig`: environment-driven location of the data directory

pub mod config;
mod error;
pub mod fakes;
pub mod fs_store;
pub mod storage_traits;

pub use config::StoreConfig;
pub use error::StorageError;
pub use fakes::MemoryKvStore;
pub use fs_store::FsKvStore;
pub use storage_traits::{keys, validate_key, ContentVersion, KvStore, StorageResult};
