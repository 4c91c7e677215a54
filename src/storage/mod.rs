//! Byte storage used by the log store and the schedule evaluator
//!
//! Storage is a small, file-system-like key/value store: keys are relative
//! paths, values are opaque bytes. The components above it own all format
//! interpretation (segment naming, line format, JSON documents).
//!
//! # Implementations
//!
//! - [`FsStorage`] - Files under a root data directory
//! - [`MemoryStorage`] - Shared in-memory map for tests, with outage simulation

mod fs;
mod memory;

use std::io;
use std::path::Path;

use thiserror::Error;

pub use fs::FsStorage;
pub use memory::MemoryStorage;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The requested key does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The storage medium cannot be reached at all
    #[error("storage unavailable")]
    Unavailable,
}

/// A file-system-like byte store.
///
/// # Invariants
///
/// - `append` makes the written bytes durable before returning
/// - `write` replaces the whole value; readers see the old or the new bytes, never a mix
/// - `list` returns bare file names, not full keys
pub trait Storage: Send + Sync {
    /// Create `dir` (and any parents) if it does not exist.
    fn create_dir(&self, dir: &Path) -> StorageResult<()>;

    /// List the file names directly inside `dir`.
    fn list(&self, dir: &Path) -> StorageResult<Vec<String>>;

    /// Whether `key` exists.
    fn exists(&self, key: &Path) -> bool;

    /// Size of `key` in bytes.
    fn size(&self, key: &Path) -> StorageResult<u64>;

    /// Read the full value of `key`.
    fn read(&self, key: &Path) -> StorageResult<Vec<u8>>;

    /// Open `key` for appending, creating it when missing.
    ///
    /// Returns the current size, which is where the next append lands.
    fn open_append(&self, key: &Path) -> StorageResult<u64>;

    /// Append `data` to `key` and flush it to durable storage.
    fn append(&self, key: &Path, data: &[u8]) -> StorageResult<()>;

    /// Replace the value of `key` with `data`.
    fn write(&self, key: &Path, data: &[u8]) -> StorageResult<()>;

    /// Delete `key`.
    fn remove(&self, key: &Path) -> StorageResult<()>;
}
