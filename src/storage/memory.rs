//! In-memory storage for testing.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Storage, StorageError, StorageResult};

#[derive(Debug, Default)]
struct Inner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    unavailable: bool,
}

/// An in-memory storage.
///
/// Clones share the same contents, so a test can hand one clone to a
/// component and keep another to inspect or corrupt what was written.
///
/// ```rust
/// use std::path::Path;
/// use tracker_core::storage::{MemoryStorage, Storage};
///
/// let storage = MemoryStorage::new();
/// storage.append(Path::new("logs/1000.log"), b"hello\n").unwrap();
/// assert_eq!(storage.size(Path::new("logs/1000.log")).unwrap(), 6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStorage {
    /// Create an empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the medium going away (`false`) or coming back (`true`).
    ///
    /// While unavailable every operation fails with [`StorageError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.inner.write().unavailable = !available;
    }

    /// Put raw bytes under `key`, bypassing the availability switch.
    pub fn insert(&self, key: impl AsRef<Path>, data: impl Into<Vec<u8>>) {
        let key = key.as_ref().to_path_buf();
        let mut inner = self.inner.write();
        if let Some(parent) = key.parent() {
            inner.dirs.insert(parent.to_path_buf());
        }
        inner.files.insert(key, data.into());
    }

    /// Contents of `key` as text, if present.
    pub fn contents(&self, key: impl AsRef<Path>) -> Option<String> {
        self.inner
            .read()
            .files
            .get(key.as_ref())
            .map(|data| String::from_utf8_lossy(data).to_string())
    }

    /// All keys currently stored, in sorted order.
    pub fn keys(&self) -> Vec<PathBuf> {
        self.inner.read().files.keys().cloned().collect()
    }

    fn check(&self) -> StorageResult<()> {
        if self.inner.read().unavailable {
            Err(StorageError::Unavailable)
        } else {
            Ok(())
        }
    }
}

fn not_found(key: &Path) -> StorageError {
    StorageError::NotFound(key.display().to_string())
}

impl Storage for MemoryStorage {
    fn create_dir(&self, dir: &Path) -> StorageResult<()> {
        self.check()?;
        self.inner.write().dirs.insert(dir.to_path_buf());
        Ok(())
    }

    fn list(&self, dir: &Path) -> StorageResult<Vec<String>> {
        self.check()?;
        let inner = self.inner.read();

        if !inner.dirs.contains(dir) {
            return Err(not_found(dir));
        }

        Ok(inner
            .files
            .keys()
            .filter(|key| key.parent() == Some(dir))
            .filter_map(|key| key.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .collect())
    }

    fn exists(&self, key: &Path) -> bool {
        let inner = self.inner.read();
        !inner.unavailable && (inner.files.contains_key(key) || inner.dirs.contains(key))
    }

    fn size(&self, key: &Path) -> StorageResult<u64> {
        self.check()?;
        self.inner
            .read()
            .files
            .get(key)
            .map(|data| data.len() as u64)
            .ok_or_else(|| not_found(key))
    }

    fn read(&self, key: &Path) -> StorageResult<Vec<u8>> {
        self.check()?;
        self.inner
            .read()
            .files
            .get(key)
            .cloned()
            .ok_or_else(|| not_found(key))
    }

    fn open_append(&self, key: &Path) -> StorageResult<u64> {
        self.check()?;
        let mut inner = self.inner.write();
        if let Some(parent) = key.parent() {
            inner.dirs.insert(parent.to_path_buf());
        }
        Ok(inner.files.entry(key.to_path_buf()).or_default().len() as u64)
    }

    fn append(&self, key: &Path, data: &[u8]) -> StorageResult<()> {
        self.check()?;
        self.inner
            .write()
            .files
            .entry(key.to_path_buf())
            .or_default()
            .extend_from_slice(data);
        Ok(())
    }

    fn write(&self, key: &Path, data: &[u8]) -> StorageResult<()> {
        self.check()?;
        self.inner.write().files.insert(key.to_path_buf(), data.to_vec());
        Ok(())
    }

    fn remove(&self, key: &Path) -> StorageResult<()> {
        self.check()?;
        self.inner
            .write()
            .files
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| not_found(key))
    }
}
