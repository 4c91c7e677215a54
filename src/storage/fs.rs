//! File-backed storage
//!
//! Every key is a path relative to a root data directory.
//!
//! Whole-value writes follow the atomic pattern:
//!
//! 1. Write to a temporary file (.tmp)
//! 2. Call sync_all() to flush to disk
//! 3. Rename temp file to final path (atomic on most filesystems)
//!
//! so a configuration document is either the old version or the new one,
//! never a partial file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{Storage, StorageError, StorageResult};

/// Storage rooted at a directory on the local file system
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Create storage rooted at `root`. The directory is created lazily.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &Path) -> PathBuf {
        self.root.join(key)
    }
}

fn not_found_or_io(key: &Path, e: io::Error) -> StorageError {
    if e.kind() == io::ErrorKind::NotFound {
        StorageError::NotFound(key.display().to_string())
    } else {
        StorageError::Io(e)
    }
}

impl Storage for FsStorage {
    fn create_dir(&self, dir: &Path) -> StorageResult<()> {
        fs::create_dir_all(self.resolve(dir))?;
        Ok(())
    }

    fn list(&self, dir: &Path) -> StorageResult<Vec<String>> {
        let path = self.resolve(dir);
        let entries = fs::read_dir(&path).map_err(|e| not_found_or_io(dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(names)
    }

    fn exists(&self, key: &Path) -> bool {
        self.resolve(key).exists()
    }

    fn size(&self, key: &Path) -> StorageResult<u64> {
        let metadata = fs::metadata(self.resolve(key)).map_err(|e| not_found_or_io(key, e))?;
        Ok(metadata.len())
    }

    fn read(&self, key: &Path) -> StorageResult<Vec<u8>> {
        fs::read(self.resolve(key)).map_err(|e| not_found_or_io(key, e))
    }

    fn open_append(&self, key: &Path) -> StorageResult<u64> {
        let path = self.resolve(key);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(file.metadata()?.len())
    }

    fn append(&self, key: &Path, data: &[u8]) -> StorageResult<()> {
        let path = self.resolve(key);

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(data)?;

        // Sync to disk for durability
        file.sync_all()?;

        Ok(())
    }

    fn write(&self, key: &Path, data: &[u8]) -> StorageResult<()> {
        let path = self.resolve(key);
        let temp_path = path.with_extension("tmp");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;

        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    fn remove(&self, key: &Path) -> StorageResult<()> {
        fs::remove_file(self.resolve(key)).map_err(|e| not_found_or_io(key, e))
    }
}
