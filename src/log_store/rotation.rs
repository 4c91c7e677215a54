//! Segment enumeration and retention
//!
//! Provides functionality for:
//! - Listing segments by directory listing and numeric name parsing
//! - Evicting the oldest segment once the count exceeds the cap
//! - Removing every file in the log directory

use std::path::PathBuf;

use tracing::{info, warn};

use crate::storage::{Storage, StorageResult};

use super::config::{parse_segment_name, LogStoreConfig};

/// Information about a segment file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentInfo {
    /// Sequence number parsed from the file name
    pub sequence: u64,
    /// Storage key of the segment
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
}

/// List all segments, oldest first
pub fn list_segments<S: Storage + ?Sized>(
    storage: &S,
    config: &LogStoreConfig,
) -> StorageResult<Vec<SegmentInfo>> {
    let mut segments = Vec::new();

    for name in storage.list(config.log_dir())? {
        let Some(sequence) = parse_segment_name(&name) else {
            continue;
        };

        let path = config.log_dir().join(&name);
        let size = storage.size(&path)?;
        segments.push(SegmentInfo {
            sequence,
            path,
            size,
        });
    }

    segments.sort_by_key(|s| s.sequence);

    Ok(segments)
}

/// Highest sequence number present, if any segment exists
pub fn highest_sequence<S: Storage + ?Sized>(
    storage: &S,
    config: &LogStoreConfig,
) -> StorageResult<Option<u64>> {
    Ok(storage
        .list(config.log_dir())?
        .iter()
        .filter_map(|name| parse_segment_name(name))
        .max())
}

/// Evict the single oldest segment if more than `config.max_segments` exist.
///
/// Exactly one segment is removed per call even when the count is further
/// above the cap; rotation adds one segment at a time so one eviction keeps
/// the store bounded.
///
/// # Returns
/// * `Ok(Some(sequence))` - The evicted segment
/// * `Ok(None)` - Nothing to evict
pub fn evict_oldest<S: Storage + ?Sized>(
    storage: &S,
    config: &LogStoreConfig,
) -> StorageResult<Option<u64>> {
    let sequences: Vec<u64> = storage
        .list(config.log_dir())?
        .iter()
        .filter_map(|name| parse_segment_name(name))
        .collect();

    if sequences.len() <= config.max_segments {
        return Ok(None);
    }

    let Some(oldest) = sequences.iter().copied().min() else {
        return Ok(None);
    };

    storage.remove(&config.segment_path(oldest))?;
    info!(sequence = oldest, count = sequences.len(), "evicted oldest log segment");

    Ok(Some(oldest))
}

/// Remove every file in the log directory, segment or not.
///
/// Keeps going past individual failures and returns how many files were
/// removed.
pub fn remove_all<S: Storage + ?Sized>(
    storage: &S,
    config: &LogStoreConfig,
) -> StorageResult<usize> {
    let mut removed = 0;

    for name in storage.list(config.log_dir())? {
        let path = config.log_dir().join(&name);
        match storage.remove(&path) {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove log file"),
        }
    }

    Ok(removed)
}
