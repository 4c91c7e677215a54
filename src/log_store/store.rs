//! Log Store - segmented append-only text log
//!
//! The LogStore owns the current segment and rotates it by size. Sealed
//! segments are never written again; they only disappear through retention
//! eviction or [`LogStore::clear_all`].

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::storage::{Storage, StorageError};

use super::config::LogStoreConfig;
use super::entry::{tail_lines, LogEntry, LogLevel};
use super::rotation::{self, SegmentInfo};
use super::stats::LogStoreStats;

/// Returned by [`LogStore::read_all`] when no segment can be read
pub const NO_LOG_AVAILABLE: &str = "No log file available";

/// Substitute text for hosts that have no log store at all
pub const LOG_MANAGER_UNAVAILABLE: &str = "Log manager not available";

/// Result type for LogStore operations
pub type LogStoreResult<T> = Result<T, LogStoreError>;

/// Errors that can occur in LogStore operations
#[derive(Debug, Error)]
pub enum LogStoreError {
    /// The underlying storage failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// What a successful append did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The line was written; the segment stays current
    Written {
        /// Encoded length of the line
        bytes: u64,
    },
    /// The line was written and the segment was sealed
    Rotated {
        /// Segment that received the line and was sealed
        sealed: u64,
        /// Newly opened segment, if opening it succeeded
        current: Option<u64>,
        /// Segment removed by retention, if any
        evicted: Option<u64>,
    },
}

/// The LogStore manages the segment files of the event log
pub struct LogStore<S, C> {
    storage: S,
    clock: C,
    config: LogStoreConfig,
    /// Sequence number of the current (or next) segment
    sequence: u64,
    /// Bytes accumulated in the current segment
    current_size: u64,
    /// Whether the current segment is open for append
    open: bool,
    /// Whether `sequence` reflects a successful scan of the log directory
    scanned: bool,
}

impl<S: Storage, C: Clock> LogStore<S, C> {
    /// Create a store in the "no current segment" state.
    ///
    /// Nothing touches storage until [`initialize`](Self::initialize) or the
    /// first write.
    pub fn new(storage: S, clock: C, config: LogStoreConfig) -> Self {
        let sequence = config.base_sequence;
        Self {
            storage,
            clock,
            config,
            sequence,
            current_size: 0,
            open: false,
            scanned: false,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &LogStoreConfig {
        &self.config
    }

    /// Sequence number of the current segment, if one is open
    pub fn current_sequence(&self) -> Option<u64> {
        self.open.then_some(self.sequence)
    }

    /// Bytes written to the current segment so far
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Prepare the log directory and open the current segment.
    ///
    /// The next sequence number is one past the highest segment on storage
    /// (or the base value), so a restart never appends to an older segment.
    /// On failure the store stays usable: it is left without a current
    /// segment and the next write retries the open.
    pub fn initialize(&mut self) -> LogStoreResult<()> {
        self.open = false;
        self.scanned = false;

        self.scan()?;
        self.open_current()
    }

    /// Create the log directory and pick the next sequence number from what
    /// is already on storage.
    fn scan(&mut self) -> LogStoreResult<()> {
        let prepared = self.storage.create_dir(self.config.log_dir()).and_then(|()| {
            rotation::highest_sequence(&self.storage, &self.config)
        });

        match prepared {
            Ok(highest) => {
                self.sequence = match highest {
                    Some(highest) => self.config.base_sequence.max(highest.saturating_add(1)),
                    None => self.config.base_sequence,
                };
                self.current_size = 0;
                self.scanned = true;
                debug!(sequence = self.sequence, "scanned log directory");
                Ok(())
            }
            Err(e) => {
                self.scanned = false;
                warn!(error = %e, "log directory unavailable");
                Err(e.into())
            }
        }
    }

    /// Reopen the current segment, rescanning first if the last scan failed.
    fn reopen(&mut self) -> LogStoreResult<()> {
        if !self.scanned {
            self.scan()?;
        }
        self.open_current()
    }

    /// Append a line, degrading to a no-op if storage is unavailable.
    pub fn append(&mut self, level: LogLevel, message: &str) {
        if let Err(e) = self.try_append(level, message) {
            warn!(error = %e, level = %level, "dropped log entry");
        }
    }

    /// Append an INFO line
    pub fn log_info(&mut self, message: &str) {
        self.append(LogLevel::Info, message);
    }

    /// Append an ERROR line
    pub fn log_error(&mut self, message: &str) {
        self.append(LogLevel::Error, message);
    }

    /// Append a line and report what happened.
    ///
    /// Opens a segment on demand. After a successful write, reaching the
    /// size threshold seals the segment and opens the next one before this
    /// returns.
    pub fn try_append(&mut self, level: LogLevel, message: &str) -> LogStoreResult<AppendOutcome> {
        if !self.open {
            self.reopen()?;
        }

        let line = LogEntry::new(self.clock.now(), level, message).to_line();
        let path = self.config.segment_path(self.sequence);

        if let Err(e) = self.storage.append(&path, line.as_bytes()) {
            self.open = false;
            return Err(e.into());
        }

        let bytes = line.len() as u64;
        self.current_size += bytes;

        if self.current_size >= self.config.max_segment_bytes {
            return Ok(self.rotate());
        }

        Ok(AppendOutcome::Written { bytes })
    }

    /// Seal the current segment and open the next one.
    fn rotate(&mut self) -> AppendOutcome {
        let sealed = self.sequence;
        info!(sequence = sealed, bytes = self.current_size, "rotating log segment");

        self.open = false;
        self.sequence = self.sequence.saturating_add(1);
        self.current_size = 0;

        if let Err(e) = self.open_current() {
            warn!(error = %e, sequence = self.sequence, "failed to open log segment after rotation");
        }

        let evicted = match rotation::evict_oldest(&self.storage, &self.config) {
            Ok(evicted) => evicted,
            Err(e) => {
                warn!(error = %e, "log retention failed");
                None
            }
        };

        AppendOutcome::Rotated {
            sealed,
            current: self.current_sequence(),
            evicted,
        }
    }

    /// Open (or create) the segment named by the current sequence number.
    fn open_current(&mut self) -> LogStoreResult<()> {
        let path = self.config.segment_path(self.sequence);

        match self.storage.open_append(&path) {
            Ok(size) => {
                self.current_size = size;
                self.open = true;
                info!(path = %path.display(), size, "opened log segment");
                Ok(())
            }
            Err(e) => {
                self.open = false;
                warn!(path = %path.display(), error = %e, "failed to open log file");
                Err(e.into())
            }
        }
    }

    /// Full text of the current segment, or [`NO_LOG_AVAILABLE`].
    pub fn read_all(&mut self) -> String {
        match self.try_read_all() {
            Ok(content) => content,
            Err(e) => {
                debug!(error = %e, "log read degraded");
                NO_LOG_AVAILABLE.to_string()
            }
        }
    }

    /// Close the current segment, read it whole, then reopen it for append.
    ///
    /// If the read fails the segment is left closed; the next write reopens
    /// it.
    pub fn try_read_all(&mut self) -> LogStoreResult<String> {
        self.open = false;

        if !self.scanned {
            self.scan()?;
        }

        let path = self.config.segment_path(self.sequence);
        let data = self.storage.read(&path)?;
        let content = String::from_utf8_lossy(&data).into_owned();

        // A failed reopen still returns what was read
        let _ = self.open_current();

        Ok(content)
    }

    /// The last `line_count` lines of the current segment.
    ///
    /// Content with fewer lines, including the [`NO_LOG_AVAILABLE`]
    /// sentinel, is returned unchanged.
    pub fn read_tail(&mut self, line_count: usize) -> String {
        let content = self.read_all();
        tail_lines(&content, line_count).to_string()
    }

    /// Delete every file in the log directory and start over at the base
    /// sequence number.
    pub fn clear_all(&mut self) {
        if let Err(e) = self.try_clear_all() {
            warn!(error = %e, "failed to clear logs");
        }
    }

    /// Fallible form of [`clear_all`](Self::clear_all).
    ///
    /// The next sequence number comes from a fresh scan, so a segment that
    /// could not be removed is never appended to again. If the listing fails
    /// the store is left without a current segment and the next write
    /// rescans.
    pub fn try_clear_all(&mut self) -> LogStoreResult<usize> {
        self.open = false;
        self.scanned = false;

        let removed = match rotation::remove_all(&self.storage, &self.config) {
            Ok(removed) => removed,
            Err(StorageError::NotFound(_)) => 0,
            Err(e) => return Err(e.into()),
        };

        info!(removed, "cleared all log segments");

        self.scan()?;
        self.open_current()?;

        Ok(removed)
    }

    /// All segments on storage, oldest first
    pub fn segments(&self) -> LogStoreResult<Vec<SegmentInfo>> {
        Ok(rotation::list_segments(&self.storage, &self.config)?)
    }

    /// Segment counts and sizes
    pub fn stats(&self) -> LogStoreResult<LogStoreStats> {
        let segments = self.segments()?;
        Ok(LogStoreStats::from_segments(
            &segments,
            self.current_sequence(),
            self.current_size,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;
    use std::path::Path;

    fn create_test_store(config: LogStoreConfig) -> (LogStore<MemoryStorage, ManualClock>, MemoryStorage) {
        let storage = MemoryStorage::new();
        let clock = ManualClock::at(12, 0);
        let store = LogStore::new(storage.clone(), clock, config);
        (store, storage)
    }

    #[test]
    fn test_initialize_starts_at_base() {
        let (mut store, storage) = create_test_store(LogStoreConfig::default());

        store.initialize().unwrap();

        assert_eq!(store.current_sequence(), Some(1000));
        assert_eq!(store.current_size(), 0);
        assert!(storage.exists(Path::new("logs/1000.log")));
    }

    #[test]
    fn test_initialize_continues_after_highest() {
        let (mut store, storage) = create_test_store(LogStoreConfig::default());
        storage.insert("logs/1000.log", "old\n");
        storage.insert("logs/1007.log", "older\n");

        store.initialize().unwrap();

        assert_eq!(store.current_sequence(), Some(1008));
        assert_eq!(store.current_size(), 0);
    }

    #[test]
    fn test_initialize_ignores_segments_below_base() {
        let (mut store, storage) = create_test_store(LogStoreConfig::default());
        storage.insert("logs/7.log", "tiny\n");

        store.initialize().unwrap();

        assert_eq!(store.current_sequence(), Some(1000));
    }

    #[test]
    fn test_append_writes_formatted_line() {
        let (mut store, storage) = create_test_store(LogStoreConfig::default());
        store.initialize().unwrap();

        let outcome = store.try_append(LogLevel::Info, "hello").unwrap();

        let line = "2024-06-21 12:00:00 [INFO] hello\n";
        assert_eq!(
            outcome,
            AppendOutcome::Written {
                bytes: line.len() as u64
            }
        );
        assert_eq!(storage.contents("logs/1000.log").as_deref(), Some(line));
        assert_eq!(store.current_size(), line.len() as u64);
    }

    #[test]
    fn test_append_without_initialize_opens_on_demand() {
        let (mut store, storage) = create_test_store(LogStoreConfig::default());

        store.log_error("boom");

        assert_eq!(store.current_sequence(), Some(1000));
        assert_eq!(
            storage.contents("logs/1000.log").as_deref(),
            Some("2024-06-21 12:00:00 [ERROR] boom\n")
        );
    }

    #[test]
    fn test_rotation_at_threshold() {
        let line_len = "2024-06-21 12:00:00 [INFO] x\n".len() as u64;
        let config = LogStoreConfig {
            max_segment_bytes: line_len * 3,
            ..Default::default()
        };
        let (mut store, storage) = create_test_store(config);
        store.initialize().unwrap();

        store.log_info("x");
        store.log_info("x");
        let outcome = store.try_append(LogLevel::Info, "x").unwrap();

        assert_eq!(
            outcome,
            AppendOutcome::Rotated {
                sealed: 1000,
                current: Some(1001),
                evicted: None
            }
        );
        assert_eq!(store.current_sequence(), Some(1001));
        assert_eq!(store.current_size(), 0);
        assert_eq!(
            storage.contents("logs/1000.log").map(|c| c.len() as u64),
            Some(line_len * 3)
        );
        assert_eq!(storage.contents("logs/1001.log").as_deref(), Some(""));
    }

    #[test]
    fn test_rotation_evicts_lowest() {
        let config = LogStoreConfig {
            max_segment_bytes: 1,
            max_segments: 3,
            ..Default::default()
        };
        let (mut store, _storage) = create_test_store(config);
        store.initialize().unwrap();

        store.log_info("a"); // 1000 sealed, 1001 current
        store.log_info("b"); // 1001 sealed, 1002 current
        let outcome = store.try_append(LogLevel::Info, "c").unwrap();

        assert_eq!(
            outcome,
            AppendOutcome::Rotated {
                sealed: 1002,
                current: Some(1003),
                evicted: Some(1000)
            }
        );
        let sequences: Vec<u64> = store.segments().unwrap().iter().map(|s| s.sequence).collect();
        assert_eq!(sequences, vec![1001, 1002, 1003]);
    }

    #[test]
    fn test_read_all_keeps_appending_to_same_segment() {
        let (mut store, storage) = create_test_store(LogStoreConfig::default());
        store.initialize().unwrap();
        store.log_info("one");

        let content = store.read_all();
        assert_eq!(content, "2024-06-21 12:00:00 [INFO] one\n");
        assert_eq!(store.current_sequence(), Some(1000));
        assert_eq!(store.current_size(), content.len() as u64);

        store.log_info("two");
        assert_eq!(
            storage.contents("logs/1000.log").as_deref(),
            Some("2024-06-21 12:00:00 [INFO] one\n2024-06-21 12:00:00 [INFO] two\n")
        );
    }

    #[test]
    fn test_read_all_without_segment_returns_sentinel() {
        let (mut store, _storage) = create_test_store(LogStoreConfig::default());

        assert_eq!(store.read_all(), NO_LOG_AVAILABLE);
        assert!(matches!(
            store.try_read_all(),
            Err(LogStoreError::Storage(StorageError::NotFound(_)))
        ));
    }

    #[test]
    fn test_storage_outage_degrades_and_recovers() {
        let (mut store, storage) = create_test_store(LogStoreConfig::default());
        storage.set_available(false);

        assert!(matches!(
            store.initialize(),
            Err(LogStoreError::Storage(StorageError::Unavailable))
        ));
        assert_eq!(store.current_sequence(), None);

        store.log_info("lost");
        assert_eq!(store.read_all(), NO_LOG_AVAILABLE);

        storage.set_available(true);
        store.log_info("kept");

        assert_eq!(store.current_sequence(), Some(1000));
        assert_eq!(store.read_all(), "2024-06-21 12:00:00 [INFO] kept\n");
    }

    #[test]
    fn test_write_failure_closes_segment() {
        let (mut store, storage) = create_test_store(LogStoreConfig::default());
        store.initialize().unwrap();

        storage.set_available(false);
        assert!(store.try_append(LogLevel::Info, "x").is_err());
        assert_eq!(store.current_sequence(), None);
    }

    #[test]
    fn test_clear_all_resets_to_base() {
        let config = LogStoreConfig {
            max_segment_bytes: 1,
            ..Default::default()
        };
        let (mut store, storage) = create_test_store(config);
        store.initialize().unwrap();
        store.log_info("a");
        store.log_info("b");
        assert_eq!(store.current_sequence(), Some(1002));

        let removed = store.try_clear_all().unwrap();

        assert_eq!(removed, 3);
        assert_eq!(store.current_sequence(), Some(1000));
        assert_eq!(store.current_size(), 0);
        assert_eq!(storage.keys(), vec![std::path::PathBuf::from("logs/1000.log")]);
        assert_eq!(storage.contents("logs/1000.log").as_deref(), Some(""));
    }

    #[test]
    fn test_clear_all_before_initialize() {
        let (mut store, storage) = create_test_store(LogStoreConfig::default());

        assert_eq!(store.try_clear_all().unwrap(), 0);
        assert_eq!(store.current_sequence(), Some(1000));
        assert!(storage.exists(Path::new("logs/1000.log")));
    }

    #[test]
    fn test_failed_clear_never_reuses_sealed_segment() {
        let (mut store, storage) = create_test_store(LogStoreConfig::default());
        storage.insert("logs/1000.log", "SEALED OLD LINE\n");
        storage.insert("logs/1001.log", "SEALED OLD LINE\n");
        store.initialize().unwrap();
        assert_eq!(store.current_sequence(), Some(1002));

        storage.set_available(false);
        store.clear_all();
        assert_eq!(store.current_sequence(), None);

        storage.set_available(true);
        store.log_info("new line");

        assert_eq!(store.current_sequence(), Some(1003));
        assert_eq!(storage.contents("logs/1000.log").as_deref(), Some("SEALED OLD LINE\n"));
        assert_eq!(storage.contents("logs/1001.log").as_deref(), Some("SEALED OLD LINE\n"));
        assert_eq!(
            storage.contents("logs/1003.log").as_deref(),
            Some("2024-06-21 12:00:00 [INFO] new line\n")
        );
    }

    #[test]
    fn test_failed_initialize_rescans_on_first_write() {
        let (mut store, storage) = create_test_store(LogStoreConfig::default());
        storage.insert("logs/1000.log", "PRIOR RUN\n");
        storage.insert("logs/1005.log", "PRIOR RUN\n");

        storage.set_available(false);
        assert!(store.initialize().is_err());
        storage.set_available(true);

        store.log_info("new boot line");

        assert_eq!(store.current_sequence(), Some(1006));
        assert_eq!(storage.contents("logs/1000.log").as_deref(), Some("PRIOR RUN\n"));
        assert_eq!(storage.contents("logs/1005.log").as_deref(), Some("PRIOR RUN\n"));
        assert_eq!(store.read_all(), "2024-06-21 12:00:00 [INFO] new boot line\n");
    }

    #[test]
    fn test_read_before_any_scan_skips_prior_segments() {
        let (mut store, storage) = create_test_store(LogStoreConfig::default());
        storage.insert("logs/1000.log", "PRIOR RUN\n");

        // 1001 does not exist yet, so there is nothing to read
        assert_eq!(store.read_all(), NO_LOG_AVAILABLE);

        store.log_info("fresh");
        assert_eq!(store.current_sequence(), Some(1001));
        assert_eq!(storage.contents("logs/1000.log").as_deref(), Some("PRIOR RUN\n"));
    }

    #[test]
    fn test_sequence_saturates_at_max() {
        let config = LogStoreConfig {
            max_segment_bytes: 1,
            ..Default::default()
        };
        let (mut store, storage) = create_test_store(config);
        storage.insert(format!("logs/{}.log", u64::MAX), "");

        store.initialize().unwrap();
        assert_eq!(store.current_sequence(), Some(u64::MAX));

        store.log_info("x");
        assert_eq!(store.current_sequence(), Some(u64::MAX));
    }

    #[test]
    fn test_stats() {
        let (mut store, _storage) = create_test_store(LogStoreConfig::default());
        store.initialize().unwrap();
        store.log_info("abc");

        let stats = store.stats().unwrap();
        assert_eq!(stats.segment_count, 1);
        assert_eq!(stats.current_sequence, Some(1000));
        assert_eq!(stats.current_bytes, stats.total_bytes);
    }
}
