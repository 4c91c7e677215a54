//! Log store configuration

use std::path::{Path, PathBuf};

/// Segment size that triggers rotation (1 MiB)
pub const DEFAULT_MAX_SEGMENT_BYTES: u64 = 1_048_576;

/// Segment count above which the oldest segment is evicted
pub const DEFAULT_MAX_SEGMENTS: usize = 50;

/// Sequence number of the first segment after a fresh start or a clear
pub const DEFAULT_BASE_SEQUENCE: u64 = 1000;

/// File extension of segment files
pub const SEGMENT_EXTENSION: &str = "log";

/// Configuration for the LogStore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogStoreConfig {
    /// Directory holding the segments, relative to the storage root
    pub log_dir: PathBuf,
    /// Rotate once the current segment reaches this many bytes
    pub max_segment_bytes: u64,
    /// Keep at most this many segments (one eviction per rotation)
    pub max_segments: usize,
    /// First sequence number
    pub base_sequence: u64,
}

impl Default for LogStoreConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            max_segment_bytes: DEFAULT_MAX_SEGMENT_BYTES,
            max_segments: DEFAULT_MAX_SEGMENTS,
            base_sequence: DEFAULT_BASE_SEQUENCE,
        }
    }
}

impl LogStoreConfig {
    /// Create config with a custom log directory
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Self {
        Self {
            log_dir: log_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Get the log directory
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Key of the segment with the given sequence number
    pub fn segment_path(&self, sequence: u64) -> PathBuf {
        self.log_dir.join(segment_file_name(sequence))
    }
}

/// "<sequence>.log"
pub fn segment_file_name(sequence: u64) -> String {
    format!("{}.{}", sequence, SEGMENT_EXTENSION)
}

/// Sequence number encoded in a segment file name, if it is one.
///
/// Only canonical names count: "0999.log" or "+5.log" would not map back to
/// the same file and are treated as foreign files.
pub fn parse_segment_name(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(SEGMENT_EXTENSION)?.strip_suffix('.')?;
    let sequence: u64 = stem.parse().ok()?;
    (segment_file_name(sequence) == name).then_some(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_path() {
        let config = LogStoreConfig::default();
        assert_eq!(config.segment_path(1000), PathBuf::from("logs/1000.log"));
    }

    #[test]
    fn test_parse_segment_name() {
        assert_eq!(parse_segment_name("1000.log"), Some(1000));
        assert_eq!(parse_segment_name("1049.log"), Some(1049));
        assert_eq!(parse_segment_name("notes.txt"), None);
        assert_eq!(parse_segment_name("abc.log"), None);
        assert_eq!(parse_segment_name("1000log"), None);
        assert_eq!(parse_segment_name(".log"), None);
    }

    #[test]
    fn test_parse_segment_name_rejects_non_canonical() {
        assert_eq!(parse_segment_name("0999.log"), None);
        assert_eq!(parse_segment_name("+5.log"), None);
        assert_eq!(parse_segment_name("0.log"), Some(0));
        assert_eq!(parse_segment_name("18446744073709551615.log"), Some(u64::MAX));
    }
}
