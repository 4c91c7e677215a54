//! Log Store Statistics
//!
//! Provides statistics about the log store including:
//! - Segment counts
//! - Storage size information

use super::rotation::SegmentInfo;

/// Statistics about the Log Store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogStoreStats {
    /// Number of segment files, current included
    pub segment_count: usize,
    /// Total size of all segments in bytes
    pub total_bytes: u64,
    /// Lowest sequence number on storage
    pub oldest_sequence: Option<u64>,
    /// Sequence number of the open segment
    pub current_sequence: Option<u64>,
    /// Bytes written to the open segment
    pub current_bytes: u64,
}

impl LogStoreStats {
    /// Build stats from a segment listing
    pub fn from_segments(
        segments: &[SegmentInfo],
        current_sequence: Option<u64>,
        current_bytes: u64,
    ) -> Self {
        Self {
            segment_count: segments.len(),
            total_bytes: segments.iter().map(|s| s.size).sum(),
            oldest_sequence: segments.iter().map(|s| s.sequence).min(),
            current_sequence,
            current_bytes,
        }
    }

    /// Format size in human-readable format
    pub fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.2} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.2} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.2} KB", bytes as f64 / KB as f64)
        } else {
            format!("{} B", bytes)
        }
    }

    /// One-line summary for the status menu
    pub fn summary(&self) -> String {
        match self.current_sequence {
            Some(sequence) => format!(
                "{} segments, {} total, current #{} ({})",
                self.segment_count,
                Self::format_size(self.total_bytes),
                sequence,
                Self::format_size(self.current_bytes)
            ),
            None => format!(
                "{} segments, {} total, no current segment",
                self.segment_count,
                Self::format_size(self.total_bytes)
            ),
        }
    }
}
