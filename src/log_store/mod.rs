//! Log Store Module
//!
//! Durable append-only event log with a bounded storage footprint:
//! - `LogStore`: Appends timestamped lines to the current segment
//! - `rotation`: Segment listing and retention eviction
//! - `LogStoreStats`: Segment counts and sizes
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌─────────┐    ┌──────────────┐    ┌─────────────────┐    ┌──────────────┐
//! │  Host   │───►│ append line  │───►│ size >= 1 MiB ? │───►│ rotate +     │
//! │  loop   │    │ to <seq>.log │    │                 │    │ evict oldest │
//! └─────────┘    └──────────────┘    └─────────────────┘    └──────────────┘
//!
//! Startup:
//! ┌────────────────┐    ┌──────────────────┐
//! │ scan logs/ for │───►│ open max + 1     │───► Ready!
//! │ <seq>.log      │    │ (or base 1000)   │
//! └────────────────┘    └──────────────────┘
//! ```

mod config;
mod entry;
mod rotation;
mod stats;
mod store;

pub use config::{
    parse_segment_name, segment_file_name, LogStoreConfig, DEFAULT_BASE_SEQUENCE,
    DEFAULT_MAX_SEGMENTS, DEFAULT_MAX_SEGMENT_BYTES,
};
pub use entry::{tail_lines, LogEntry, LogLevel, TIMESTAMP_FORMAT};
pub use rotation::SegmentInfo;
pub use stats::LogStoreStats;
pub use store::{
    AppendOutcome, LogStore, LogStoreError, LogStoreResult, LOG_MANAGER_UNAVAILABLE,
    NO_LOG_AVAILABLE,
};
