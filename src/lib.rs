//! Star Tracker Core
//!
//! Persistent log store and rotation schedule evaluator for a GPS-synchronised
//! star tracker. Display, Bluetooth menu, GPS decoding and motor control live
//! elsewhere; they read and write through the APIs here.
//!
//! # Features
//!
//! - **Segmented Log**: Timestamped text lines in `logs/<seq>.log`, rotated at 1 MiB
//! - **Bounded Retention**: At most 50 segments, oldest evicted first
//! - **Schedule**: Start time, duration and remaining time from one persisted record
//! - **Silent Degrade**: Storage failures become no-ops and sentinel text, never panics
//!
//! # Modules
//!
//! - `log_store`: Segment rotation, retention and tail reads
//! - `schedule`: Rotation configuration and timeline evaluation
//! - `storage`: File-system-like byte storage (file and in-memory)
//! - `clock`: Wall-clock and monotonic time sources
//! - `settings`: Environment-driven runtime settings
//!
//! # Example
//!
//! ```no_run
//! use tracker_core::clock::SystemClock;
//! use tracker_core::log_store::{LogStore, LogStoreConfig};
//! use tracker_core::schedule::{status_line, ScheduleEvaluator, ScheduleOptions};
//! use tracker_core::storage::FsStorage;
//!
//! let storage = FsStorage::new("data");
//!
//! let mut log = LogStore::new(storage.clone(), SystemClock::new(), LogStoreConfig::default());
//! let _ = log.initialize();
//!
//! let mut schedule = ScheduleEvaluator::new(storage, SystemClock::new(), ScheduleOptions::default());
//! let _ = schedule.initialize();
//!
//! log.log_info(&status_line(&mut schedule));
//! println!("{}", log.read_tail(5));
//! ```

pub mod clock;
pub mod log_store;
pub mod schedule;
pub mod settings;
pub mod storage;

// Re-export commonly used items at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use log_store::{LogLevel, LogStore, LogStoreConfig};
pub use schedule::{RotationConfig, RotationRate, ScheduleEvaluator, ScheduleOptions, ScheduleState};
pub use settings::Settings;
pub use storage::{FsStorage, MemoryStorage, Storage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
