//! Rotation schedule
//!
//! - `RotationConfig`: The single persisted configuration record
//! - `ScheduleEvaluator`: Start-time, duration and remaining-time queries
//! - `status_line`: Activity text built from the evaluator

mod config;
mod evaluator;
mod status;

pub use config::{InvalidRotationRate, RotationConfig, RotationRate, INDEFINITE_REMAINING_MINUTES};
pub use evaluator::{
    LatchPolicy, LoadOutcome, ScheduleError, ScheduleEvaluator, ScheduleOptions, ScheduleResult,
    ScheduleState,
};
pub use status::{format_hours_minutes, status_line};
