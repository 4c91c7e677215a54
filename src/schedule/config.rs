//! Rotation configuration record
//!
//! Persisted as a single JSON document:
//!
//! ```json
//! {"rotationSpeed":2,"startTime":"00:00","durationHours":0,"rewindAfterComplete":false}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::parse_time_of_day;

/// Returned by remaining-time queries when the duration is indefinite
pub const INDEFINITE_REMAINING_MINUTES: u32 = 999_999;

const MILLIS_PER_HOUR: u64 = 3_600_000;

/// A rotation-rate code outside 0..=2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid rotation speed code {0}")]
pub struct InvalidRotationRate(pub i64);

/// How fast the platform turns; stored as its integer code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum RotationRate {
    /// One revolution per minute (code 0)
    PerMinute,
    /// One revolution per hour (code 1)
    PerHour,
    /// One revolution per day (code 2)
    PerDay,
}

impl RotationRate {
    /// Integer code used in the persisted document
    pub fn code(&self) -> i64 {
        match self {
            RotationRate::PerMinute => 0,
            RotationRate::PerHour => 1,
            RotationRate::PerDay => 2,
        }
    }

    /// Short label shown on the status line
    pub fn label(&self) -> &'static str {
        match self {
            RotationRate::PerMinute => "1m",
            RotationRate::PerHour => "1h",
            RotationRate::PerDay => "1d",
        }
    }
}

impl TryFrom<i64> for RotationRate {
    type Error = InvalidRotationRate;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(RotationRate::PerMinute),
            1 => Ok(RotationRate::PerHour),
            2 => Ok(RotationRate::PerDay),
            other => Err(InvalidRotationRate(other)),
        }
    }
}

impl From<RotationRate> for i64 {
    fn from(rate: RotationRate) -> Self {
        rate.code()
    }
}

impl fmt::Display for RotationRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationRate::PerMinute => write!(f, "1 rotation per minute"),
            RotationRate::PerHour => write!(f, "1 rotation per hour"),
            RotationRate::PerDay => write!(f, "1 rotation per day"),
        }
    }
}

/// The single active schedule configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationConfig {
    #[serde(rename = "rotationSpeed")]
    pub rotation_rate: RotationRate,
    /// "HH:MM"; empty or "00:00" means start immediately
    pub start_time: String,
    /// 0 runs indefinitely
    pub duration_hours: u32,
    /// Consumed by the motor controller, not by the schedule
    pub rewind_after_complete: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            rotation_rate: RotationRate::PerDay,
            start_time: "00:00".to_string(),
            duration_hours: 0,
            rewind_after_complete: false,
        }
    }
}

impl RotationConfig {
    /// Start immediately with an indefinite duration
    pub fn continuous(rotation_rate: RotationRate) -> Self {
        Self {
            rotation_rate,
            ..Default::default()
        }
    }

    /// True when the start time means "start immediately"
    pub fn starts_immediately(&self) -> bool {
        self.start_time.is_empty() || self.start_time == "00:00"
    }

    /// Configured start as minutes since midnight (0 if unparsable)
    pub fn start_minutes(&self) -> u32 {
        parse_time_of_day(&self.start_time)
    }

    pub fn is_indefinite(&self) -> bool {
        self.duration_hours == 0
    }

    pub fn duration_millis(&self) -> u64 {
        u64::from(self.duration_hours) * MILLIS_PER_HOUR
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_hours.saturating_mul(60)
    }

    /// Serialize to the persisted JSON document
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse the persisted JSON document
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
