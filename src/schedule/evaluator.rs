//! Schedule Evaluator
//!
//! Holds the active [`RotationConfig`] and answers where the platform is on
//! its timeline:
//!
//! ```text
//! UNARMED --(is_completed() once start time reached)--> ARMED --(elapsed >= duration)--> DONE
//! ```
//!
//! UNARMED and ARMED differ only in whether the duration clock has been
//! armed. DONE is recomputed from elapsed monotonic time on every query and is
//! not stored, so if the monotonic counter goes backwards a DONE schedule
//! reads as ARMED again.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clock::{minutes_since_midnight, Clock, MINUTES_PER_DAY};
use crate::storage::{Storage, StorageError};

use super::config::{RotationConfig, INDEFINITE_REMAINING_MINUTES};

const MILLIS_PER_MINUTE: u64 = 60_000;

/// Result type for schedule operations
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Errors that can occur loading or saving the configuration
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// No configuration has been persisted yet
    #[error("configuration file does not exist")]
    Missing,

    /// The underlying storage failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The persisted document is not a valid configuration
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// What happens to an armed duration clock when the configuration changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatchPolicy {
    /// A new configuration starts unarmed
    #[default]
    ResetOnChange,
    /// An armed duration clock keeps running across configuration edits
    KeepAcrossChange,
}

/// Options for the ScheduleEvaluator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleOptions {
    /// Key of the persisted configuration document
    pub config_path: PathBuf,
    pub latch_policy: LatchPolicy,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("schedule.json"),
            latch_policy: LatchPolicy::default(),
        }
    }
}

impl ScheduleOptions {
    /// Default options with the given latch policy
    pub fn with_latch_policy(latch_policy: LatchPolicy) -> Self {
        Self {
            latch_policy,
            ..Default::default()
        }
    }
}

/// How [`ScheduleEvaluator::initialize`] obtained the active configuration
#[derive(Debug)]
pub enum LoadOutcome {
    /// The persisted document was loaded
    Loaded,
    /// The default was installed because loading failed
    DefaultInstalled(ScheduleError),
}

/// Where the schedule currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleState {
    /// The configured start time of day has not been reached
    NotStarted { minutes_until_start: u32 },
    /// Rotating; `remaining_minutes` is `None` for an indefinite schedule
    Running { remaining_minutes: Option<u32> },
    /// The configured duration has elapsed
    Completed,
}

/// Evaluates the active rotation schedule against a clock
pub struct ScheduleEvaluator<S, C> {
    storage: S,
    clock: C,
    options: ScheduleOptions,
    config: RotationConfig,
    /// Monotonic millis at which the duration clock was armed
    armed_at: Option<u64>,
}

impl<S: Storage, C: Clock> ScheduleEvaluator<S, C> {
    /// Create an evaluator holding the default configuration, unarmed.
    ///
    /// Call [`initialize`](Self::initialize) to load the persisted one.
    pub fn new(storage: S, clock: C, options: ScheduleOptions) -> Self {
        Self {
            storage,
            clock,
            options,
            config: RotationConfig::default(),
            armed_at: None,
        }
    }

    /// Get the options
    pub fn options(&self) -> &ScheduleOptions {
        &self.options
    }

    /// Load the persisted configuration, falling back to the default.
    ///
    /// When loading fails the default is installed and written back so the
    /// next load succeeds. The returned error, if any, is from that write; the
    /// default is active either way.
    pub fn initialize(&mut self) -> ScheduleResult<LoadOutcome> {
        self.armed_at = None;

        match self.load() {
            Ok(config) => {
                info!(rate = %config.rotation_rate, "configuration loaded successfully");
                self.config = config;
                Ok(LoadOutcome::Loaded)
            }
            Err(cause) => {
                warn!(error = %cause, "installing default configuration");
                self.config = RotationConfig::default();
                self.save()?;
                Ok(LoadOutcome::DefaultInstalled(cause))
            }
        }
    }

    fn load(&self) -> ScheduleResult<RotationConfig> {
        let path: &Path = &self.options.config_path;

        let data = match self.storage.read(path) {
            Ok(data) => data,
            Err(StorageError::NotFound(_)) => return Err(ScheduleError::Missing),
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_slice(&data)?)
    }

    fn save(&self) -> ScheduleResult<()> {
        let json = self.config.to_json()?;
        self.storage.write(&self.options.config_path, json.as_bytes())?;
        debug!(path = %self.options.config_path.display(), "configuration saved");
        Ok(())
    }

    /// A copy of the active configuration
    pub fn configuration(&self) -> RotationConfig {
        self.config.clone()
    }

    /// Replace the active configuration and persist it.
    ///
    /// The new configuration is active even if persisting fails.
    pub fn set_configuration(&mut self, config: RotationConfig) -> ScheduleResult<()> {
        info!(rate = %config.rotation_rate, start = %config.start_time, hours = config.duration_hours, "configuration changed");

        self.config = config;
        if self.options.latch_policy == LatchPolicy::ResetOnChange {
            self.armed_at = None;
        }

        self.save()
    }

    /// Whether the duration clock has been armed
    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    fn current_minutes(&self) -> u32 {
        minutes_since_midnight(&self.clock.now())
    }

    /// Same-day comparison of the time of day against the start time.
    ///
    /// There is no rollover: a start of "23:00" checked at 01:00 is still
    /// ahead, and one checked at 23:30 is past until midnight.
    pub fn is_before_start_time(&self) -> bool {
        if self.config.starts_immediately() {
            return false;
        }

        self.current_minutes() < self.config.start_minutes()
    }

    /// Whether the configured duration has elapsed.
    ///
    /// The first call at or after the start time arms the duration clock.
    pub fn is_completed(&mut self) -> bool {
        if self.config.is_indefinite() {
            return false;
        }

        if self.armed_at.is_none() && !self.is_before_start_time() {
            let now = self.clock.monotonic_millis();
            info!(millis = now, hours = self.config.duration_hours, "duration clock armed");
            self.armed_at = Some(now);
        }

        match self.elapsed_millis() {
            Some(elapsed) => elapsed >= self.config.duration_millis(),
            None => false,
        }
    }

    /// Monotonic millis since arming; a counter that went backwards reads as 0
    fn elapsed_millis(&self) -> Option<u64> {
        self.armed_at
            .map(|armed| self.clock.monotonic_millis().saturating_sub(armed))
    }

    /// Minutes until the start time next occurs, wrapping past midnight
    pub fn minutes_until_start(&self) -> u32 {
        let start = i64::from(self.config.start_minutes());
        let current = i64::from(self.current_minutes());
        (start - current).rem_euclid(i64::from(MINUTES_PER_DAY)) as u32
    }

    /// Whole minutes left on the duration clock.
    ///
    /// [`INDEFINITE_REMAINING_MINUTES`] for an indefinite schedule, the full
    /// duration while unarmed, then counting down to 0.
    pub fn remaining_minutes(&self) -> u32 {
        if self.config.is_indefinite() {
            return INDEFINITE_REMAINING_MINUTES;
        }

        let Some(elapsed) = self.elapsed_millis() else {
            return self.config.duration_minutes();
        };

        let remaining = self.config.duration_millis().saturating_sub(elapsed);
        u32::try_from(remaining / MILLIS_PER_MINUTE).unwrap_or(u32::MAX)
    }

    /// Classify the current moment, checking before-start, then completion
    pub fn state(&mut self) -> ScheduleState {
        if self.is_before_start_time() {
            return ScheduleState::NotStarted {
                minutes_until_start: self.minutes_until_start(),
            };
        }

        if self.is_completed() {
            return ScheduleState::Completed;
        }

        let remaining_minutes = if self.config.is_indefinite() {
            None
        } else {
            Some(self.remaining_minutes())
        };

        ScheduleState::Running { remaining_minutes }
    }
}
