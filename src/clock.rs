//! Time sources and time-of-day helpers
//!
//! The log store needs calendar time for line timestamps; the schedule
//! evaluator needs the time of day and a monotonic millisecond counter for
//! elapsed-duration tracking. Both read through the [`Clock`] trait so tests
//! can drive time explicitly.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use parking_lot::Mutex;

/// Minutes in one day
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Calendar time plus a monotonic counter
pub trait Clock: Send + Sync {
    /// Current wall-clock time (second resolution is enough)
    fn now(&self) -> NaiveDateTime;

    /// Milliseconds on a monotonic counter with an arbitrary origin
    fn monotonic_millis(&self) -> u64;
}

/// Local system time and a process-relative monotonic counter
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose monotonic counter starts at zero now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }

    fn monotonic_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

#[derive(Debug)]
struct ManualState {
    now: NaiveDateTime,
    millis: u64,
}

/// A clock that only moves when told to.
///
/// Clones share state, so a test keeps one handle and gives another to the
/// component under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    /// Start at `now` with the monotonic counter at `start_millis`
    pub fn new(now: NaiveDateTime, start_millis: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState {
                now,
                millis: start_millis,
            })),
        }
    }

    /// Convenience: a fixed calendar day at `hour:minute`
    pub fn at(hour: u32, minute: u32) -> Self {
        Self::new(date_at(hour, minute), 1)
    }

    /// Jump the wall clock to `now` without touching the monotonic counter
    pub fn set_now(&self, now: NaiveDateTime) {
        self.state.lock().now = now;
    }

    /// Jump the wall clock to `hour:minute` on the current calendar day
    pub fn set_time_of_day(&self, hour: u32, minute: u32) {
        let mut state = self.state.lock();
        let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default();
        state.now = state.now.date().and_time(time);
    }

    /// Move both the wall clock and the monotonic counter forward
    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock();
        state.millis = state.millis.saturating_add(by.as_millis() as u64);
        if let Ok(delta) = chrono::Duration::from_std(by) {
            state.now += delta;
        }
    }

    /// Overwrite the monotonic counter, e.g. to simulate a reset
    pub fn set_monotonic_millis(&self, millis: u64) {
        self.state.lock().millis = millis;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.state.lock().now
    }

    fn monotonic_millis(&self) -> u64 {
        self.state.lock().millis
    }
}

fn date_at(hour: u32, minute: u32) -> NaiveDateTime {
    let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap_or_default();
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default();
    date.and_time(time)
}

/// Minutes elapsed since local midnight for `time`
pub fn minutes_since_midnight(time: &NaiveDateTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Parse an "HH:MM" string into minutes since midnight.
///
/// Anything without a colon yields 0. Each side contributes its leading
/// digits only, so "7:5x" is 425 and ":" is 0. Values are not range checked:
/// "30:00" is 1800.
pub fn parse_time_of_day(text: &str) -> u32 {
    let Some((hours, minutes)) = text.split_once(':') else {
        return 0;
    };

    leading_number(hours)
        .saturating_mul(60)
        .saturating_add(leading_number(minutes))
}

fn leading_number(text: &str) -> u32 {
    text.trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .fold(0u32, |acc, c| {
            acc.saturating_mul(10)
                .saturating_add(c.to_digit(10).unwrap_or(0))
        })
}
