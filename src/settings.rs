//! Runtime settings for the `tracker` binary

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::log_store::LogStoreConfig;
use crate::schedule::{LatchPolicy, ScheduleOptions};

/// Settings read from the environment at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root directory for log segments and the configuration document
    pub data_dir: PathBuf,
    /// Control-loop period
    pub poll_interval: Duration,
    /// How often a status line is appended to the log
    pub status_log_interval: Duration,
    pub log_store: LogStoreConfig,
    pub schedule: ScheduleOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            poll_interval: Duration::from_millis(250),
            status_log_interval: Duration::from_secs(60),
            log_store: LogStoreConfig::default(),
            schedule: ScheduleOptions::default(),
        }
    }
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// Environment:
    /// - TRACKER_DATA_DIR: Storage root (optional, default "data")
    /// - TRACKER_POLL_MS: Control-loop period in milliseconds (optional, default 250)
    /// - TRACKER_STATUS_LOG_SECS: Status logging interval in seconds (optional, default 60)
    /// - TRACKER_KEEP_LATCH: "1" or "true" keeps a running duration clock across configuration changes
    ///
    /// Values that fail to parse keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(dir) = lookup("TRACKER_DATA_DIR") {
            if !dir.trim().is_empty() {
                settings.data_dir = PathBuf::from(dir.trim());
            }
        }

        if let Some(ms) = lookup("TRACKER_POLL_MS") {
            if let Ok(ms) = ms.trim().parse::<u64>() {
                if ms > 0 {
                    settings.poll_interval = Duration::from_millis(ms);
                }
            }
        }

        if let Some(secs) = lookup("TRACKER_STATUS_LOG_SECS") {
            if let Ok(secs) = secs.trim().parse::<u64>() {
                settings.status_log_interval = Duration::from_secs(secs);
            }
        }

        if let Some(flag) = lookup("TRACKER_KEEP_LATCH") {
            let flag = flag.trim().to_ascii_lowercase();
            if flag == "1" || flag == "true" {
                settings.schedule.latch_policy = LatchPolicy::KeepAcrossChange;
            }
        }

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.schedule.latch_policy, LatchPolicy::ResetOnChange);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("TRACKER_DATA_DIR", "/var/lib/tracker"),
            ("TRACKER_POLL_MS", "100"),
            ("TRACKER_STATUS_LOG_SECS", "5"),
            ("TRACKER_KEEP_LATCH", "TRUE"),
        ]));

        assert_eq!(settings.data_dir, PathBuf::from("/var/lib/tracker"));
        assert_eq!(settings.poll_interval, Duration::from_millis(100));
        assert_eq!(settings.status_log_interval, Duration::from_secs(5));
        assert_eq!(settings.schedule.latch_policy, LatchPolicy::KeepAcrossChange);
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("TRACKER_POLL_MS", "fast"),
            ("TRACKER_STATUS_LOG_SECS", "-1"),
            ("TRACKER_KEEP_LATCH", "maybe"),
        ]));

        assert_eq!(settings, Settings::default());
    }
}
