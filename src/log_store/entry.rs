//! Log entry format
//!
//! One entry is one text line:
//!
//! ```text
//! 2024-06-21 05:59:58 [INFO] GPS fix obtained, system time set
//! ```
//!
//! The message is written verbatim. A message containing '\n' produces more
//! than one physical line; keeping messages single-line is up to the caller.

use std::fmt;

use chrono::NaiveDateTime;

/// Timestamp layout used at the start of every line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    /// Upper-case label written between brackets
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "INFO" => Some(LogLevel::Info),
            "ERROR" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single timestamped line in a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(timestamp: NaiveDateTime, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            level,
            message: message.into(),
        }
    }

    /// Render the entry as it is stored, trailing newline included
    pub fn to_line(&self) -> String {
        format!(
            "{} [{}] {}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.level,
            self.message
        )
    }

    /// Parse a stored line back into an entry.
    ///
    /// Accepts the line with or without its trailing newline.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\n').unwrap_or(line);

        // "YYYY-MM-DD HH:MM:SS" is 19 bytes
        let stamp = line.get(..19)?;
        let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;

        let rest = line.get(19..)?.strip_prefix(" [")?;
        let (label, message) = rest.split_once("] ")?;
        let level = LogLevel::from_label(label)?;

        Some(Self::new(timestamp, level, message))
    }
}

/// The last `count` lines of `content`.
///
/// A trailing newline terminates the final line rather than starting an
/// empty one, so "a\nb\nc\n" has three lines and its last two are "b\nc\n".
/// Content with fewer lines is returned unchanged.
pub fn tail_lines(content: &str, count: usize) -> &str {
    if count == 0 {
        return "";
    }

    let bytes = content.as_bytes();
    let mut end = bytes.len();
    if end > 0 && bytes[end - 1] == b'\n' {
        end -= 1;
    }

    let mut seen = 0;
    for i in (0..end).rev() {
        if bytes[i] == b'\n' {
            seen += 1;
            if seen == count {
                return &content[i + 1..];
            }
        }
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 4, 5)
            .unwrap()
    }

    #[test]
    fn test_to_line_format() {
        let entry = LogEntry::new(stamp(), LogLevel::Info, "System startup completed");
        assert_eq!(
            entry.to_line(),
            "2024-03-09 07:04:05 [INFO] System startup completed\n"
        );

        let entry = LogEntry::new(stamp(), LogLevel::Error, "Failed to open log file");
        assert_eq!(
            entry.to_line(),
            "2024-03-09 07:04:05 [ERROR] Failed to open log file\n"
        );
    }

    #[test]
    fn test_parse_reads_back_line() {
        let entry = LogEntry::new(stamp(), LogLevel::Error, "Mode: 1d [x] Remain 1:05");
        assert_eq!(LogEntry::parse(&entry.to_line()), Some(entry));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(LogEntry::parse(""), None);
        assert_eq!(LogEntry::parse("not a log line at all"), None);
        assert_eq!(LogEntry::parse("2024-03-09 07:04:05 [WARN] nope"), None);
        assert_eq!(LogEntry::parse("2024-13-09 07:04:05 [INFO] bad month"), None);
    }

    #[test]
    fn test_tail_lines_fewer_lines_unchanged() {
        assert_eq!(tail_lines("a\nb\n", 5), "a\nb\n");
        assert_eq!(tail_lines("", 3), "");
        assert_eq!(tail_lines("single", 1), "single");
    }

    #[test]
    fn test_tail_lines_exact_suffix() {
        assert_eq!(tail_lines("a\nb\nc\n", 2), "b\nc\n");
        assert_eq!(tail_lines("a\nb\nc\n", 1), "c\n");
        assert_eq!(tail_lines("a\nb\nc\n", 3), "a\nb\nc\n");
        assert_eq!(tail_lines("a\nb\nc", 2), "b\nc");
    }

    #[test]
    fn test_tail_lines_zero() {
        assert_eq!(tail_lines("a\nb\n", 0), "");
    }

    proptest! {
        #[test]
        fn prop_tail_returns_last_lines(
            lines in proptest::collection::vec("[a-z ]{0,12}", 0..30),
            count in 1usize..40,
        ) {
            let content: String = lines.iter().map(|l| format!("{}\n", l)).collect();
            let expected: String = lines
                .iter()
                .skip(lines.len().saturating_sub(count))
                .map(|l| format!("{}\n", l))
                .collect();

            prop_assert_eq!(tail_lines(&content, count), expected.as_str());
        }
    }
}
