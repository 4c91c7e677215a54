//! Activity text for the display and serial status output

use crate::clock::Clock;
use crate::storage::Storage;

use super::evaluator::{ScheduleEvaluator, ScheduleState};

/// "H:MM" with zero-padded minutes
pub fn format_hours_minutes(total_minutes: u32) -> String {
    format!("{}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// Render the schedule part of the activity line, e.g.
/// `"Mode: 1d Begin in 1:05"`, `"Mode: 1h completed"` or
/// `"Mode: 1m Remain 1:59"`.
///
/// An indefinite schedule reports the 999999-minute sentinel as its
/// remaining time.
pub fn status_line<S: Storage, C: Clock>(evaluator: &mut ScheduleEvaluator<S, C>) -> String {
    let mode = evaluator.configuration().rotation_rate.label();

    let detail = match evaluator.state() {
        ScheduleState::NotStarted {
            minutes_until_start,
        } => format!("Begin in {}", format_hours_minutes(minutes_until_start)),
        ScheduleState::Completed => "completed".to_string(),
        ScheduleState::Running { .. } => {
            format!("Remain {}", format_hours_minutes(evaluator.remaining_minutes()))
        }
    };

    format!("Mode: {} {}", mode, detail)
}
