//! Statistics module for smart-pomodoro
//!
//! Read-only selectors over a [`TimerEngine`](crate::TimerEngine)
//! snapshot: today's focus summary with a per-task breakdown, and a
//! longer report with all-time totals and a seven-day series.

mod report;
mod today;

pub use report::{report_in, DailyFocus, Report};
pub use today::{today_stats, today_stats_in, TaskBreakdown, TodayStats, UNTITLED_TASK};

use chrono::{DateTime, Local, Utc};

use crate::timer::TimerEngine;

/// Report ending on the local calendar date of `now`.
pub fn report(engine: &TimerEngine, now: DateTime<Utc>) -> Report {
    report_in(engine, &Local, now.with_timezone(&Local).date_naive())
}
