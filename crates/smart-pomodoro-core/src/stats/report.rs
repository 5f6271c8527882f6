//! Long-range report: all-time totals and the last seven days.

use chrono::{Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::today::starts_on;
use crate::timer::TimerEngine;

/// Work minutes for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyFocus {
    pub date: NaiveDate,
    /// Short weekday name, e.g. "Mon"
    pub weekday: String,
    pub work_minutes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub all_time_work_minutes: u64,
    pub all_time_pomodoros: u32,
    pub total_tasks: usize,
    /// Tasks with at least one completed work session
    pub tasks_with_focus: usize,
    /// Oldest first, ending with `today`
    pub last_7_days: Vec<DailyFocus>,
}

pub fn report_in<Tz: TimeZone>(engine: &TimerEngine, tz: &Tz, today: NaiveDate) -> Report {
    let work = || engine.sessions().iter().filter(|s| s.is_work());

    let tasks_with_focus = engine
        .tasks()
        .tasks()
        .iter()
        .filter(|t| work().any(|s| s.task_id.as_deref() == Some(t.id.as_str())))
        .count();

    let last_7_days = (0..7u64)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| DailyFocus {
            date,
            weekday: date.format("%a").to_string(),
            work_minutes: work()
                .filter(|s| starts_on(s, tz, date))
                .map(|s| s.duration)
                .sum(),
        })
        .collect();

    Report {
        all_time_work_minutes: work().map(|s| s.duration).sum(),
        all_time_pomodoros: work().count() as u32,
        total_tasks: engine.tasks().len(),
        tasks_with_focus,
        last_7_days,
    }
}
