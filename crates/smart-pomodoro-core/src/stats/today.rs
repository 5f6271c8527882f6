//! Today's focus summary.
//!
//! A session counts for a day when its start time, converted to the
//! caller's time zone, falls on that calendar date.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::task::TaskId;
use crate::timer::TimerEngine;

/// Shown for sessions whose task has since been deleted.
pub const UNTITLED_TASK: &str = "Untitled";

/// Per-task line of today's summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBreakdown {
    pub task_id: TaskId,
    /// Task name, or "Untitled" if the task no longer exists
    pub task_name: String,
    /// Minutes of every session (work and break) attributed to the task
    pub total_minutes: u64,
    /// Completed work sessions
    pub pomodoros: u32,
}

/// Today's totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayStats {
    pub total_work_minutes: u64,
    pub pomodoro_count: u32,
    /// In order of first appearance in the history
    pub per_task: Vec<TaskBreakdown>,
}

pub(crate) fn starts_on<Tz: TimeZone>(session: &Session, tz: &Tz, day: NaiveDate) -> bool {
    session.start_time.with_timezone(tz).date_naive() == day
}

/// Summary for `day` in time zone `tz`.
pub fn today_stats_in<Tz: TimeZone>(engine: &TimerEngine, tz: &Tz, day: NaiveDate) -> TodayStats {
    let mut stats = TodayStats::default();
    for s in engine.sessions().iter().filter(|s| starts_on(s, tz, day)) {
        if s.is_work() {
            stats.total_work_minutes += s.duration;
            stats.pomodoro_count += 1;
        }
        let Some(task_id) = s.task_id.as_deref() else {
            continue;
        };
        let idx = match stats.per_task.iter().position(|t| t.task_id == task_id) {
            Some(idx) => idx,
            None => {
                let task_name = engine
                    .tasks()
                    .get(task_id)
                    .map_or_else(|| UNTITLED_TASK.to_string(), |t| t.name.clone());
                stats.per_task.push(TaskBreakdown {
                    task_id: task_id.to_string(),
                    task_name,
                    total_minutes: 0,
                    pomodoros: 0,
                });
                stats.per_task.len() - 1
            }
        };
        let entry = &mut stats.per_task[idx];
        entry.total_minutes += s.duration;
        if s.is_work() {
            entry.pomodoros += 1;
        }
    }
    stats
}

/// Summary for the local calendar date of `now`.
pub fn today_stats(engine: &TimerEngine, now: DateTime<Utc>) -> TodayStats {
    let day = now.with_timezone(&Local).date_naive();
    today_stats_in(engine, &Local, day)
}
