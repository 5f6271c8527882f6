use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::task::TaskId;
use crate::timer::{Durations, Mode};

/// Every state change produces one or more Events.
/// Subscribers of the store receive them alongside the new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        seconds_left: u64,
        task_id: Option<TaskId>,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: Mode,
        seconds_left: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        seconds_left: u64,
        at: DateTime<Utc>,
    },
    /// Manual mode switch; never produces a session.
    ModeChanged {
        from: Mode,
        to: Mode,
        seconds_left: u64,
        at: DateTime<Utc>,
    },
    /// An interval reached zero and was recorded.
    IntervalCompleted {
        session: Session,
        next_mode: Mode,
        completed_work_sessions: u32,
        at: DateTime<Utc>,
    },
    DurationsChanged {
        durations: Durations,
        at: DateTime<Utc>,
    },
    TaskAdded {
        task_id: TaskId,
        name: String,
        at: DateTime<Utc>,
    },
    ActiveTaskChanged {
        from: Option<TaskId>,
        to: Option<TaskId>,
        seconds_left: u64,
        at: DateTime<Utc>,
    },
    TaskRemoved {
        task_id: TaskId,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: Mode,
        seconds_left: u64,
        total_secs: u64,
        is_running: bool,
        active_task_id: Option<TaskId>,
        completed_work_sessions: u32,
        at: DateTime<Utc>,
    },
}
