use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::engine::TimerEngine;
use super::mode::Mode;
use crate::error::ValidationError;
use crate::events::Event;
use crate::task::{Task, TaskId};

/// Everything a UI collaborator can ask of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    SetMode { mode: Mode },
    Start,
    Pause,
    Reset,
    Tick,
    /// Minutes in; stored as seconds.
    SetDurations {
        work: u64,
        short_break: u64,
        long_break: u64,
    },
    AddTask {
        name: String,
        #[serde(default)]
        category: Option<String>,
    },
    SetActiveTask { id: TaskId },
    RemoveTask { id: TaskId },
}

impl TimerEngine {
    /// Apply one command in place, returning the events it produced.
    ///
    /// # Errors
    /// Only `AddTask` can fail, when the name is blank.
    pub fn apply(&mut self, command: Command, now: DateTime<Utc>) -> Result<Vec<Event>, ValidationError> {
        let event = match command {
            Command::SetMode { mode } => self.set_mode(mode, now),
            Command::Start => self.start(now),
            Command::Pause => self.pause(now),
            Command::Reset => self.reset(now),
            Command::Tick => self.tick(now),
            Command::SetDurations {
                work,
                short_break,
                long_break,
            } => self.set_durations(work, short_break, long_break, now),
            Command::AddTask { name, category } => {
                let task = Task::new(&name, category.as_deref(), now)?;
                self.add_task(task, now)
            }
            Command::SetActiveTask { id } => self.set_active_task(&id, now),
            Command::RemoveTask { id } => self.remove_task(&id, now),
        };
        Ok(event.into_iter().collect())
    }
}

/// `(previous snapshot, command) -> next snapshot`. The previous snapshot
/// is left untouched.
///
/// # Errors
/// See [`TimerEngine::apply`].
pub fn reduce(
    prev: &TimerEngine,
    command: Command,
    now: DateTime<Utc>,
) -> Result<(TimerEngine, Vec<Event>), ValidationError> {
    let mut next = prev.clone();
    let events = next.apply(command, now)?;
    Ok((next, events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
    }

    #[test]
    fn reduce_leaves_previous_snapshot_alone() {
        let prev = TimerEngine::default();
        let (next, events) = reduce(&prev, Command::Start, t0()).unwrap();
        assert!(!prev.is_running());
        assert!(next.is_running());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn noop_commands_produce_no_events() {
        let prev = TimerEngine::default();
        let (next, events) = reduce(&prev, Command::Pause, t0()).unwrap();
        assert_eq!(next, prev);
        assert!(events.is_empty());
    }

    #[test]
    fn blank_task_name_is_rejected() {
        let prev = TimerEngine::default();
        let err = reduce(
            &prev,
            Command::AddTask {
                name: "  ".into(),
                category: None,
            },
            t0(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn commands_deserialize_from_tagged_json() {
        let cmd: Command =
            serde_json::from_str(r#"{"command":"set_mode","mode":"long_break"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::SetMode {
                mode: Mode::LongBreak
            }
        );
    }
}
