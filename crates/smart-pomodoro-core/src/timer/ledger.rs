//! Per-task timer ledger.
//!
//! Every task keeps its own work countdown and break countdown, independent
//! of whichever mode is globally active. Switching tasks or modes saves the
//! outgoing `(task, mode)` slot and loads the incoming one, so no task ever
//! loses progress because another one was selected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::mode::{Durations, Mode};
use crate::task::TaskId;

/// Saved work countdown for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub seconds_left: u64,
    pub running: bool,
}

/// Saved break countdown for one task. Remembers which kind of break it
/// belongs to so a half-used short break is never resumed as a long one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakSlot {
    pub mode: Mode,
    pub seconds_left: u64,
    pub running: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTimers {
    #[serde(default)]
    pub work: Option<Slot>,
    #[serde(default, rename = "break")]
    pub rest: Option<BreakSlot>,
    /// Work time left at the moment a break was started; handed back to
    /// the work countdown when the break ends.
    #[serde(default)]
    pub resume_work_secs: Option<u64>,
}

impl TaskTimers {
    pub fn work_running(&self) -> bool {
        self.work.is_some_and(|s| s.running)
    }

    pub fn break_running(&self) -> bool {
        self.rest.is_some_and(|s| s.running)
    }

    fn stop(&mut self) {
        if let Some(w) = self.work.as_mut() {
            w.running = false;
        }
        if let Some(b) = self.rest.as_mut() {
            b.running = false;
        }
    }
}

/// Task id → saved timers. Entries are dropped together with their task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskLedger {
    entries: BTreeMap<TaskId, TaskTimers>,
}

impl TaskLedger {
    pub fn get(&self, task: &str) -> Option<&TaskTimers> {
        self.entries.get(task)
    }

    pub fn contains(&self, task: &str) -> bool {
        self.entries.contains_key(task)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TaskId, &TaskTimers)> {
        self.entries.iter()
    }

    pub(crate) fn entry_mut(&mut self, task: &str) -> &mut TaskTimers {
        self.entries.entry(task.to_string()).or_default()
    }

    pub fn work_running(&self, task: &str) -> bool {
        self.get(task).is_some_and(TaskTimers::work_running)
    }

    pub(crate) fn save_work(&mut self, task: &str, seconds_left: u64, running: bool) {
        self.entry_mut(task).work = Some(Slot {
            seconds_left,
            running,
        });
    }

    pub(crate) fn save_break(&mut self, task: &str, mode: Mode, seconds_left: u64, running: bool) {
        self.entry_mut(task).rest = Some(BreakSlot {
            mode,
            seconds_left,
            running,
        });
    }

    /// Work slot for `task` as it should look when work mode is entered.
    /// A pending resume value (saved when a break was started) wins over
    /// the stored slot; a task never seen before gets the full work
    /// duration, not running.
    pub(crate) fn load_work(&mut self, task: &str, durations: &Durations) -> Slot {
        let entry = self.entry_mut(task);
        let running = entry.work_running();
        let slot = match entry.resume_work_secs.take() {
            Some(seconds_left) => Slot {
                seconds_left,
                running,
            },
            None => entry.work.unwrap_or(Slot {
                seconds_left: durations.work_secs,
                running: false,
            }),
        };
        entry.work = Some(slot);
        slot
    }

    /// Saved break slot for `task` in `mode`. A missing slot, or one saved
    /// for the other kind of break, is replaced by a fresh full-length one.
    pub(crate) fn load_break(&mut self, task: &str, mode: Mode, durations: &Durations) -> BreakSlot {
        let entry = self.entry_mut(task);
        match entry.rest {
            Some(slot) if slot.mode == mode => slot,
            _ => {
                let fresh = BreakSlot {
                    mode,
                    seconds_left: durations.for_mode(mode),
                    running: false,
                };
                entry.rest = Some(fresh);
                fresh
            }
        }
    }

    /// A break that was taken and then left is thrown away once work runs
    /// again; the next visit to that break starts from its full length.
    pub(crate) fn discard_interrupted_break(&mut self, task: &str, durations: &Durations) {
        if let Some(b) = self.entry_mut(task).rest.as_mut() {
            if b.running {
                *b = BreakSlot {
                    mode: b.mode,
                    seconds_left: durations.for_mode(b.mode),
                    running: false,
                };
            }
        }
    }

    pub(crate) fn remove(&mut self, task: &str) -> Option<TaskTimers> {
        self.entries.remove(task)
    }

    /// Clears every running flag.
    pub(crate) fn stop_all(&mut self) {
        self.entries.values_mut().for_each(TaskTimers::stop);
    }

    /// Re-bases saved values after the durations changed: a slot that sat at
    /// the old full length moves to the new full length, anything else is
    /// capped at the new length.
    pub(crate) fn rescale(&mut self, old: &Durations, new: &Durations) {
        let rebase = |secs: u64, mode: Mode| {
            let (old_full, new_full) = (old.for_mode(mode), new.for_mode(mode));
            if secs == old_full {
                new_full
            } else {
                secs.min(new_full)
            }
        };
        for timers in self.entries.values_mut() {
            if let Some(w) = timers.work.as_mut() {
                w.seconds_left = rebase(w.seconds_left, Mode::Work);
            }
            if let Some(b) = timers.rest.as_mut() {
                b.seconds_left = rebase(b.seconds_left, b.mode);
            }
            if let Some(r) = timers.resume_work_secs.as_mut() {
                *r = rebase(*r, Mode::Work);
            }
        }
    }

    /// Drops entries whose task no longer exists.
    pub(crate) fn retain_tasks<F: Fn(&str) -> bool>(&mut self, keep: F) {
        self.entries.retain(|id, _| keep(id));
    }
}
