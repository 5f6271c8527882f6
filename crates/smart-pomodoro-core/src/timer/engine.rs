//! Session timer state machine.
//!
//! The engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically (nominally once per second while running) and for passing
//! the current instant into every command.
//!
//! ## Mode rotation
//!
//! ```text
//! work --(done)--> short_break --(done)--> work --(done)--> ... --(4th done)--> long_break
//! ```
//!
//! Natural completion records a [`Session`] and switches mode; manual
//! `set_mode` never does.
//!
//! ## Per-task timers
//!
//! Every task keeps its own work and break countdowns in the
//! [`TaskLedger`]. Switching task or mode saves the outgoing slot and
//! loads the incoming one. A task's work countdown keeps running in the
//! background while the break screen is shown, until the break itself is
//! started.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(Durations::default());
//! engine.start(clock.now());
//! // In a loop:
//! engine.tick(clock.now()); // Returns Some(Event) when an interval completes
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ledger::{Slot, TaskLedger, TaskTimers};
use super::mode::{Durations, Mode};
use crate::events::Event;
use crate::session::{Session, SessionHistory};
use crate::task::{Task, TaskRegistry};

/// Core timer engine together with everything it needs to persist.
///
/// Serialized as a single blob by the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerEngine {
    mode: Mode,
    seconds_left: u64,
    is_running: bool,
    /// Instant the countdown was last advanced to. Set iff running.
    #[serde(default)]
    last_tick: Option<DateTime<Utc>>,
    #[serde(default)]
    completed_work_sessions: u32,
    #[serde(default)]
    durations: Durations,
    #[serde(default)]
    tasks: TaskRegistry,
    #[serde(default)]
    sessions: SessionHistory,
    #[serde(default)]
    ledger: TaskLedger,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(Durations::default())
    }
}

impl TimerEngine {
    /// Fresh engine in work mode with a full, stopped countdown.
    pub fn new(durations: Durations) -> Self {
        let durations = durations.sanitized();
        Self {
            mode: Mode::Work,
            seconds_left: durations.work_secs,
            is_running: false,
            last_tick: None,
            completed_work_sessions: 0,
            durations,
            tasks: TaskRegistry::default(),
            sessions: SessionHistory::default(),
            ledger: TaskLedger::default(),
        }
    }

    /// Normalise a snapshot that was just read back from storage.
    ///
    /// No tick can have happened while the process was down, so every
    /// running flag is cleared. Dangling task references and out-of-range
    /// countdowns are repaired.
    pub fn restored(mut self) -> Self {
        self.is_running = false;
        self.last_tick = None;
        self.durations = self.durations.sanitized();
        self.tasks.revalidate();
        let tasks = &self.tasks;
        self.ledger.retain_tasks(|id| tasks.contains(id));
        self.ledger.stop_all();
        self.ledger.rescale(&self.durations, &self.durations);
        self.seconds_left = self.seconds_left.min(self.total_secs());
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn seconds_left(&self) -> u64 {
        self.seconds_left
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn last_tick(&self) -> Option<DateTime<Utc>> {
        self.last_tick
    }

    pub fn completed_work_sessions(&self) -> u32 {
        self.completed_work_sessions
    }

    pub fn durations(&self) -> &Durations {
        &self.durations
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    pub fn sessions(&self) -> &SessionHistory {
        &self.sessions
    }

    pub fn ledger(&self) -> &TaskLedger {
        &self.ledger
    }

    pub fn active_task_id(&self) -> Option<&str> {
        self.tasks.active_id()
    }

    /// Configured length of the current mode.
    pub fn total_secs(&self) -> u64 {
        self.durations.for_mode(self.mode)
    }

    /// 0.0 .. 1.0 progress within the current interval.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.seconds_left as f64 / total as f64)
    }

    /// The break screen is shown but the active task's work countdown is
    /// still running underneath it.
    pub fn work_in_background(&self) -> bool {
        self.mode.is_break()
            && self
                .tasks
                .active_id()
                .is_some_and(|id| self.ledger.work_running(id))
    }

    /// The displayed countdown is consuming time.
    pub fn countdown_running(&self) -> bool {
        self.is_running && !self.work_in_background()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, at: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            seconds_left: self.seconds_left,
            total_secs: self.total_secs(),
            is_running: self.is_running,
            active_task_id: self.active_task_id().map(str::to_string),
            completed_work_sessions: self.completed_work_sessions,
            at,
        }
    }

    /// Checks the structural invariants of a snapshot.
    ///
    /// # Errors
    /// Returns a description of the first violated invariant.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.is_running != self.last_tick.is_some() {
            return Err(format!(
                "is_running={} but last_tick={:?}",
                self.is_running, self.last_tick
            ));
        }
        if self.seconds_left > self.total_secs() {
            return Err(format!(
                "seconds_left {} exceeds {} for {}",
                self.seconds_left,
                self.total_secs(),
                self.mode
            ));
        }
        for (id, timers) in self.ledger.iter() {
            if !self.tasks.contains(id) {
                return Err(format!("ledger entry for unknown task {id}"));
            }
            if timers.work_running() && timers.break_running() {
                return Err(format!("task {id} runs work and break at once"));
            }
            // A break slot may stay flagged after it was left: the break was
            // taken but interrupted. Only a running work slot must be live.
            let active = self.tasks.active_id() == Some(id.as_str());
            if !active && timers.work_running() {
                return Err(format!("inactive task {id} is running"));
            }
            if active && timers.work_running() && !self.is_running {
                return Err(format!("task {id} runs while the engine is stopped"));
            }            if let Some(w) = timers.work {
                if w.seconds_left > self.durations.work_secs {
                    return Err(format!("task {id} work slot out of range"));
                }
            }
            if let Some(b) = timers.rest {
                if b.seconds_left > self.durations.for_mode(b.mode) {
                    return Err(format!("task {id} break slot out of range"));
                }
            }
        }
        Ok(())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the displayed countdown. No-op if it is already running.
    ///
    /// In a break mode this is the moment the break is taken: the active
    /// task's work countdown is stopped and its remaining time kept for
    /// when the break ends.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.countdown_running() {
            return None;
        }
        if let Some(id) = self.tasks.active_id() {
            if self.mode.is_break() {
                let timers = self.ledger.entry_mut(id);
                let work_left = timers
                    .work
                    .map_or(self.durations.work_secs, |w| w.seconds_left);
                timers.resume_work_secs = Some(work_left);
                if let Some(w) = timers.work.as_mut() {
                    w.running = false;
                }
                self.ledger
                    .save_break(id, self.mode, self.seconds_left, true);
            } else {
                self.ledger.discard_interrupted_break(id, &self.durations);
                self.ledger.save_work(id, self.seconds_left, true);
            }
        }
        self.is_running = true;
        self.last_tick = Some(now);
        tracing::debug!(mode = %self.mode, seconds_left = self.seconds_left, "timer started");
        Some(Event::TimerStarted {
            mode: self.mode,
            seconds_left: self.seconds_left,
            task_id: self.active_task_id().map(str::to_string),
            at: now,
        })
    }

    /// Stop everything that is ticking and save the countdown into the
    /// active task's slot for the current mode.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        if let Some(id) = self.tasks.active_id() {
            if self.mode.is_break() {
                if let Some(w) = self.ledger.entry_mut(id).work.as_mut() {
                    w.running = false;
                }
                self.ledger
                    .save_break(id, self.mode, self.seconds_left, false);
            } else {
                self.ledger.save_work(id, self.seconds_left, false);
            }
        }
        self.is_running = false;
        self.last_tick = None;
        tracing::debug!(mode = %self.mode, seconds_left = self.seconds_left, "timer paused");
        Some(Event::TimerPaused {
            mode: self.mode,
            seconds_left: self.seconds_left,
            at: now,
        })
    }

    /// Refill the current mode's countdown and stop. Mode and the
    /// completed-session counter are untouched.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let full = self.total_secs();
        self.seconds_left = full;
        self.is_running = false;
        self.last_tick = None;
        if let Some(id) = self.tasks.active_id() {
            let timers = self.ledger.entry_mut(id);
            if self.mode.is_break() {
                if let Some(w) = timers.work.as_mut() {
                    w.running = false;
                }
                self.ledger.save_break(id, self.mode, full, false);
            } else {
                if let Some(b) = timers.rest.as_mut() {
                    b.running = false;
                }
                self.ledger.save_work(id, full, false);
            }
        }
        tracing::debug!(mode = %self.mode, "timer reset");
        Some(Event::TimerReset {
            mode: self.mode,
            seconds_left: full,
            at: now,
        })
    }

    /// Advance by the whole seconds elapsed since the last tick. The
    /// fractional part is dropped and `last_tick` always moves to `now`.
    ///
    /// Returns `Some(Event::IntervalCompleted)` when the countdown reaches
    /// zero. At most one interval boundary is resolved per call; surplus
    /// elapsed time beyond that boundary is dropped. A clock that went
    /// backwards counts as zero elapsed time.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return None;
        };
        if now < last {
            tracing::debug!(%now, %last, "clock moved backwards; rebasing");
        }
        self.last_tick = Some(now);
        let elapsed = (now - last).num_seconds();
        if elapsed <= 0 {
            return None;
        }
        let elapsed = elapsed.unsigned_abs();

        if self.work_in_background() {
            if let Some(id) = self.tasks.active_id() {
                if let Some(w) = self.ledger.entry_mut(id).work.as_mut() {
                    w.seconds_left = w.seconds_left.saturating_sub(elapsed);
                }
            }
            return None;
        }

        self.seconds_left = self.seconds_left.saturating_sub(elapsed);
        self.save_active_slot(true);
        if self.seconds_left == 0 {
            return Some(self.complete(now));
        }
        None
    }

    /// Manual switch between work, short break and long break. Never
    /// records a session.
    pub fn set_mode(&mut self, target: Mode, now: DateTime<Utc>) -> Option<Event> {
        if target == self.mode {
            return None;
        }
        let from = self.mode;
        match self.tasks.active_id().map(str::to_string) {
            None => {
                self.mode = target;
                self.seconds_left = self.total_secs();
                self.is_running = false;
            }
            Some(id) => {
                if from.is_break() {
                    // A break that was taken stays taken until work starts again.
                    let taken = self.countdown_running()
                        || self.ledger.get(&id).is_some_and(TaskTimers::break_running);
                    self.ledger.save_break(&id, from, self.seconds_left, taken);
                } else {
                    // A running work countdown keeps going in the background.
                    self.ledger
                        .save_work(&id, self.seconds_left, self.is_running);
                }
                self.mode = target;
                if target.is_break() {
                    let slot = self.ledger.load_break(&id, target, &self.durations);
                    self.seconds_left = slot.seconds_left;
                    self.is_running = self.ledger.work_running(&id);
                } else {
                    let slot = self.ledger.load_work(&id, &self.durations);
                    self.seconds_left = slot.seconds_left;
                    self.is_running = slot.running;
                }
            }
        }
        self.last_tick = if self.is_running {
            self.last_tick.or(Some(now))
        } else {
            None
        };
        tracing::debug!(%from, to = %target, seconds_left = self.seconds_left, "mode changed");
        Some(Event::ModeChanged {
            from,
            to: target,
            seconds_left: self.seconds_left,
            at: now,
        })
    }

    /// Replace the configured interval lengths (minutes in, seconds
    /// stored, one-minute floor). Stops every timer.
    pub fn set_durations(
        &mut self,
        work_minutes: u64,
        short_break_minutes: u64,
        long_break_minutes: u64,
        now: DateTime<Utc>,
    ) -> Option<Event> {
        let old = self.durations;
        let new = Durations::from_minutes(work_minutes, short_break_minutes, long_break_minutes);
        let (old_full, new_full) = (old.for_mode(self.mode), new.for_mode(self.mode));
        self.durations = new;
        self.seconds_left = if self.seconds_left == old_full {
            new_full
        } else {
            self.seconds_left.min(new_full)
        };
        self.is_running = false;
        self.last_tick = None;
        self.ledger.rescale(&old, &new);
        self.ledger.stop_all();
        self.save_active_slot(false);
        tracing::info!(
            work = new.work_secs,
            short_break = new.short_break_secs,
            long_break = new.long_break_secs,
            "durations changed"
        );
        Some(Event::DurationsChanged {
            durations: new,
            at: now,
        })
    }

    /// Register a task. The first task added while none is active becomes
    /// active and takes over the current countdown.
    pub fn add_task(&mut self, task: Task, now: DateTime<Utc>) -> Option<Event> {
        if self.tasks.contains(&task.id) {
            return None;
        }
        let (task_id, name) = (task.id.clone(), task.name.clone());
        self.tasks.insert(task);
        if self.tasks.active_id().is_none() {
            self.tasks.set_active(Some(&task_id));
            let running = self.countdown_running();
            self.save_active_slot(running);
        }
        tracing::info!(%task_id, %name, "task added");
        Some(Event::TaskAdded {
            task_id,
            name,
            at: now,
        })
    }

    /// Make `id` the active task. Stale or unknown ids are ignored.
    ///
    /// The outgoing task's countdown is saved and stopped; the incoming
    /// task's saved countdown for the current mode is loaded. Whether the
    /// displayed countdown was running carries over to the new task.
    pub fn set_active_task(&mut self, id: &str, now: DateTime<Utc>) -> Option<Event> {
        if !self.tasks.contains(id) || self.tasks.active_id() == Some(id) {
            return None;
        }
        let carry = self.countdown_running();
        let from = self.tasks.active_id().map(str::to_string);
        if let Some(prev) = from.as_deref() {
            self.save_active_slot(false);
            if let Some(w) = self.ledger.entry_mut(prev).work.as_mut() {
                w.running = false;
            }
        }
        self.tasks.set_active(Some(id));
        if self.mode.is_break() {
            let slot = self.ledger.load_break(id, self.mode, &self.durations);
            self.seconds_left = slot.seconds_left;
        } else {
            let slot = self.ledger.load_work(id, &self.durations);
            self.seconds_left = slot.seconds_left;
            if carry {
                self.ledger.discard_interrupted_break(id, &self.durations);
            }
        }
        self.is_running = carry;
        self.save_active_slot(carry);
        self.last_tick = if carry {
            self.last_tick.or(Some(now))
        } else {
            None
        };
        tracing::debug!(from = ?from, to = %id, seconds_left = self.seconds_left, "active task changed");
        Some(Event::ActiveTaskChanged {
            from,
            to: Some(id.to_string()),
            seconds_left: self.seconds_left,
            at: now,
        })
    }

    /// Delete a task and its ledger entry. Removing the active task stops
    /// the countdown and hands the active slot to the first remaining task.
    pub fn remove_task(&mut self, id: &str, now: DateTime<Utc>) -> Option<Event> {
        let was_active = self.tasks.active_id() == Some(id);
        self.tasks.remove(id)?;
        self.ledger.remove(id);
        if was_active {
            self.is_running = false;
            self.last_tick = None;
            self.seconds_left = match self.tasks.active_id() {
                Some(next) if self.mode.is_break() => {
                    self.ledger.load_break(next, self.mode, &self.durations).seconds_left
                }
                Some(next) => self.ledger.load_work(next, &self.durations).seconds_left,
                None => self.total_secs(),
            };
            self.ledger.stop_all();
        }
        tracing::info!(task_id = %id, was_active, "task removed");
        Some(Event::TaskRemoved {
            task_id: id.to_string(),
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Write the displayed countdown into the active task's slot for the
    /// current mode.
    fn save_active_slot(&mut self, running: bool) {
        let Some(id) = self.tasks.active_id() else {
            return;
        };
        if self.mode.is_break() {
            self.ledger
                .save_break(id, self.mode, self.seconds_left, running);
        } else {
            self.ledger.save_work(id, self.seconds_left, running);
        }
    }

    /// Record the finished interval and rotate to the next mode.
    fn complete(&mut self, now: DateTime<Utc>) -> Event {
        let finished = self.mode;
        let duration = self.durations.minutes_for(finished);
        let session = Session {
            id: Uuid::new_v4().to_string(),
            task_id: self.active_task_id().map(str::to_string),
            start_time: now - Duration::minutes(duration as i64),
            end_time: now,
            duration,
            session_type: finished.into(),
        };
        self.sessions.push(session.clone());

        if finished.is_break() {
            self.mode = Mode::Work;
            match self.tasks.active_id() {
                Some(id) => {
                    self.ledger.entry_mut(id).rest = None;
                    let slot = self.ledger.load_work(id, &self.durations);
                    self.seconds_left = slot.seconds_left;
                    self.is_running = slot.running;
                }
                None => {
                    self.seconds_left = self.durations.work_secs;
                    self.is_running = false;
                }
            }
            if !self.is_running {
                self.last_tick = None;
            }
        } else {
            self.completed_work_sessions = self.completed_work_sessions.saturating_add(1);
            let next = Mode::break_after(self.completed_work_sessions);
            self.mode = next;
            self.seconds_left = self.durations.for_mode(next);
            // The break starts on its own.
            self.is_running = true;
            if let Some(id) = self.tasks.active_id() {
                let work_secs = self.durations.work_secs;
                let timers = self.ledger.entry_mut(id);
                timers.work = Some(Slot {
                    seconds_left: work_secs,
                    running: false,
                });
                timers.resume_work_secs = Some(work_secs);
                self.ledger.save_break(id, next, self.seconds_left, true);
            }
        }

        tracing::info!(
            finished = %finished,
            next = %self.mode,
            duration_min = duration,
            completed = self.completed_work_sessions,
            "interval completed"
        );
        Event::IntervalCompleted {
            session,
            next_mode: self.mode,
            completed_work_sessions: self.completed_work_sessions,
            at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        t0() + Duration::seconds(secs)
    }

    fn with_task(engine: &mut TimerEngine, name: &str) -> String {
        let task = Task::new(name, None, t0()).unwrap();
        let id = task.id.clone();
        engine.add_task(task, t0());
        id
    }

    /// Tick once per second from `from` (exclusive) to `to` (inclusive).
    fn run(engine: &mut TimerEngine, from: i64, to: i64) -> Vec<Event> {
        (from + 1..=to).filter_map(|s| engine.tick(at(s))).collect()
    }

    #[test]
    fn start_pause() {
        let mut engine = TimerEngine::default();
        assert!(!engine.is_running());

        assert!(engine.start(t0()).is_some());
        assert!(engine.is_running());
        assert_eq!(engine.last_tick(), Some(t0()));

        assert!(engine.pause(at(1)).is_some());
        assert!(!engine.is_running());
        assert_eq!(engine.last_tick(), None);
        assert!(engine.pause(at(2)).is_none());
    }

    #[test]
    fn start_twice_is_start_once() {
        let mut once = TimerEngine::default();
        once.start(t0());
        let mut twice = once.clone();
        assert!(twice.start(at(3)).is_none());
        assert_eq!(once, twice);
    }

    #[test]
    fn tick_when_stopped_is_noop() {
        let mut engine = TimerEngine::default();
        let before = engine.clone();
        assert!(engine.tick(at(100)).is_none());
        assert_eq!(engine, before);
    }

    #[test]
    fn sub_second_tick_only_moves_last_tick() {
        let mut engine = TimerEngine::default();
        engine.start(t0());
        let before = engine.clone();
        let now = t0() + Duration::milliseconds(400);
        assert!(engine.tick(now).is_none());
        assert_eq!(engine.seconds_left(), before.seconds_left());
        assert_eq!(engine.last_tick(), Some(now));
    }

    #[test]
    fn fractional_seconds_are_dropped() {
        let mut engine = TimerEngine::default();
        engine.start(t0());
        engine.tick(t0() + Duration::milliseconds(600));
        assert_eq!(engine.seconds_left(), 1500);
        assert_eq!(engine.last_tick(), Some(t0() + Duration::milliseconds(600)));
        engine.tick(t0() + Duration::milliseconds(1500));
        assert_eq!(engine.seconds_left(), 1500);
        engine.tick(t0() + Duration::milliseconds(2100));
        assert_eq!(engine.seconds_left(), 1499);
        assert_eq!(engine.last_tick(), Some(t0() + Duration::milliseconds(2100)));
    }

    #[test]
    fn backward_clock_never_rewinds() {
        let mut engine = TimerEngine::default();
        engine.start(t0());
        engine.tick(at(10));
        assert_eq!(engine.seconds_left(), 1490);
        engine.tick(at(-50));
        assert_eq!(engine.seconds_left(), 1490);
        assert_eq!(engine.last_tick(), Some(at(-50)));
        engine.tick(at(-48));
        assert_eq!(engine.seconds_left(), 1488);
    }

    #[test]
    fn work_completion_records_session_and_autostarts_break() {
        let mut engine = TimerEngine::default();
        engine.start(t0());
        let events = run(&mut engine, 0, 1500);
        assert_eq!(events.len(), 1);
        assert_eq!(engine.sessions().len(), 1);
        let s = engine.sessions().last().unwrap();
        assert!(s.is_work());
        assert_eq!(s.duration, 25);
        assert_eq!(s.task_id, None);
        assert_eq!(s.end_time, at(1500));
        assert_eq!(s.start_time, at(0));
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.completed_work_sessions(), 1);
        assert_eq!(engine.seconds_left(), 300);
        assert!(engine.is_running());
        engine.check_invariants().unwrap();
    }

    #[test]
    fn break_completion_returns_to_stopped_work() {
        let mut engine = TimerEngine::default();
        engine.start(t0());
        run(&mut engine, 0, 1500);
        let events = run(&mut engine, 1500, 1800);
        assert_eq!(events.len(), 1);
        let s = engine.sessions().last().unwrap();
        assert!(!s.is_work());
        assert_eq!(s.duration, 5);
        assert_eq!(engine.mode(), Mode::Work);
        assert_eq!(engine.seconds_left(), 1500);
        assert!(!engine.is_running());
        assert_eq!(engine.completed_work_sessions(), 1);
    }

    #[test]
    fn large_gap_resolves_one_boundary_per_tick() {
        let mut engine = TimerEngine::default();
        engine.start(t0());
        let event = engine.tick(at(10_000));
        assert!(matches!(event, Some(Event::IntervalCompleted { .. })));
        assert_eq!(engine.sessions().len(), 1);
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.seconds_left(), 300);
        // The surplus was dropped; the break needs its own ticks.
        engine.tick(at(10_001));
        assert_eq!(engine.seconds_left(), 299);
    }

    #[test]
    fn session_duration_uses_configured_length() {
        let mut engine = TimerEngine::default();
        engine.start(t0());
        engine.tick(at(1400));
        engine.tick(at(5000));
        assert_eq!(engine.sessions().last().unwrap().duration, 25);
    }

    #[test]
    fn set_mode_never_records_sessions() {
        let mut engine = TimerEngine::default();
        engine.set_mode(Mode::LongBreak, t0());
        engine.set_mode(Mode::Work, t0());
        engine.set_mode(Mode::ShortBreak, t0());
        assert!(engine.sessions().is_empty());
        assert_eq!(engine.completed_work_sessions(), 0);
        assert_eq!(engine.seconds_left(), 300);
    }

    #[test]
    fn set_mode_to_current_mode_is_noop() {
        let mut engine = TimerEngine::default();
        assert!(engine.set_mode(Mode::Work, t0()).is_none());
    }

    #[test]
    fn reset_refills_current_mode() {
        let mut engine = TimerEngine::default();
        let id = with_task(&mut engine, "a");
        engine.start(t0());
        run(&mut engine, 0, 30);
        engine.reset(at(30));
        assert_eq!(engine.seconds_left(), 1500);
        assert!(!engine.is_running());
        let slot = engine.ledger().get(&id).unwrap().work.unwrap();
        assert_eq!(slot.seconds_left, 1500);
        assert!(!slot.running);
        assert_eq!(engine.mode(), Mode::Work);
    }

    #[test]
    fn pause_saves_into_work_slot() {
        let mut engine = TimerEngine::default();
        let id = with_task(&mut engine, "a");
        engine.start(t0());
        run(&mut engine, 0, 42);
        engine.pause(at(42));
        let slot = engine.ledger().get(&id).unwrap().work.unwrap();
        assert_eq!(slot.seconds_left, 1458);
        assert!(!slot.running);
    }

    #[test]
    fn work_keeps_running_behind_break_screen() {
        let mut engine = TimerEngine::default();
        let id = with_task(&mut engine, "a");
        engine.start(t0());
        run(&mut engine, 0, 100);
        engine.set_mode(Mode::ShortBreak, at(100));
        assert_eq!(engine.seconds_left(), 300);
        assert!(engine.is_running());
        assert!(engine.work_in_background());
        assert!(!engine.countdown_running());

        run(&mut engine, 100, 160);
        // The break countdown has not moved, the work countdown has.
        assert_eq!(engine.seconds_left(), 300);
        assert_eq!(engine.ledger().get(&id).unwrap().work.unwrap().seconds_left, 1340);

        engine.set_mode(Mode::Work, at(160));
        assert_eq!(engine.seconds_left(), 1340);
        assert!(engine.is_running());
        engine.check_invariants().unwrap();
    }

    #[test]
    fn starting_break_freezes_work_until_break_ends() {
        let mut engine = TimerEngine::default();
        let id = with_task(&mut engine, "a");
        engine.start(t0());
        run(&mut engine, 0, 100);
        engine.set_mode(Mode::ShortBreak, at(100));
        run(&mut engine, 100, 110);
        assert!(engine.start(at(110)).is_some());
        let timers = engine.ledger().get(&id).unwrap();
        assert!(!timers.work_running());
        assert!(timers.break_running());
        assert_eq!(timers.resume_work_secs, Some(1390));

        run(&mut engine, 110, 410);
        assert_eq!(engine.mode(), Mode::Work);
        assert_eq!(engine.seconds_left(), 1390);
        assert!(!engine.is_running());
        // A manually taken break is still a recorded break.
        assert_eq!(engine.sessions().len(), 1);
        assert_eq!(engine.completed_work_sessions(), 0);
        engine.check_invariants().unwrap();
    }

    #[test]
    fn leaving_break_keeps_it_taken() {
        let mut engine = TimerEngine::default();
        let id = with_task(&mut engine, "a");
        engine.set_mode(Mode::LongBreak, t0());
        engine.start(t0());
        run(&mut engine, 0, 60);
        engine.set_mode(Mode::Work, at(60));
        assert!(!engine.is_running());
        let brk = engine.ledger().get(&id).unwrap().rest.unwrap();
        assert_eq!(brk.seconds_left, 840);
        assert!(brk.running);
        engine.check_invariants().unwrap();

        // Coming back shows the remaining break, stopped until started.
        engine.set_mode(Mode::LongBreak, at(70));
        assert_eq!(engine.seconds_left(), 840);
        assert!(!engine.is_running());
        engine.set_mode(Mode::Work, at(70));
        assert!(engine.ledger().get(&id).unwrap().break_running());
        engine.set_mode(Mode::ShortBreak, at(70));
        assert_eq!(engine.seconds_left(), 300);
    }

    #[test]
    fn starting_work_discards_interrupted_break() {
        let mut engine = TimerEngine::default();
        let id = with_task(&mut engine, "a");
        engine.set_mode(Mode::ShortBreak, t0());
        engine.start(t0());
        engine.tick(at(60));
        assert_eq!(engine.seconds_left(), 240);

        engine.set_mode(Mode::Work, at(60));
        engine.start(at(60));
        let brk = engine.ledger().get(&id).unwrap().rest.unwrap();
        assert_eq!(brk.seconds_left, 300);
        assert!(!brk.running);
        engine.check_invariants().unwrap();

        engine.tick(at(70));
        engine.pause(at(70));
        engine.set_mode(Mode::ShortBreak, at(70));
        assert_eq!(engine.seconds_left(), 300);
        assert!(!engine.is_running());
        engine.check_invariants().unwrap();
    }

    #[test]
    fn idle_break_left_unstarted_is_not_taken() {
        let mut engine = TimerEngine::default();
        let id = with_task(&mut engine, "a");
        engine.set_mode(Mode::ShortBreak, t0());
        engine.set_mode(Mode::Work, at(5));
        assert!(!engine.ledger().get(&id).unwrap().break_running());
    }

    #[test]
    fn switching_tasks_keeps_each_countdown() {
        let mut engine = TimerEngine::default();
        let a = with_task(&mut engine, "a");
        let b = with_task(&mut engine, "b");
        assert_eq!(engine.active_task_id(), Some(a.as_str()));

        engine.start(t0());
        run(&mut engine, 0, 10);
        assert_eq!(engine.seconds_left(), 1490);

        engine.set_active_task(&b, at(10));
        assert_eq!(engine.seconds_left(), 1500);
        run(&mut engine, 10, 20);
        assert_eq!(engine.seconds_left(), 1490);

        engine.set_active_task(&a, at(20));
        assert_eq!(engine.seconds_left(), 1490);
        assert!(engine.is_running());
        let b_slot = engine.ledger().get(&b).unwrap().work.unwrap();
        assert_eq!(b_slot.seconds_left, 1490);
        assert!(!b_slot.running);
        engine.check_invariants().unwrap();
    }

    #[test]
    fn stale_task_id_is_ignored() {
        let mut engine = TimerEngine::default();
        with_task(&mut engine, "a");
        let before = engine.clone();
        assert!(engine.set_active_task("gone", t0()).is_none());
        assert!(engine.remove_task("gone", t0()).is_none());
        assert_eq!(engine, before);
    }

    #[test]
    fn removing_only_active_task_clears_everything() {
        let mut engine = TimerEngine::default();
        let a = with_task(&mut engine, "a");
        engine.start(t0());
        run(&mut engine, 0, 5);
        engine.remove_task(&a, at(5));
        assert_eq!(engine.active_task_id(), None);
        assert!(engine.ledger().is_empty());
        assert!(!engine.is_running());
        assert_eq!(engine.seconds_left(), 1500);
        engine.check_invariants().unwrap();
    }

    #[test]
    fn removing_active_task_promotes_newest_remaining() {
        let mut engine = TimerEngine::default();
        let a = with_task(&mut engine, "a");
        let b = with_task(&mut engine, "b");
        let c = with_task(&mut engine, "c");
        engine.set_active_task(&b, t0());
        engine.start(t0());
        run(&mut engine, 0, 5);
        engine.pause(at(5));
        engine.set_active_task(&a, at(5));
        engine.remove_task(&a, at(5));
        assert_eq!(engine.active_task_id(), Some(c.as_str()));
        assert!(engine.ledger().get(&a).is_none());
        assert_eq!(engine.ledger().get(&b).unwrap().work.unwrap().seconds_left, 1495);
    }

    #[test]
    fn set_durations_resets_full_countdown_and_stops() {
        let mut engine = TimerEngine::default();
        engine.start(t0());
        engine.set_durations(50, 10, 20, t0());
        assert_eq!(engine.seconds_left(), 3000);
        assert!(!engine.is_running());
        assert_eq!(engine.last_tick(), None);
    }

    #[test]
    fn set_durations_caps_partial_countdown() {
        let mut engine = TimerEngine::default();
        engine.start(t0());
        run(&mut engine, 0, 100);
        engine.set_durations(10, 5, 15, at(100));
        assert_eq!(engine.seconds_left(), 600);
        engine.set_durations(0, 0, 0, at(100));
        assert_eq!(engine.durations().work_secs, 60);
        assert_eq!(engine.seconds_left(), 60);
    }

    #[test]
    fn restored_clears_running_state() {
        let mut engine = TimerEngine::default();
        let a = with_task(&mut engine, "a");
        engine.start(t0());
        run(&mut engine, 0, 3);
        let restored = engine.clone().restored();
        assert!(!restored.is_running());
        assert_eq!(restored.last_tick(), None);
        assert!(!restored.ledger().work_running(&a));
        assert_eq!(restored.seconds_left(), 1497);
        restored.check_invariants().unwrap();
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = TimerEngine::default();
        match engine.snapshot(t0()) {
            Event::StateSnapshot {
                mode,
                seconds_left,
                total_secs,
                is_running,
                ..
            } => {
                assert_eq!(mode, Mode::Work);
                assert_eq!(seconds_left, 25 * 60);
                assert_eq!(total_secs, 25 * 60);
                assert!(!is_running);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}
