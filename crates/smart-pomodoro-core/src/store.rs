//! Single owner of the live timer state.
//!
//! Every UI action and every tick goes through [`PomodoroStore::dispatch`]:
//! the command is applied to the current snapshot, the result is persisted
//! if anything changed, and subscribers are told about the new state.

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::{StorageError, ValidationError};
use crate::events::Event;
use crate::storage::{load_snapshot, save_snapshot, StateStore};
use crate::timer::{reduce, Command, Durations, TimerEngine};

/// Handle returned by [`PomodoroStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&TimerEngine, &[Event]) + Send>;

pub struct PomodoroStore<S, C> {
    engine: TimerEngine,
    backend: S,
    clock: C,
    key: String,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl<S: StateStore, C: Clock> PomodoroStore<S, C> {
    /// Restore the engine saved under `key`, or start fresh from `defaults`.
    pub fn open(backend: S, clock: C, key: impl Into<String>, defaults: Durations) -> Self {
        let key = key.into();
        let engine = load_snapshot(&backend, &key, defaults);
        Self::with_engine(engine, backend, clock, key)
    }

    pub fn with_engine(engine: TimerEngine, backend: S, clock: C, key: impl Into<String>) -> Self {
        Self {
            engine,
            backend,
            clock,
            key: key.into(),
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn state(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Apply `command` at the clock's current instant.
    ///
    /// A failed save is logged and otherwise ignored; the in-memory state
    /// stays authoritative.
    ///
    /// # Errors
    /// Returns the validation error of a rejected command. State is left
    /// untouched in that case.
    pub fn dispatch(&mut self, command: Command) -> Result<Vec<Event>, ValidationError> {
        let now = self.clock.now();
        let (next, events) = reduce(&self.engine, command, now)?;
        if next == self.engine {
            return Ok(events);
        }
        self.engine = next;
        if let Err(e) = self.persist() {
            warn!(key = %self.key, error = %e, "failed to persist timer state");
        }
        for (_, listener) in &mut self.listeners {
            listener(&self.engine, &events);
        }
        Ok(events)
    }

    /// Write the current state to the backend.
    ///
    /// # Errors
    /// Returns an error if serialization or the backend write fails.
    pub fn persist(&self) -> Result<(), StorageError> {
        save_snapshot(&self.backend, &self.key, &self.engine)
    }

    /// Register a callback run after every state change.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&TimerEngine, &[Event]) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        debug!(subscribers = self.listeners.len(), "subscriber added");
        id
    }

    /// Returns whether `id` was subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        before != self.listeners.len()
    }

    /// Current state as a [`Event::StateSnapshot`].
    pub fn snapshot(&self) -> Event {
        self.engine.snapshot(self.clock.now())
    }
}
