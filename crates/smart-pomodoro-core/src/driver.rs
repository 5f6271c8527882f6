//! Background tick driver.
//!
//! Runs a [`PomodoroStore`] on its own tokio task. UI commands arrive over
//! an mpsc channel; an interval timer feeds `Tick` while the engine is
//! running. Pending commands are always drained before the next tick, so a
//! user action is never reordered behind a tick that was already due.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::storage::StateStore;
use crate::store::PomodoroStore;
use crate::timer::{Command, TimerEngine};

const CHANNEL_CAPACITY: usize = 64;
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

type CommandReply = oneshot::Sender<Result<Vec<Event>, ValidationError>>;

enum Request {
    Command {
        command: Command,
        reply: Option<CommandReply>,
    },
    Snapshot(oneshot::Sender<TimerEngine>),
    Shutdown,
}

/// Cloneable handle to a running driver.
#[derive(Clone)]
pub struct TimerHandle {
    tx: mpsc::Sender<Request>,
}

impl TimerHandle {
    /// Dispatch `command` and wait for its events.
    ///
    /// # Errors
    /// Returns the command's validation error, or
    /// [`CoreError::DriverStopped`] if the driver is gone.
    pub async fn send(&self, command: Command) -> Result<Vec<Event>, CoreError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Command {
                command,
                reply: Some(reply),
            })
            .await
            .map_err(|_| CoreError::DriverStopped)?;
        Ok(rx.await.map_err(|_| CoreError::DriverStopped)??)
    }

    /// Queue `command` without waiting for the result.
    ///
    /// # Errors
    /// Returns [`CoreError::DriverStopped`] if the driver is gone.
    pub async fn post(&self, command: Command) -> Result<(), CoreError> {
        self.tx
            .send(Request::Command {
                command,
                reply: None,
            })
            .await
            .map_err(|_| CoreError::DriverStopped)
    }

    /// Copy of the current engine state.
    ///
    /// # Errors
    /// Returns [`CoreError::DriverStopped`] if the driver is gone.
    pub async fn snapshot(&self) -> Result<TimerEngine, CoreError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Snapshot(reply))
            .await
            .map_err(|_| CoreError::DriverStopped)?;
        rx.await.map_err(|_| CoreError::DriverStopped)
    }

    /// Ask the driver to pause and stop after the commands already queued.
    ///
    /// # Errors
    /// Returns [`CoreError::DriverStopped`] if the driver is already gone.
    pub async fn shutdown(&self) -> Result<(), CoreError> {
        self.tx
            .send(Request::Shutdown)
            .await
            .map_err(|_| CoreError::DriverStopped)
    }
}

pub struct TimerDriver;

impl TimerDriver {
    /// Move `store` onto a new tokio task ticking every `tick_interval`
    /// (at least one millisecond).
    ///
    /// The join handle yields the store back once the driver stops, either
    /// through [`TimerHandle::shutdown`] or when every handle is dropped.
    /// Either way the timer is paused first.
    pub fn spawn<S, C>(
        store: PomodoroStore<S, C>,
        tick_interval: Duration,
    ) -> (TimerHandle, JoinHandle<PomodoroStore<S, C>>)
    where
        S: StateStore + Send + 'static,
        C: Clock + 'static,
    {
        let tick_interval = tick_interval.max(MIN_TICK_INTERVAL);
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let join = tokio::spawn(run(store, rx, tick_interval));
        (TimerHandle { tx }, join)
    }
}

async fn run<S, C>(
    mut store: PomodoroStore<S, C>,
    mut rx: mpsc::Receiver<Request>,
    tick_interval: Duration,
) -> PomodoroStore<S, C>
where
    S: StateStore,
    C: Clock,
{
    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(interval_ms = tick_interval.as_millis() as u64, "timer driver started");

    loop {
        tokio::select! {
            biased;

            request = rx.recv() => match request {
                Some(Request::Command { command, reply }) => {
                    debug!(?command, "dispatching");
                    let result = store.dispatch(command);
                    if let Err(e) = &result {
                        warn!(error = %e, "command rejected");
                    }
                    if let Some(reply) = reply {
                        let _ = reply.send(result);
                    }
                }
                Some(Request::Snapshot(reply)) => {
                    let _ = reply.send(store.state().clone());
                }
                Some(Request::Shutdown) | None => {
                    // Settle the countdown, then pause so it is persisted stopped.
                    let _ = store.dispatch(Command::Tick);
                    let _ = store.dispatch(Command::Pause);
                    break;
                }
            },

            _ = ticker.tick() => {
                if store.state().is_running() {
                    // Tick never fails validation.
                    let _ = store.dispatch(Command::Tick);
                }
            }
        }
    }

    info!("timer driver stopped");
    store
}
