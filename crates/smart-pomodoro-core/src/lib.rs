//! # Smart Pomodoro Core Library
//!
//! This library provides the core business logic for the Smart Pomodoro timer.
//! Every operation is reachable from the standalone CLI binary; any other
//! front end is a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine that requires the caller
//!   to periodically dispatch `Tick` for progress updates
//! - **Task Ledger**: Independent work and break countdowns for every task
//! - **Store**: Owns the live state, persists it and notifies subscribers
//! - **Driver**: A tokio task that feeds ticks and serialises UI commands
//! - **Storage**: SQLite key-value persistence and TOML-based configuration
//! - **Stats**: Today's focus summary and a seven-day report
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`PomodoroStore`]: Command dispatch, persistence and subscriptions
//! - [`TimerDriver`]: Background tick loop
//! - [`Database`]: State persistence
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod driver;
pub mod error;
pub mod events;
pub mod session;
pub mod stats;
pub mod storage;
pub mod store;
pub mod task;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{TimerDriver, TimerHandle};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use session::{Session, SessionHistory, SessionType};
pub use stats::{report, today_stats, Report, TodayStats};
pub use storage::{Config, Database, MemoryStore, StateStore};
pub use store::{PomodoroStore, SubscriptionId};
pub use task::{Task, TaskId, TaskRegistry};
pub use timer::{reduce, Command, Durations, Mode, TimerEngine};
