pub mod config;
pub mod stats;
pub mod task;
pub mod timer;

use serde::Serialize;
use smart_pomodoro_core::{Config, Database, PomodoroStore, SystemClock};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub type Store = PomodoroStore<Database, SystemClock>;

/// Open the persisted timer state under the configured storage key.
pub fn open_store(config: &Config) -> CliResult<Store> {
    let db = Database::open()?;
    tracing::debug!(key = %config.storage_key, db = ?db.path(), "opening timer state");
    Ok(PomodoroStore::open(
        db,
        SystemClock,
        config.storage_key.clone(),
        config.durations(),
    ))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
