mod config;
pub mod database;
pub mod snapshot;

pub use config::{Config, DefaultsConfig, DriverConfig, LogConfig, DEFAULT_STORAGE_KEY};
pub use database::Database;
pub use snapshot::{load_snapshot, save_snapshot, MemoryStore, StateStore};

use std::path::PathBuf;

use crate::error::StorageError;

/// Overrides the data directory outright (used by tests and portable installs).
pub const DATA_DIR_ENV: &str = "SMART_POMODORO_DATA_DIR";

/// Returns `~/.config/smart-pomodoro[-dev]/` based on SMART_POMODORO_ENV.
///
/// Set SMART_POMODORO_ENV=dev to use development data directory.
/// SMART_POMODORO_DATA_DIR wins over both.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env =
                std::env::var("SMART_POMODORO_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("smart-pomodoro-dev")
            } else {
                base_dir.join("smart-pomodoro")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
