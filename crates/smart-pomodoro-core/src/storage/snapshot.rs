//! Loading and saving the timer state blob.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::StorageError;
use crate::timer::{Durations, TimerEngine};

/// Key-value backend for the serialized timer state.
pub trait StateStore {
    /// # Errors
    /// Returns an error if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    /// Returns an error if the backend cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process store, used by tests and by callers that opt out of disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one value.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        if let Ok(mut values) = store.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        store
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self
            .values
            .lock()
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: StateStore + ?Sized> StateStore for &S {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }
}

/// Read the persisted engine from `store`.
///
/// A missing, unreadable or corrupt blob yields a fresh engine built from
/// `defaults`. Whatever is loaded comes back stopped.
pub fn load_snapshot<S: StateStore + ?Sized>(
    store: &S,
    key: &str,
    defaults: Durations,
) -> TimerEngine {
    let raw = match store.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "no saved state, starting fresh");
            return TimerEngine::new(defaults);
        }
        Err(e) => {
            warn!(key, error = %e, "failed to read saved state, starting fresh");
            return TimerEngine::new(defaults);
        }
    };
    match serde_json::from_str::<TimerEngine>(&raw) {
        Ok(engine) => engine.restored(),
        Err(e) => {
            warn!(key, error = %e, "saved state is corrupt, starting fresh");
            TimerEngine::new(defaults)
        }
    }
}

/// Serialize `engine` and write it under `key`.
///
/// # Errors
/// Returns an error if serialization or the backend write fails.
pub fn save_snapshot<S: StateStore + ?Sized>(
    store: &S,
    key: &str,
    engine: &TimerEngine,
) -> Result<(), StorageError> {
    let raw =
        serde_json::to_string(engine).map_err(|e| StorageError::QueryFailed(e.to_string()))?;
    store.save(key, &raw)
}
