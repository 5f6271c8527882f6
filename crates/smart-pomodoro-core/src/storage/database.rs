//! SQLite-backed key-value storage.
//!
//! The timer state is persisted as one JSON blob under a single key, so the
//! schema is just a `kv` table. Each row also records when it was last
//! written, which the CLI shows in `timer status`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use super::snapshot::StateStore;
use crate::error::StorageError;

/// SQLite database holding the persisted state blob.
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// File backing this database, `None` for in-memory ones.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Open the database at `~/.config/smart-pomodoro/smart-pomodoro.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(&data_dir()?.join("smart-pomodoro.db"))
    }

    /// Open (or create) the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let db = Self { conn, path: None };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Remove a key. Returns whether it existed.
    pub fn kv_delete(&self, key: &str) -> Result<bool, rusqlite::Error> {
        let n = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(n > 0)
    }

    /// When `key` was last written.
    pub fn kv_updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
        let raw: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT updated_at FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(raw
            .flatten()
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }
}

impl StateStore for Database {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.kv_get(key)?)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(self.kv_set(key, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "again");
        assert!(db.kv_updated_at("test").unwrap().is_some());
    }

    #[test]
    fn kv_delete_reports_presence() {
        let db = Database::open_memory().unwrap();
        db.kv_set("k", "v").unwrap();
        assert!(db.kv_delete("k").unwrap());
        assert!(!db.kv_delete("k").unwrap());
        assert!(db.kv_get("k").unwrap().is_none());
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.save("blob", "{}").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.load("blob").unwrap().as_deref(), Some("{}"));
        assert_eq!(db.path(), Some(path.as_path()));
    }
}
