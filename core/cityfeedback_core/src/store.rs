use rusqlite::{Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::HashMap,
    path::Path,
    sync::{Mutex, PoisonError},
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::warn;

pub const SETTINGS_KEY: &str = "city-feedback.settings";
pub const LICENSE_KEY: &str = "city-feedback.license";
pub const SESSION_KEY: &str = "city-feedback.auth";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialize {key}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },

    #[error("store lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for StoreError {
    fn from(_: PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}

/// String-keyed blob storage. Each call is atomic on its own; there are no
/// multi-key transactions.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

CREATE TABLE IF NOT EXISTS kv_store (
  key TEXT PRIMARY KEY,
  value_json TEXT NOT NULL,
  updated_at TEXT NOT NULL
);
"#,
    )
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock()?;
        let value = conn
            .query_row(
                "SELECT value_json FROM kv_store WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let updated_at = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
        let conn = self.conn.lock()?;
        conn.execute(
            r#"
INSERT INTO kv_store (key, value_json, updated_at)
VALUES (?1, ?2, ?3)
ON CONFLICT(key) DO UPDATE SET
  value_json=excluded.value_json,
  updated_at=excluded.updated_at
            "#,
            (key, value, updated_at),
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// Volatile store, used by tests and `--db :memory:` style runs.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock()?.remove(key);
        Ok(())
    }
}

/// Reads and decodes a JSON blob. Absent keys, undecodable blobs and storage
/// failures all come back as `None`; callers substitute their defaults.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!("store read {key} failed: {err}");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(err) => {
            warn!("stored {key} is not valid json, using defaults: {err}");
            None
        }
    }
}

pub fn write_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.put(key, &raw)
}
