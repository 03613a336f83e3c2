//! Durable key-value store
//!
//! A single SQLite table standing in for browser local storage: string keys,
//! JSON string values, read once at startup and appended to after each
//! successful exchange.

mod schema;

pub use schema::{Entry, HistoryFormat, SCHEMA};

use crate::state_machine::state::Message;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Corrupt value under '{key}': {source}")]
    Codec {
        key: String,
        source: serde_json::Error,
    },
    #[error("Store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Thread-safe store handle
#[derive(Clone)]
pub struct KvStore {
    conn: Arc<Mutex<Connection>>,
}

impl KvStore {
    /// Open or create the store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory store (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn get(&self, key: &str) -> StoreResult<Option<Entry>> {
        let conn = self.lock()?;
        Self::get_with(&conn, key)
    }

    pub fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.lock()?;
        Self::set_with(&conn, key, value)
    }

    fn get_with(conn: &Connection, key: &str) -> StoreResult<Option<Entry>> {
        let entry = conn
            .query_row(
                "SELECT key, value, updated_at FROM kv WHERE key = ?1",
                params![key],
                |row| {
                    Ok(Entry {
                        key: row.get(0)?,
                        value: row.get(1)?,
                        updated_at: parse_datetime(&row.get::<_, String>(2)?),
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    fn set_with(conn: &Connection, key: &str, value: &str) -> StoreResult<()> {
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    // ==================== History Operations ====================

    /// Read the message history stored under `key`; a missing key is empty
    pub fn load_history(&self, key: &str, format: HistoryFormat) -> StoreResult<Vec<Message>> {
        let Some(entry) = self.get(key)? else {
            return Ok(Vec::new());
        };
        tracing::debug!(key = %entry.key, updated_at = %entry.updated_at, "Reading history");
        format.decode(&entry.value).map_err(|source| StoreError::Codec {
            key: key.to_string(),
            source,
        })
    }

    /// Append messages to the history under `key` as one read-modify-write
    pub fn append_history(
        &self,
        key: &str,
        format: HistoryFormat,
        messages: &[Message],
    ) -> StoreResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        // An unreadable value is overwritten with the new history
        let mut history = match Self::get_with(&tx, key)? {
            Some(entry) => format.decode(&entry.value).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "Discarding unreadable history");
                Vec::new()
            }),
            None => Vec::new(),
        };
        history.extend_from_slice(messages);

        let encoded = format.encode(&history).map_err(|source| StoreError::Codec {
            key: key.to_string(),
            source,
        })?;
        Self::set_with(&tx, key, &encoded)?;
        tx.commit()?;

        Ok(history.len())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
