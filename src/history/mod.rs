//! Append-only generation history backed by SQLite.
//!
//! One row per successful remote generation. Rows are never updated or
//! deleted by skald. The schema is created on open if it does not exist,
//! so opening an existing database is a no-op apart from the connection.
//!
//! Timestamps are stored as UTC RFC 3339 strings with fixed microsecond
//! precision, which makes lexicographic order equal chronological order.
//! Ties (same microsecond) fall back to id order.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, Row, params};
use serde::Serialize;
use tracing::debug;

use crate::{Result, telemetry};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        content_type TEXT NOT NULL,
        input_text TEXT NOT NULL,
        output_text TEXT NOT NULL,
        model TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_history_timestamp ON history(timestamp);
";

const SELECT_NEWEST_FIRST: &str = "
    SELECT id, timestamp, content_type, input_text, output_text, model
    FROM history
    ORDER BY timestamp DESC, id DESC";

/// A persisted generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    pub id: i64,
    /// ISO-8601 (RFC 3339) generation time, UTC.
    pub timestamp: String,
    pub content_type: String,
    pub input_text: String,
    pub output_text: String,
    pub model: String,
}

impl HistoryRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            content_type: row.get(2)?,
            input_text: row.get(3)?,
            output_text: row.get(4)?,
            model: row.get(5)?,
        })
    }
}

/// Fields supplied by the caller for a new record; id and timestamp are
/// assigned by the store.
#[derive(Debug, Clone, Copy)]
pub struct NewHistoryRecord<'a> {
    pub content_type: &'a str,
    pub input_text: &'a str,
    pub output_text: &'a str,
    pub model: &'a str,
}

/// Durable history log.
///
/// The connection sits behind a mutex so that insert and id assignment
/// happen as one step even when the store is shared between tasks.
///
/// Calls are synchronous and run on the calling thread. Concurrent async
/// callers should move them onto `tokio::task::spawn_blocking`.
pub struct HistoryStore {
    conn: Mutex<Connection>,
}

impl HistoryStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self::with_connection(conn)?;
        debug!(path = %path.display(), "opened history store");
        Ok(store)
    }

    /// Open a private in-memory database (tests, dry runs).
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave a half-written row:
        // each statement is atomic in SQLite.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a record stamped with the current time.
    pub fn append(&self, record: &NewHistoryRecord<'_>) -> Result<HistoryRecord> {
        self.append_at(record, Utc::now())
    }

    /// Append a record with an explicit generation time.
    pub fn append_at(
        &self,
        record: &NewHistoryRecord<'_>,
        at: DateTime<Utc>,
    ) -> Result<HistoryRecord> {
        let timestamp = format_timestamp(at);
        let conn = self.conn();
        conn.execute(
            "INSERT INTO history (timestamp, content_type, input_text, output_text, model)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                timestamp,
                record.content_type,
                record.input_text,
                record.output_text,
                record.model
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        metrics::counter!(telemetry::HISTORY_APPENDS_TOTAL).increment(1);
        debug!(id, content_type = record.content_type, "appended history record");

        Ok(HistoryRecord {
            id,
            timestamp,
            content_type: record.content_type.to_string(),
            input_text: record.input_text.to_string(),
            output_text: record.output_text.to_string(),
            model: record.model.to_string(),
        })
    }

    /// Every record, newest first.
    pub fn list_all(&self) -> Result<Vec<HistoryRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(SELECT_NEWEST_FIRST)?;
        let records = stmt
            .query_map([], HistoryRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// The `limit` most recent records, newest first.
    pub fn list_recent(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{SELECT_NEWEST_FIRST} LIMIT ?1"))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map([limit], HistoryRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
