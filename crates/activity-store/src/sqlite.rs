//! SQLite key/value backend: the whole collection is one JSON value under one key.

use activity_types::{ActivityBackend, ActivityRecord, StoreError};
use std::path::Path;

/// Default key the collection is stored under.
pub const DEFAULT_KEY: &str = "employee_activity_log";

/// SQLite-backed store shaped like browser local storage: a `kv_store` table where the
/// activity collection is a single row. Other features may share the table under other keys;
/// writes to different keys are not coordinated.
pub struct SqliteBackend {
    conn: std::sync::Mutex<rusqlite::Connection>,
    key: String,
}

impl SqliteBackend {
    /// Open (or create) the database at `path`.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = rusqlite::Connection::open(path).map_err(|e| StoreError::Other(e.to_string()))?;
        Self::with_connection(conn, DEFAULT_KEY)
    }

    /// In-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn =
            rusqlite::Connection::open_in_memory().map_err(|e| StoreError::Other(e.to_string()))?;
        Self::with_connection(conn, DEFAULT_KEY)
    }

    pub fn with_connection(conn: rusqlite::Connection, key: &str) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| StoreError::Other(e.to_string()))?;

        Ok(Self {
            conn: std::sync::Mutex::new(conn),
            key: key.to_string(),
        })
    }

    fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T, rusqlite::Error>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Other(format!("failed to acquire lock: {}", e)))?;
        f(&conn).map_err(|e| StoreError::Other(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ActivityBackend for SqliteBackend {
    async fn load(&self) -> Result<Vec<ActivityRecord>, StoreError> {
        let key = self.key.clone();
        let value: Option<String> = self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT value FROM kv_store WHERE key = ?1")?;
            match stmt.query_row([&key], |row| row.get::<_, String>(0)) {
                Ok(v) => Ok(Some(v)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })?;
        match value {
            None => Ok(Vec::new()),
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| StoreError::Corrupt(format!("key {}: {}", self.key, e))),
        }
    }

    async fn save(&self, records: &[ActivityRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string(records)?;
        let now = chrono::Utc::now().to_rfc3339();
        let key = self.key.clone();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, json, now],
            )
        })?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let key = self.key.clone();
        self.with_conn(|conn| conn.execute("DELETE FROM kv_store WHERE key = ?1", [&key]))?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.key)
    }
}
