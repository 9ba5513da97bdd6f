// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite key-value store.
//!
//! All statements run on tokio-rusqlite's single background thread, so
//! writes are serialized. Do NOT open a second connection for writes.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{OptionalExtension, params};
use tokio_rusqlite::Connection;
use tracing::debug;

use vocalis_core::{Clock, HealthStatus, KvStore, PutOptions, VocalisError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv_entries (
    key        TEXT PRIMARY KEY NOT NULL,
    value      TEXT NOT NULL,
    expires_at INTEGER NULL
);
CREATE INDEX IF NOT EXISTS idx_kv_entries_expires_at ON kv_entries(expires_at);
";

/// Map a tokio-rusqlite call error into a storage error.
fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> VocalisError {
    VocalisError::storage(format!("sqlite: {e}"))
}

/// Durable key-value store backed by one SQLite table.
///
/// `expires_at` is a unix timestamp in milliseconds; rows past it are
/// invisible to reads and removed by [`purge_expired`](Self::purge_expired).
pub struct SqliteKvStore {
    conn: Connection,
    clock: Arc<dyn Clock>,
}

impl SqliteKvStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub async fn open(
        path: &str,
        wal_mode: bool,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, VocalisError> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| VocalisError::storage(format!("failed to open {path}: {e}")))?;
        let store = Self { conn, clock };
        store.init(wal_mode).await?;
        debug!(path, wal_mode, "SQLite kv store opened");
        Ok(store)
    }

    /// In-memory database, for tests and ephemeral runs.
    pub async fn open_in_memory(clock: Arc<dyn Clock>) -> Result<Self, VocalisError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| VocalisError::storage(format!("failed to open in-memory db: {e}")))?;
        let store = Self { conn, clock };
        store.init(false).await?;
        Ok(store)
    }

    async fn init(&self, wal_mode: bool) -> Result<(), VocalisError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal_mode {
                    conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
                }
                conn.busy_timeout(std::time::Duration::from_secs(5))?;
                conn.execute_batch(SCHEMA)?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    fn now_millis(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    /// Deletes every expired row and returns how many were removed.
    pub async fn purge_expired(&self) -> Result<usize, VocalisError> {
        let now = self.now_millis();
        let removed = self
            .conn
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                conn.execute(
                    "DELETE FROM kv_entries WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                    params![now],
                )
            })
            .await
            .map_err(map_tr_err)?;
        if removed > 0 {
            debug!(removed, "purged expired kv rows");
        }
        Ok(removed)
    }

    /// Flush the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), VocalisError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl KvStore for SqliteKvStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, VocalisError> {
        let key = key.to_string();
        let now = self.now_millis();
        let raw: Option<String> = self
            .conn
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                conn.query_row(
                    "SELECT value FROM kv_entries
                     WHERE key = ?1 AND (expires_at IS NULL OR expires_at > ?2)",
                    params![key, now],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        key: &str,
        value: serde_json::Value,
        options: PutOptions,
    ) -> Result<(), VocalisError> {
        let key = key.to_string();
        let text = serde_json::to_string(&value)?;
        let expires_at = options.expiration_ttl.map(|ttl| {
            let ttl_millis = i64::try_from(ttl.saturating_mul(1000)).unwrap_or(i64::MAX);
            self.now_millis().saturating_add(ttl_millis)
        });
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO kv_entries (key, value, expires_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                    expires_at = excluded.expires_at",
                    params![key, text, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn delete(&self, key: &str) -> Result<(), VocalisError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn purge_expired(&self) -> Result<usize, VocalisError> {
        SqliteKvStore::purge_expired(self).await
    }

    async fn health_check(&self) -> Result<HealthStatus, VocalisError> {
        let result = self
            .conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await;
        Ok(match result {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vocalis_core::ManualClock;

    async fn store() -> (SqliteKvStore, ManualClock) {
        let clock = ManualClock::starting_now();
        let store = SqliteKvStore::open_in_memory(Arc::new(clock.clone()))
            .await
            .unwrap();
        (store, clock)
    }

    #[tokio::test]
    async fn put_get_overwrite_delete() {
        let (store, _) = store().await;
        store.put("k", json!({"a": 1}), PutOptions::default()).await.unwrap();
        store.put("k", json!({"a": 2}), PutOptions::default()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!({"a": 2})));

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_rows_are_invisible_then_purged() {
        let (store, clock) = store().await;
        store.put("short", json!(1), PutOptions::ttl(60)).await.unwrap();
        store.put("long", json!(2), PutOptions::ttl(7200)).await.unwrap();

        clock.advance_secs(60);
        assert_eq!(store.get("short").await.unwrap(), None);
        assert_eq!(store.get("long").await.unwrap(), Some(json!(2)));

        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn health_check_reports_healthy() {
        let (store, _) = store().await;
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }
}
