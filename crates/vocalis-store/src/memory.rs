// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory key-value store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use vocalis_core::{Clock, KvStore, PutOptions, SystemClock, VocalisError};

#[derive(Debug, Clone)]
struct Entry {
    value: serde_json::Value,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// DashMap-backed store with lazily enforced TTLs.
///
/// Expired entries are dropped when read and by [`purge_expired`](Self::purge_expired).
#[derive(Debug)]
pub struct MemoryKvStore {
    entries: DashMap<String, Entry>,
    clock: Arc<dyn Clock>,
}

impl MemoryKvStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Store using the system clock.
    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "purged expired kv entries");
        }
        removed
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .iter()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries held, including expired ones not yet purged.
    pub fn stored_len(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, VocalisError> {
        let now = self.clock.now();
        match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
        }
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    async fn put(
        &self,
        key: &str,
        value: serde_json::Value,
        options: PutOptions,
    ) -> Result<(), VocalisError> {
        let now = self.clock.now();
        let expires_at = options.expiration_ttl.and_then(|ttl| {
            let secs = i64::try_from(ttl).ok()?;
            now.checked_add_signed(Duration::try_seconds(secs)?)
        });
        self.entries
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), VocalisError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, VocalisError> {
        Ok(MemoryKvStore::purge_expired(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vocalis_core::{KvStoreExt, ManualClock};

    fn store() -> (MemoryKvStore, ManualClock) {
        let clock = ManualClock::starting_now();
        (MemoryKvStore::new(Arc::new(clock.clone())), clock)
    }

    #[tokio::test]
    async fn put_get_delete() {
        let (store, _) = store();
        store
            .put("a", json!({"n": 1}), PutOptions::default())
            .await
            .unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some(json!({"n": 1})));

        store.delete("a").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
        store.delete("a").await.unwrap();
    }

    #[tokio::test]
    async fn entry_expires_exactly_at_ttl() {
        let (store, clock) = store();
        store.put("k", json!(1), PutOptions::ttl(60)).await.unwrap();

        clock.advance_secs(59);
        assert_eq!(store.get("k").await.unwrap(), Some(json!(1)));

        clock.advance_secs(1);
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn put_replaces_ttl() {
        let (store, clock) = store();
        store.put("k", json!(1), PutOptions::ttl(10)).await.unwrap();
        store.put("k", json!(2), PutOptions::default()).await.unwrap();

        clock.advance_secs(3600);
        assert_eq!(store.get_json::<u32>("k").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn purge_removes_only_expired() {
        let (store, clock) = store();
        store.put("short", json!(1), PutOptions::ttl(5)).await.unwrap();
        store.put("long", json!(2), PutOptions::ttl(500)).await.unwrap();
        store.put("forever", json!(3), PutOptions::default()).await.unwrap();

        clock.advance_secs(10);
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 2);
    }
}
