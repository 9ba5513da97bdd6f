// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value store trait for persistence backends.
//!
//! Values are JSON documents. A key written with an expiration TTL must
//! read as absent once the TTL has elapsed.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::VocalisError;
use crate::types::HealthStatus;

/// Options for [`KvStore::put`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// Seconds until the entry expires. `None` keeps it indefinitely.
    pub expiration_ttl: Option<u64>,
}

impl PutOptions {
    /// Options that expire the entry after `secs` seconds.
    pub fn ttl(secs: u64) -> Self {
        Self {
            expiration_ttl: Some(secs),
        }
    }
}

/// Adapter for key-value persistence backends.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Human-readable backend name, used in logs and status output.
    fn name(&self) -> &str;

    /// Returns the stored value, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, VocalisError>;

    /// Stores `value` under `key`, replacing any previous value and TTL.
    async fn put(
        &self,
        key: &str,
        value: serde_json::Value,
        options: PutOptions,
    ) -> Result<(), VocalisError>;

    /// Removes `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), VocalisError>;

    /// Physically removes entries whose TTL has elapsed and returns how many
    /// were dropped. Backends that expire entries on their own keep the default.
    async fn purge_expired(&self) -> Result<usize, VocalisError> {
        Ok(0)
    }

    /// Reports backend health.
    async fn health_check(&self) -> Result<HealthStatus, VocalisError> {
        Ok(HealthStatus::Healthy)
    }
}

/// Typed helpers over [`KvStore`].
#[async_trait]
pub trait KvStoreExt: KvStore {
    /// Reads and decodes a typed value.
    async fn get_json<T>(&self, key: &str) -> Result<Option<T>, VocalisError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Encodes and stores a typed value.
    async fn put_json<T>(
        &self,
        key: &str,
        value: &T,
        options: PutOptions,
    ) -> Result<(), VocalisError>
    where
        T: Serialize + Sync,
    {
        let value = serde_json::to_value(value)?;
        self.put(key, value, options).await
    }
}

impl<S: KvStore + ?Sized> KvStoreExt for S {}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde::Deserialize;

    use super::*;

    #[derive(Default)]
    struct MapStore {
        entries: Mutex<HashMap<String, serde_json::Value>>,
    }

    #[async_trait]
    impl KvStore for MapStore {
        fn name(&self) -> &str {
            "map"
        }

        async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, VocalisError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn put(
            &self,
            key: &str,
            value: serde_json::Value,
            _options: PutOptions,
        ) -> Result<(), VocalisError> {
            self.entries.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), VocalisError> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Counter {
        count: u32,
    }

    #[tokio::test]
    async fn typed_helpers_work_through_dyn() {
        let store: Box<dyn KvStore> = Box::new(MapStore::default());
        store
            .put_json("counter", &Counter { count: 3 }, PutOptions::ttl(60))
            .await
            .unwrap();

        let read: Option<Counter> = store.get_json("counter").await.unwrap();
        assert_eq!(read, Some(Counter { count: 3 }));

        let missing: Option<Counter> = store.get_json("nope").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn mistyped_value_is_serialization_error() {
        let store = MapStore::default();
        store
            .put("counter", serde_json::json!("text"), PutOptions::default())
            .await
            .unwrap();

        let err = store.get_json::<Counter>("counter").await.unwrap_err();
        assert!(matches!(err, VocalisError::Serialization { .. }));
    }

    #[tokio::test]
    async fn default_health_check_is_healthy() {
        let store = MapStore::default();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn default_purge_removes_nothing() {
        let store = MapStore::default();
        store
            .put("k", serde_json::json!(1), PutOptions::ttl(1))
            .await
            .unwrap();
        assert_eq!(store.purge_expired().await.unwrap(), 0);
        assert!(store.get("k").await.unwrap().is_some());
    }
}
