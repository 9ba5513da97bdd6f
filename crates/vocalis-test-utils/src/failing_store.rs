// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A key-value store that is always unavailable.

use async_trait::async_trait;
use vocalis_core::{HealthStatus, KvStore, PutOptions, VocalisError};

/// Every operation returns [`VocalisError::Storage`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingKvStore;

#[async_trait]
impl KvStore for FailingKvStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn get(&self, _key: &str) -> Result<Option<serde_json::Value>, VocalisError> {
        Err(VocalisError::storage("store unavailable"))
    }

    async fn put(
        &self,
        _key: &str,
        _value: serde_json::Value,
        _options: PutOptions,
    ) -> Result<(), VocalisError> {
        Err(VocalisError::storage("store unavailable"))
    }

    async fn delete(&self, _key: &str) -> Result<(), VocalisError> {
        Err(VocalisError::storage("store unavailable"))
    }

    async fn health_check(&self) -> Result<HealthStatus, VocalisError> {
        Ok(HealthStatus::Unhealthy("store unavailable".into()))
    }
}
