// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage ledger and daily totals in the key-value store.
//!
//! Usage records are append-only and kept for inspection; they are never
//! summed on read. The daily total is a single accumulating number per UTC
//! date, updated by read-then-write.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vocalis_core::{KvStore, KvStoreExt, PutOptions, VocalisError};

use crate::pricing::ModelKind;

/// One metered model call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub model: ModelKind,
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Derived from the pricing table; zero for cached answers.
    pub cost: f64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

/// Store key for the total of `date`.
pub fn daily_key(date: NaiveDate) -> String {
    format!("cost:daily:{}", date.format("%Y-%m-%d"))
}

/// Store-backed usage ledger.
pub struct UsageLedger {
    store: Arc<dyn KvStore>,
    usage_ttl_secs: u64,
    daily_total_ttl_secs: u64,
}

impl UsageLedger {
    pub fn new(store: Arc<dyn KvStore>, usage_ttl_secs: u64, daily_total_ttl_secs: u64) -> Self {
        Self {
            store,
            usage_ttl_secs,
            daily_total_ttl_secs,
        }
    }

    /// Persist a usage record and return the key it was written under.
    pub async fn append(&self, record: &UsageRecord) -> Result<String, VocalisError> {
        let key = format!(
            "usage:{}:{}",
            record.timestamp.timestamp_millis(),
            uuid::Uuid::new_v4()
        );
        self.store
            .put_json(&key, record, PutOptions::ttl(self.usage_ttl_secs))
            .await?;
        debug!(key = %key, model = %record.model, cost = record.cost, "usage recorded");
        Ok(key)
    }

    /// Read back a single usage record.
    pub async fn get(&self, key: &str) -> Result<Option<UsageRecord>, VocalisError> {
        self.store.get_json(key).await
    }

    /// Total spend recorded for `date`; absent reads as zero.
    pub async fn daily_total(&self, date: NaiveDate) -> Result<f64, VocalisError> {
        Ok(self
            .store
            .get_json::<f64>(&daily_key(date))
            .await?
            .unwrap_or(0.0))
    }

    /// Add `cost` to the total for `date` and return the new total.
    ///
    /// Not atomic: concurrent callers may overwrite each other's additions.
    pub async fn add_to_daily_total(
        &self,
        date: NaiveDate,
        cost: f64,
    ) -> Result<f64, VocalisError> {
        let total = self.daily_total(date).await? + cost;
        self.store
            .put_json(
                &daily_key(date),
                &total,
                PutOptions::ttl(self.daily_total_ttl_secs),
            )
            .await?;
        Ok(total)
    }
}
