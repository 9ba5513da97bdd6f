// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response cache stored in the shared key-value store.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vocalis_core::{Clock, KvStore, KvStoreExt, PutOptions, VocalisError};

use crate::normalize::normalize_question;
use crate::{CacheStats, CachedAnswer, ResponseCache};

/// Stored form of a cached answer; audio travels as base64 text.
#[derive(Debug, Serialize, Deserialize)]
struct StoredAnswer {
    text_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audio_base64: Option<String>,
    timestamp: DateTime<Utc>,
}

/// Store key for a topic.
pub fn cache_key(topic: &str) -> String {
    format!("cache:response:{topic}")
}

/// Response cache backed by a [`KvStore`].
///
/// Expiry is delegated to the store TTL. There is no capacity bound and
/// no hit counting, so [`stats`](ResponseCache::stats) reports an empty
/// entry list.
pub struct KvResponseCache {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    ttl_secs: u64,
}

impl KvResponseCache {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, ttl_secs: u64) -> Self {
        Self {
            store,
            clock,
            ttl_secs,
        }
    }
}

#[async_trait]
impl ResponseCache for KvResponseCache {
    fn name(&self) -> &str {
        "store"
    }

    async fn get(&self, question: &str) -> Result<Option<CachedAnswer>, VocalisError> {
        let Some(topic) = normalize_question(question) else {
            return Ok(None);
        };
        let Some(stored) = self.store.get_json::<StoredAnswer>(&cache_key(topic)).await? else {
            debug!(topic, "cache miss");
            return Ok(None);
        };
        let audio = stored
            .audio_base64
            .map(|encoded| STANDARD.decode(encoded))
            .transpose()
            .map_err(|e| VocalisError::Storage {
                source: Box::new(e),
            })?;
        debug!(topic, "cache hit");
        Ok(Some(CachedAnswer {
            text: stored.text_response,
            audio,
            timestamp: stored.timestamp,
            hit_count: 0,
        }))
    }

    async fn set_with_audio(
        &self,
        question: &str,
        answer: &str,
        audio: Option<Vec<u8>>,
    ) -> Result<(), VocalisError> {
        let Some(topic) = normalize_question(question) else {
            return Ok(());
        };
        let stored = StoredAnswer {
            text_response: answer.to_string(),
            audio_base64: audio.map(|bytes| STANDARD.encode(bytes)),
            timestamp: self.clock.now(),
        };
        self.store
            .put_json(&cache_key(topic), &stored, PutOptions::ttl(self.ttl_secs))
            .await?;
        debug!(topic, "cache entry stored");
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats, VocalisError> {
        Ok(CacheStats::default())
    }
}
