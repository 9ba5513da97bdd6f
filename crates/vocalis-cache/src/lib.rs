// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Topic-keyed response cache.
//!
//! Questions are normalised to a small set of topics (see [`normalize`]);
//! only questions that map to a topic are cached, and all phrasings of a
//! topic share one entry. Two interchangeable backends implement
//! [`ResponseCache`]:
//!
//! - [`MemoryResponseCache`]: bounded, process-local, tracks hit counts.
//! - [`KvResponseCache`]: stored in the shared [`KvStore`] with a store TTL.

pub mod kv;
pub mod memory;
pub mod normalize;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use vocalis_config::model::{CacheBackend, CacheConfig};
use vocalis_core::{Clock, KvStore, VocalisError};

pub use kv::KvResponseCache;
pub use memory::MemoryResponseCache;
pub use normalize::{TOPIC_RULES, TopicRule, normalize_question};

/// A cached answer for one topic.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedAnswer {
    pub text: String,
    /// Precomputed speech for `text`, if any.
    pub audio: Option<Vec<u8>>,
    /// When the answer was stored.
    pub timestamp: DateTime<Utc>,
    /// Reads served from this entry, including the current one. Always 0
    /// for the store-backed variant.
    pub hit_count: u64,
}

/// Per-entry metadata reported by [`ResponseCache::stats`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntryStats {
    pub topic: String,
    pub hit_count: u64,
    pub timestamp: DateTime<Utc>,
}

/// Cache occupancy snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub entries: Vec<CacheEntryStats>,
}

/// A response cache keyed by question topic.
///
/// Questions that normalise to no topic are never cached: `get` returns
/// `None` and the setters do nothing.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Backend name for logs and status output.
    fn name(&self) -> &str;

    async fn get(&self, question: &str) -> Result<Option<CachedAnswer>, VocalisError>;

    async fn set(&self, question: &str, answer: &str) -> Result<(), VocalisError> {
        self.set_with_audio(question, answer, None).await
    }

    async fn set_with_audio(
        &self,
        question: &str,
        answer: &str,
        audio: Option<Vec<u8>>,
    ) -> Result<(), VocalisError>;

    async fn stats(&self) -> Result<CacheStats, VocalisError>;
}

/// Build the cache backend selected by `config`.
///
/// The memory variant is returned separately so the caller can start its
/// background sweeper.
pub fn build_cache(
    config: &CacheConfig,
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
) -> (Arc<dyn ResponseCache>, Option<Arc<MemoryResponseCache>>) {
    let built = match config.backend {
        CacheBackend::Memory => {
            let cache = Arc::new(MemoryResponseCache::new(
                clock,
                config.ttl_secs,
                config.capacity,
            ));
            (cache.clone() as Arc<dyn ResponseCache>, Some(cache))
        }
        CacheBackend::Store => (
            Arc::new(KvResponseCache::new(store, clock, config.ttl_secs)) as Arc<dyn ResponseCache>,
            None,
        ),
    };
    info!(backend = built.0.name(), ttl_secs = config.ttl_secs, "response cache ready");
    built
}
