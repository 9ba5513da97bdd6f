// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded in-memory response cache with insertion-order eviction.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use vocalis_core::{Clock, VocalisError};

use crate::normalize::normalize_question;
use crate::{CacheEntryStats, CacheStats, CachedAnswer, ResponseCache};

#[derive(Debug, Clone)]
struct Entry {
    text: String,
    audio: Option<Vec<u8>>,
    timestamp: DateTime<Utc>,
    hit_count: u64,
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, Entry>,
    /// Topics in first-insertion order; the front is evicted first.
    order: VecDeque<String>,
}

impl State {
    fn remove(&mut self, topic: &str) {
        if self.entries.remove(topic).is_some() {
            self.order.retain(|t| t != topic);
        }
    }
}

/// Process-local response cache.
///
/// Holds at most `capacity` topics. Inserting a new topic into a full
/// cache evicts the oldest-inserted one; overwriting an existing topic
/// keeps its place in the eviction order. Entries older than the TTL read
/// as misses and are dropped on access or by [`sweep_expired`](Self::sweep_expired).
#[derive(Debug)]
pub struct MemoryResponseCache {
    state: Mutex<State>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    capacity: usize,
}

impl MemoryResponseCache {
    pub fn new(clock: Arc<dyn Clock>, ttl_secs: u64, capacity: usize) -> Self {
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            state: Mutex::new(State::default()),
            clock,
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry and return how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.lock();
        let before = state.entries.len();
        state.entries.retain(|_, e| !is_expired(e, now, self.ttl));
        let State { entries, order } = &mut *state;
        order.retain(|t| entries.contains_key(t));
        before - state.entries.len()
    }

    /// Run [`sweep_expired`](Self::sweep_expired) every `period` until `cancel` fires.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        period: std::time::Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let removed = self.sweep_expired();
                        if removed > 0 {
                            debug!(removed, "swept expired cache entries");
                        }
                    }
                    _ = cancel.cancelled() => {
                        debug!("cache sweeper stopped");
                        break;
                    }
                }
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn is_expired(entry: &Entry, now: DateTime<Utc>, ttl: Duration) -> bool {
    now.signed_duration_since(entry.timestamp) >= ttl
}

#[async_trait]
impl ResponseCache for MemoryResponseCache {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, question: &str) -> Result<Option<CachedAnswer>, VocalisError> {
        let Some(topic) = normalize_question(question) else {
            return Ok(None);
        };
        let now = self.clock.now();
        let mut state = self.lock();

        match state.entries.get_mut(topic) {
            None => {
                debug!(topic, "cache miss");
                return Ok(None);
            }
            Some(entry) if !is_expired(entry, now, self.ttl) => {
                entry.hit_count += 1;
                debug!(topic, hits = entry.hit_count, "cache hit");
                return Ok(Some(CachedAnswer {
                    text: entry.text.clone(),
                    audio: entry.audio.clone(),
                    timestamp: entry.timestamp,
                    hit_count: entry.hit_count,
                }));
            }
            Some(_) => {}
        }
        state.remove(topic);
        debug!(topic, "cache entry expired");
        Ok(None)
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
        let entry = Entry {
            text: answer.to_string(),
            audio,
            timestamp: self.clock.now(),
            hit_count: 0,
        };

        let mut state = self.lock();
        if let Some(existing) = state.entries.get_mut(topic) {
            *existing = entry;
            debug!(topic, "cache entry replaced");
            return Ok(());
        }
        while state.entries.len() >= self.capacity {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            state.entries.remove(&oldest);
            debug!(topic = %oldest, "cache entry evicted");
        }
        state.entries.insert(topic.to_string(), entry);
        state.order.push_back(topic.to_string());
        debug!(topic, "cache entry stored");
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats, VocalisError> {
        let state = self.lock();
        let entries = state
            .order
            .iter()
            .filter_map(|topic| {
                state.entries.get(topic).map(|e| CacheEntryStats {
                    topic: topic.clone(),
                    hit_count: e.hit_count,
                    timestamp: e.timestamp,
                })
            })
            .collect();
        Ok(CacheStats {
            size: state.entries.len(),
            entries,
        })
    }
}
