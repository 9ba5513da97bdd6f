// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store-backed dual-window rate limiter.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use vocalis_core::{Clock, KvStore, KvStoreExt, PutOptions, VocalisError};

use crate::policy::{RateLimitPolicy, Window};

/// Stored state of one window for one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_time: DateTime<Utc>,
    /// Only ever set on the minute entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_until: Option<DateTime<Utc>>,
}

impl RateLimitEntry {
    fn fresh(now: DateTime<Utc>, window: Window) -> Self {
        Self {
            count: 0,
            reset_time: now + window.length(),
            blocked_until: None,
        }
    }

    /// Starts a new window when the current one has run out.
    fn roll(&mut self, now: DateTime<Utc>, window: Window) {
        if now >= self.reset_time {
            self.count = 0;
            self.reset_time = now + window.length();
        }
    }

    fn expires_at(&self) -> DateTime<Utc> {
        match self.blocked_until {
            Some(until) if until > self.reset_time => until,
            _ => self.reset_time,
        }
    }
}

/// Outcome of [`RateLimiter::check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Requests left before the tighter of the two windows rejects.
    pub remaining: u32,
    /// When the caller may expect capacity again.
    pub reset_time: DateTime<Utc>,
    /// Human-readable explanation, present on rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RateLimitResult {
    /// Whole seconds until `reset_time`, at least 1.
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> u64 {
        ceil_secs(self.reset_time - now).max(1)
    }
}

/// Read-only view of one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowStatus {
    pub count: u32,
    pub limit: u32,
    pub remaining: u32,
    pub reset_time: DateTime<Utc>,
}

/// Read-only view of an identifier's limiter state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    pub identifier: String,
    pub minute: WindowStatus,
    pub hour: WindowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_until: Option<DateTime<Utc>>,
}

/// Process-local counters since start-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RateLimitStats {
    pub checks: u64,
    pub allowed: u64,
    pub rejected: u64,
    pub blocks_installed: u64,
}

/// Per-identifier minute/hour limiter with an escalating block.
///
/// Evaluation order for [`check`](Self::check):
/// 1. an active block rejects;
/// 2. a full minute window rejects and installs a block;
/// 3. a full hour window rejects without blocking;
/// 4. otherwise both windows are incremented and the request is allowed.
pub struct RateLimiter {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    policy: RateLimitPolicy,
    checks: AtomicU64,
    allowed: AtomicU64,
    rejected: AtomicU64,
    blocks_installed: AtomicU64,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, policy: RateLimitPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
            checks: AtomicU64::new(0),
            allowed: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            blocks_installed: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Admit or reject one request from `identifier`.
    ///
    /// Store failures are returned as errors; the limiter never fails open.
    pub async fn check(&self, identifier: &str) -> Result<RateLimitResult, VocalisError> {
        let now = self.clock.now();
        self.checks.fetch_add(1, Ordering::Relaxed);

        let mut minute = self.load(identifier, Window::Minute, now).await?;
        if let Some(until) = minute.blocked_until {
            if now < until {
                debug!(identifier, blocked_until = %until, "request rejected: identifier blocked");
                return Ok(self.reject(
                    until,
                    format!("Too many requests. Try again in {}.", describe_wait(until - now)),
                ));
            }
            minute = RateLimitEntry::fresh(now, Window::Minute);
        }
        minute.roll(now, Window::Minute);

        if minute.count >= self.policy.minute_limit {
            let until = now + self.policy.block;
            minute.blocked_until = Some(until);
            self.save(identifier, Window::Minute, &minute, now).await?;
            self.blocks_installed.fetch_add(1, Ordering::Relaxed);
            warn!(
                identifier,
                limit = self.policy.minute_limit,
                blocked_until = %until,
                "minute limit exceeded, block installed"
            );
            return Ok(self.reject(
                until,
                format!(
                    "Rate limit exceeded ({} requests per minute). Blocked for {}.",
                    self.policy.minute_limit,
                    describe_wait(self.policy.block)
                ),
            ));
        }

        let mut hour = self.load(identifier, Window::Hour, now).await?;
        hour.roll(now, Window::Hour);

        if hour.count >= self.policy.hour_limit {
            debug!(
                identifier,
                limit = self.policy.hour_limit,
                "request rejected: hour limit reached"
            );
            return Ok(self.reject(
                hour.reset_time,
                format!(
                    "Hourly limit of {} requests reached. Try again in {}.",
                    self.policy.hour_limit,
                    describe_wait(hour.reset_time - now)
                ),
            ));
        }

        minute.count += 1;
        hour.count += 1;
        self.save(identifier, Window::Minute, &minute, now).await?;
        self.save(identifier, Window::Hour, &hour, now).await?;

        let remaining = (self.policy.minute_limit - minute.count)
            .min(self.policy.hour_limit - hour.count);
        self.allowed.fetch_add(1, Ordering::Relaxed);
        debug!(identifier, remaining, "request allowed");

        Ok(RateLimitResult {
            allowed: true,
            remaining,
            reset_time: minute.reset_time,
            reason: None,
        })
    }

    /// Current counters for `identifier` without consuming a request.
    pub async fn status(&self, identifier: &str) -> Result<RateLimitStatus, VocalisError> {
        let now = self.clock.now();

        let mut minute = self.load(identifier, Window::Minute, now).await?;
        let blocked_until = minute.blocked_until.filter(|until| now < *until);
        if minute.blocked_until.is_some() && blocked_until.is_none() {
            minute = RateLimitEntry::fresh(now, Window::Minute);
        }
        minute.roll(now, Window::Minute);

        let mut hour = self.load(identifier, Window::Hour, now).await?;
        hour.roll(now, Window::Hour);

        let view = |entry: &RateLimitEntry, window: Window| {
            let limit = self.policy.limit(window);
            WindowStatus {
                count: entry.count,
                limit,
                remaining: if blocked_until.is_some() {
                    0
                } else {
                    limit.saturating_sub(entry.count)
                },
                reset_time: entry.reset_time,
            }
        };

        Ok(RateLimitStatus {
            identifier: identifier.to_string(),
            minute: view(&minute, Window::Minute),
            hour: view(&hour, Window::Hour),
            blocked_until,
        })
    }

    pub fn stats(&self) -> RateLimitStats {
        RateLimitStats {
            checks: self.checks.load(Ordering::Relaxed),
            allowed: self.allowed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            blocks_installed: self.blocks_installed.load(Ordering::Relaxed),
        }
    }

    /// Forget both windows (and any block) for `identifier`.
    pub async fn reset(&self, identifier: &str) -> Result<(), VocalisError> {
        self.store.delete(&Window::Minute.key(identifier)).await?;
        self.store.delete(&Window::Hour.key(identifier)).await?;
        info!(identifier, "rate limit state reset");
        Ok(())
    }

    async fn load(
        &self,
        identifier: &str,
        window: Window,
        now: DateTime<Utc>,
    ) -> Result<RateLimitEntry, VocalisError> {
        Ok(self
            .store
            .get_json::<RateLimitEntry>(&window.key(identifier))
            .await?
            .unwrap_or_else(|| RateLimitEntry::fresh(now, window)))
    }

    async fn save(
        &self,
        identifier: &str,
        window: Window,
        entry: &RateLimitEntry,
        now: DateTime<Utc>,
    ) -> Result<(), VocalisError> {
        let ttl = ceil_secs(entry.expires_at() - now).max(self.policy.min_ttl_secs);
        self.store
            .put_json(&window.key(identifier), entry, PutOptions::ttl(ttl))
            .await
    }

    fn reject(&self, reset_time: DateTime<Utc>, reason: String) -> RateLimitResult {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        RateLimitResult {
            allowed: false,
            remaining: 0,
            reset_time,
            reason: Some(reason),
        }
    }
}

/// Whole seconds in `d`, rounded up. Negative durations count as zero.
fn ceil_secs(d: Duration) -> u64 {
    let millis = d.num_milliseconds().max(0) as u64;
    millis.div_ceil(1000)
}

/// Wait estimate such as "45 seconds", "12 minutes" or "1 hour".
fn describe_wait(d: Duration) -> String {
    let secs = ceil_secs(d).max(1);
    if secs < 60 {
        return plural(secs, "second");
    }
    let minutes = secs.div_ceil(60);
    if minutes % 60 == 0 {
        plural(minutes / 60, "hour")
    } else {
        plural(minutes, "minute")
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
