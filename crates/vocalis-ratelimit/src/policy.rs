// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Limits and window definitions.

use chrono::Duration;
use vocalis_config::model::RateLimitConfig;

/// A counting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Minute,
    Hour,
}

impl Window {
    /// Length of the window.
    pub fn length(self) -> Duration {
        match self {
            Window::Minute => Duration::minutes(1),
            Window::Hour => Duration::hours(1),
        }
    }

    /// Store key holding this window's entry for `identifier`.
    pub fn key(self, identifier: &str) -> String {
        let suffix = match self {
            Window::Minute => "minute",
            Window::Hour => "hour",
        };
        format!("ratelimit:{identifier}:{suffix}")
    }
}

/// Caps and penalty applied by a [`RateLimiter`](crate::RateLimiter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub minute_limit: u32,
    pub hour_limit: u32,
    /// Block installed on a minute-window violation.
    pub block: Duration,
    /// Floor for stored entry TTLs, in seconds.
    pub min_ttl_secs: u64,
}

impl RateLimitPolicy {
    pub fn limit(&self, window: Window) -> u32 {
        match window {
            Window::Minute => self.minute_limit,
            Window::Hour => self.hour_limit,
        }
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::from(&RateLimitConfig::default())
    }
}

impl From<&RateLimitConfig> for RateLimitPolicy {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            minute_limit: config.minute_limit,
            hour_limit: config.hour_limit,
            block: i64::try_from(config.block_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or_else(|| Duration::hours(1)),
            min_ttl_secs: config.min_ttl_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_production_limits() {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.limit(Window::Minute), 10);
        assert_eq!(policy.limit(Window::Hour), 100);
        assert_eq!(policy.block, Duration::hours(1));
        assert_eq!(policy.min_ttl_secs, 60);
    }

    #[test]
    fn window_keys_are_scoped_per_identifier() {
        assert_eq!(Window::Minute.key("10.0.0.1"), "ratelimit:10.0.0.1:minute");
        assert_eq!(Window::Hour.key("10.0.0.1"), "ratelimit:10.0.0.1:hour");
    }
}
