// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::{StoreBackend, VocalisConfig};

/// Longest accepted rate-limit block (30 days).
const MAX_BLOCK_SECS: u64 = 30 * 24 * 3600;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &VocalisConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.rate_limit.minute_limit == 0 {
        fail("rate_limit.minute_limit must be at least 1".to_string());
    }
    if config.rate_limit.hour_limit == 0 {
        fail("rate_limit.hour_limit must be at least 1".to_string());
    }
    if config.rate_limit.block_secs == 0 || config.rate_limit.block_secs > MAX_BLOCK_SECS {
        fail(format!(
            "rate_limit.block_secs must be between 1 and {MAX_BLOCK_SECS}, got {}",
            config.rate_limit.block_secs
        ));
    }

    let cost = &config.cost;
    if !(cost.daily_limit_usd.is_finite() && cost.daily_limit_usd > 0.0) {
        fail(format!(
            "cost.daily_limit_usd must be positive, got {}",
            cost.daily_limit_usd
        ));
    }
    if !(cost.alert_threshold_usd.is_finite() && cost.alert_threshold_usd >= 0.0) {
        fail(format!(
            "cost.alert_threshold_usd must be non-negative, got {}",
            cost.alert_threshold_usd
        ));
    }
    if cost.alert_threshold_usd > cost.daily_limit_usd {
        fail(format!(
            "cost.alert_threshold_usd ({}) must not exceed cost.daily_limit_usd ({})",
            cost.alert_threshold_usd, cost.daily_limit_usd
        ));
    }

    if config.cache.ttl_secs == 0 {
        fail("cache.ttl_secs must be at least 1".to_string());
    }
    if config.cache.capacity == 0 {
        fail("cache.capacity must be at least 1".to_string());
    }
    if config.cache.sweep_interval_secs == 0 {
        fail("cache.sweep_interval_secs must be at least 1".to_string());
    }

    if config.session.ttl_secs == 0 {
        fail("session.ttl_secs must be at least 1".to_string());
    }
    if config.session.max_history == 0 {
        fail("session.max_history must be at least 1".to_string());
    }

    if config.store.backend == StoreBackend::Sqlite && config.store.database_path.trim().is_empty()
    {
        fail("store.database_path must not be empty when store.backend = \"sqlite\"".to_string());
    }
    if config.store.purge_interval_secs == 0 {
        fail("store.purge_interval_secs must be at least 1".to_string());
    }

    if config.agent.max_question_chars == 0 {
        fail("agent.max_question_chars must be at least 1".to_string());
    }

    if config.openai.timeout_secs == 0 {
        fail("openai.timeout_secs must be at least 1".to_string());
    }
    if config.openai.base_url.trim().is_empty() {
        fail("openai.base_url must not be empty".to_string());
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }
    if config.gateway.max_body_bytes == 0 {
        fail("gateway.max_body_bytes must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
