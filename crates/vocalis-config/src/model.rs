// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Vocalis.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Vocalis configuration.
///
/// All sections are optional and default to the production limits.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VocalisConfig {
    /// Agent identity and request shaping.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Per-identifier request limits.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Pricing thresholds and ledger retention.
    #[serde(default)]
    pub cost: CostConfig,

    /// Topic response cache.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Conversation sessions.
    #[serde(default)]
    pub session: SessionConfig,

    /// Key-value store backend.
    #[serde(default)]
    pub store: StoreConfig,

    /// OpenAI API settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Agent identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// System prompt sent ahead of every conversation.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Longest accepted question, in characters.
    #[serde(default = "default_max_question_chars")]
    pub max_question_chars: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: default_system_prompt(),
            max_question_chars: default_max_question_chars(),
        }
    }
}

fn default_agent_name() -> String {
    "vocalis".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_system_prompt() -> String {
    "You are the voice assistant on our website. Answer questions about our \
     services, pricing, integrations and booking in two or three short spoken \
     sentences. If you do not know something, offer to book a call."
        .to_string()
}

fn default_max_question_chars() -> usize {
    1000
}

/// Rate limiter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Requests allowed per rolling minute window.
    #[serde(default = "default_minute_limit")]
    pub minute_limit: u32,

    /// Requests allowed per rolling hour window.
    #[serde(default = "default_hour_limit")]
    pub hour_limit: u32,

    /// Block installed after a minute-window violation, in seconds.
    #[serde(default = "default_block_secs")]
    pub block_secs: u64,

    /// Lower bound on stored entry TTLs, in seconds.
    #[serde(default = "default_min_ttl_secs")]
    pub min_ttl_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            minute_limit: default_minute_limit(),
            hour_limit: default_hour_limit(),
            block_secs: default_block_secs(),
            min_ttl_secs: default_min_ttl_secs(),
        }
    }
}

fn default_minute_limit() -> u32 {
    10
}

fn default_hour_limit() -> u32 {
    100
}

fn default_block_secs() -> u64 {
    3600
}

fn default_min_ttl_secs() -> u64 {
    60
}

/// Cost tracking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CostConfig {
    /// Daily spend at which requests needing a model call are refused.
    #[serde(default = "default_daily_limit_usd")]
    pub daily_limit_usd: f64,

    /// Daily spend at which a warning is raised.
    #[serde(default = "default_alert_threshold_usd")]
    pub alert_threshold_usd: f64,

    /// Retention for individual usage records, in seconds.
    #[serde(default = "default_cost_retention_secs")]
    pub usage_ttl_secs: u64,

    /// Retention for daily totals, in seconds.
    #[serde(default = "default_cost_retention_secs")]
    pub daily_total_ttl_secs: u64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            daily_limit_usd: default_daily_limit_usd(),
            alert_threshold_usd: default_alert_threshold_usd(),
            usage_ttl_secs: default_cost_retention_secs(),
            daily_total_ttl_secs: default_cost_retention_secs(),
        }
    }
}

fn default_daily_limit_usd() -> f64 {
    10.0
}

fn default_alert_threshold_usd() -> f64 {
    5.0
}

fn default_cost_retention_secs() -> u64 {
    48 * 3600
}

/// Where cached answers live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local map with capacity eviction and hit counts.
    #[default]
    Memory,
    /// The configured key-value store.
    Store,
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Cache backend.
    #[serde(default)]
    pub backend: CacheBackend,

    /// Lifetime of a cached answer, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,

    /// Maximum entries held by the memory backend.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Interval between expiry sweeps of the memory backend, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            ttl_secs: default_cache_ttl_secs(),
            capacity: default_cache_capacity(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_cache_ttl_secs() -> u64 {
    24 * 3600
}

fn default_cache_capacity() -> usize {
    100
}

fn default_sweep_interval_secs() -> u64 {
    300
}

/// Session store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Inactivity timeout, in seconds.
    #[serde(default = "default_session_ttl_secs")]
    pub ttl_secs: u64,

    /// Messages retained per session.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl_secs(),
            max_history: default_max_history(),
        }
    }
}

fn default_session_ttl_secs() -> u64 {
    3600
}

fn default_max_history() -> usize {
    10
}

/// Key-value store backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process map. State is lost on restart.
    #[default]
    Memory,
    /// SQLite database file.
    Sqlite,
}

/// Key-value store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend.
    #[serde(default)]
    pub backend: StoreBackend,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Seconds between sweeps that delete expired entries.
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            purge_interval_secs: default_purge_interval_secs(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("vocalis").join("vocalis.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("vocalis.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_purge_interval_secs() -> u64 {
    600
}

/// OpenAI API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. `None` falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat completion model.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Upper bound on generated tokens per answer.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-call timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    300
}

fn default_timeout_secs() -> u64 {
    30
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Take the client identifier from `X-Forwarded-For` / `X-Real-IP`.
    #[serde(default = "default_trusted_proxy_headers")]
    pub trusted_proxy_headers: bool,

    /// Request body cap, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            trusted_proxy_headers: default_trusted_proxy_headers(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_trusted_proxy_headers() -> bool {
    true
}

fn default_max_body_bytes() -> usize {
    16 * 1024
}
