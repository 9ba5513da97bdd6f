// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./vocalis.toml` > `~/.config/vocalis/vocalis.toml` >
//! `/etc/vocalis/vocalis.toml` with environment variable overrides via `VOCALIS_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::VocalisConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG: &str = "/etc/vocalis/vocalis.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG: &str = "vocalis.toml";

/// Top-level sections that environment variables may address.
const SECTIONS: &[&str] = &[
    "rate_limit",
    "gateway",
    "session",
    "openai",
    "agent",
    "cache",
    "store",
    "cost",
];

/// Path of the per-user configuration file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vocalis").join(LOCAL_CONFIG))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/vocalis/vocalis.toml` (system-wide)
/// 3. `~/.config/vocalis/vocalis.toml` (user XDG config)
/// 4. `./vocalis.toml` (local directory)
/// 5. `VOCALIS_*` environment variables
pub fn load_config() -> Result<VocalisConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<VocalisConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VocalisConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VocalisConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VocalisConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(VocalisConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Map a prefix-stripped, lowercased env var name to a dotted config key.
///
/// Only the first `_` after a known section name becomes a dot, so
/// `rate_limit_minute_limit` maps to `rate_limit.minute_limit`.
pub fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
            && !rest.is_empty()
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

/// Environment provider with explicit section mapping (never `Env::split("_")`).
fn env_provider() -> Env {
    Env::prefixed("VOCALIS_").map(|key| map_env_key(key.as_str()).into())
}
