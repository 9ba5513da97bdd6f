// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Vocalis configuration system.

use std::io::Write;

use serial_test::serial;
use vocalis_config::diagnostic::ConfigError;
use vocalis_config::model::VocalisConfig;
use vocalis_config::{
    CacheBackend, StoreBackend, load_and_validate_path, load_and_validate_str,
    load_config_from_str,
};

#[test]
fn valid_toml_deserializes_into_vocalis_config() {
    let toml = r#"
[agent]
name = "front-desk"
log_level = "debug"
max_question_chars = 400

[rate_limit]
minute_limit = 5
hour_limit = 50

[cost]
daily_limit_usd = 20.0
alert_threshold_usd = 15.0

[cache]
backend = "store"
ttl_secs = 600

[session]
max_history = 6

[store]
backend = "sqlite"
database_path = "/tmp/vocalis-test.db"
wal_mode = false
purge_interval_secs = 120

[openai]
api_key = "sk-test"
chat_model = "gpt-4o-mini"

[gateway]
host = "0.0.0.0"
port = 8080
trusted_proxy_headers = false
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "front-desk");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.agent.max_question_chars, 400);
    assert_eq!(config.rate_limit.minute_limit, 5);
    assert_eq!(config.rate_limit.hour_limit, 50);
    assert_eq!(config.rate_limit.block_secs, 3600);
    assert_eq!(config.cost.daily_limit_usd, 20.0);
    assert_eq!(config.cost.alert_threshold_usd, 15.0);
    assert_eq!(config.cache.backend, CacheBackend::Store);
    assert_eq!(config.cache.ttl_secs, 600);
    assert_eq!(config.cache.capacity, 100);
    assert_eq!(config.session.max_history, 6);
    assert_eq!(config.store.backend, StoreBackend::Sqlite);
    assert_eq!(config.store.database_path, "/tmp/vocalis-test.db");
    assert!(!config.store.wal_mode);
    assert_eq!(config.store.purge_interval_secs, 120);
    assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.gateway.host, "0.0.0.0");
    assert_eq!(config.gateway.port, 8080);
    assert!(!config.gateway.trusted_proxy_headers);
}

#[test]
fn missing_sections_use_production_limits() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "vocalis");
    assert_eq!(config.rate_limit.minute_limit, 10);
    assert_eq!(config.rate_limit.hour_limit, 100);
    assert_eq!(config.rate_limit.block_secs, 3600);
    assert_eq!(config.rate_limit.min_ttl_secs, 60);
    assert_eq!(config.cost.daily_limit_usd, 10.0);
    assert_eq!(config.cost.alert_threshold_usd, 5.0);
    assert_eq!(config.cost.usage_ttl_secs, 172_800);
    assert_eq!(config.cache.backend, CacheBackend::Memory);
    assert_eq!(config.cache.ttl_secs, 86_400);
    assert_eq!(config.cache.capacity, 100);
    assert_eq!(config.session.ttl_secs, 3600);
    assert_eq!(config.session.max_history, 10);
    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert!(config.openai.api_key.is_none());
    assert_eq!(config.openai.chat_model, "gpt-4o-mini");
    assert_eq!(config.gateway.max_body_bytes, 16 * 1024);
}

#[test]
fn unknown_key_gets_suggestion() {
    let toml = r#"
[rate_limit]
minute_limt = 3
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } if key == "minute_limt" => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("minute_limit"));
}

#[test]
fn unknown_backend_is_invalid_value() {
    let toml = r#"
[store]
backend = "redis"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown backend");
    assert!(
        errors
            .iter()
            .any(|e| e.to_string().contains("redis") || e.to_string().contains("backend")),
        "got: {errors:?}"
    );
}

#[test]
fn semantic_errors_are_collected() {
    let toml = r#"
[cost]
daily_limit_usd = 1.0
alert_threshold_usd = 2.0

[session]
ttl_secs = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2);
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, ConfigError::Validation { .. }))
    );
}

#[test]
fn figment_merge_overrides_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: VocalisConfig = Figment::new()
        .merge(Serialized::defaults(VocalisConfig::default()))
        .merge(Toml::string("[gateway]\nport = 4000\n"))
        .merge(("gateway.port", 5000))
        .extract()
        .expect("should merge override");

    assert_eq!(config.gateway.port, 5000);
}

#[test]
#[serial]
fn env_var_overrides_file_value() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[rate_limit]\nhour_limit = 40").expect("write config");

    // SAFETY: tests touching the environment are serialized.
    unsafe { std::env::set_var("VOCALIS_RATE_LIMIT_HOUR_LIMIT", "75") };
    let result = load_and_validate_path(file.path());
    unsafe { std::env::remove_var("VOCALIS_RATE_LIMIT_HOUR_LIMIT") };

    let config = result.expect("config should load");
    assert_eq!(config.rate_limit.hour_limit, 75);
}

#[test]
#[serial]
fn env_var_with_underscored_key_maps_to_one_field() {
    let file = tempfile::NamedTempFile::new().expect("temp file");

    // SAFETY: tests touching the environment are serialized.
    unsafe { std::env::set_var("VOCALIS_GATEWAY_TRUSTED_PROXY_HEADERS", "false") };
    let result = load_and_validate_path(file.path());
    unsafe { std::env::remove_var("VOCALIS_GATEWAY_TRUSTED_PROXY_HEADERS") };

    let config = result.expect("config should load");
    assert!(!config.gateway.trusted_proxy_headers);
}
