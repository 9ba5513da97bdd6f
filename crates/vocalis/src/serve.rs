// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vocalis serve` command implementation.
//!
//! Opens the configured store, wires the voice pipeline to the OpenAI
//! adapter and runs the HTTP gateway until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use vocalis_agent::{VoicePipeline, install_signal_handler};
use vocalis_config::VocalisConfig;
use vocalis_core::{Clock, ModelAdapter, SystemClock, VocalisError};
use vocalis_gateway::{GatewayState, HealthState, ServerConfig, start_server};
use vocalis_openai::OpenAiClient;
use vocalis_store::{open_store, spawn_purger};

type MetricsRender = Arc<dyn Fn() -> String + Send + Sync>;

/// Runs the `vocalis serve` command.
pub async fn run_serve(config: VocalisConfig) -> Result<(), VocalisError> {
    init_tracing(&config.agent.log_level);
    info!(name = %config.agent.name, "starting vocalis");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = open_store(&config.store, clock.clone()).await?;

    let model: Arc<dyn ModelAdapter> = Arc::new(OpenAiClient::new(&config.openai)?);
    let pipeline = Arc::new(VoicePipeline::from_config(
        &config,
        store.clone(),
        clock.clone(),
        model,
    )?);

    let health = HealthState::new(metrics_render()?);
    let cancel = install_signal_handler();
    let sweeper = pipeline.spawn_cache_sweeper(
        Duration::from_secs(config.cache.sweep_interval_secs),
        cancel.clone(),
    );
    let purger = spawn_purger(
        store.clone(),
        Duration::from_secs(config.store.purge_interval_secs),
        cancel.clone(),
    );

    let state = GatewayState {
        pipeline,
        store,
        clock,
        trusted_proxy_headers: config.gateway.trusted_proxy_headers,
        health,
    };

    let served = start_server(&ServerConfig::from(&config.gateway), state, cancel.clone()).await;

    // A bind failure returns before any signal; stop the background tasks either way.
    cancel.cancel();
    if let Some(handle) = sweeper {
        let _ = handle.await;
    }
    let _ = purger.await;

    served?;
    info!("vocalis stopped");
    Ok(())
}

#[cfg(feature = "prometheus")]
fn metrics_render() -> Result<Option<MetricsRender>, VocalisError> {
    let adapter = vocalis_prometheus::PrometheusAdapter::new()?;
    Ok(Some(Arc::new(move || adapter.render())))
}

#[cfg(not(feature = "prometheus"))]
fn metrics_render() -> Result<Option<MetricsRender>, VocalisError> {
    Ok(None)
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vocalis={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
