// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests over a real socket and a SQLite store on disk.
//!
//! Each test serves the gateway on an ephemeral port, drives it with reqwest,
//! then reopens the database file as a restarted process would.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use vocalis_agent::VoicePipeline;
use vocalis_config::{CacheBackend, StoreBackend, VocalisConfig};
use vocalis_core::{Clock, KvStore, ManualClock};
use vocalis_cost::{CostLimits, CostMonitor};
use vocalis_gateway::{GatewayState, HealthState, build_router};
use vocalis_store::open_store;
use vocalis_test_utils::MockModel;

struct RunningGateway {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RunningGateway {
    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn shutdown(self) {
        let _ = self.stop.send(());
        self.task.await.unwrap();
    }
}

fn sqlite_config(dir: &tempfile::TempDir) -> VocalisConfig {
    let mut config = VocalisConfig::default();
    config.store.backend = StoreBackend::Sqlite;
    config.store.database_path = dir.path().join("vocalis.db").display().to_string();
    config.cache.backend = CacheBackend::Store;
    config
}

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap())
}

async fn serve(config: &VocalisConfig, clock: &ManualClock, model: MockModel) -> RunningGateway {
    let clock: Arc<dyn Clock> = Arc::new(clock.clone());
    let store = open_store(&config.store, clock.clone()).await.unwrap();
    let pipeline =
        VoicePipeline::from_config(config, store.clone(), clock.clone(), Arc::new(model)).unwrap();
    let state = GatewayState {
        pipeline: Arc::new(pipeline),
        store,
        clock,
        trusted_proxy_headers: false,
        health: HealthState::new(None),
    };
    let app = build_router(state, config.gateway.max_body_bytes);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = stopped.await;
        })
        .await
        .unwrap();
    });

    RunningGateway { addr, stop, task }
}

async fn ask(client: &reqwest::Client, gateway: &RunningGateway, question: &str) -> (u16, Value) {
    let response = client
        .post(gateway.url("/api/voice-agent"))
        .json(&json!({ "question": question }))
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn spend_and_cache_survive_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = sqlite_config(&dir);
    let clock = clock();
    let client = reqwest::Client::new();

    let gateway = serve(
        &config,
        &clock,
        MockModel::with_responses(vec!["Plans start at $99 a month.".into()]),
    )
    .await;

    let (status, body) = ask(&client, &gateway, "How much does it cost?").await;
    assert_eq!(status, 200);
    assert_eq!(body["cached"], false);

    let (status, body) = ask(&client, &gateway, "What's your pricing?").await;
    assert_eq!(status, 200);
    assert_eq!(body["cached"], true);
    assert_eq!(body["answer"], "Plans start at $99 a month.");
    assert_eq!(body["remaining"], 8);

    // Without proxy headers the caller is identified by its peer address.
    let status: Value = client
        .get(gateway.url("/api/voice-agent/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["rate_limit"]["identifier"], "127.0.0.1");
    assert_eq!(status["rate_limit"]["minute"]["count"], 2);

    gateway.shutdown().await;

    // A restarted process sees the recorded spend.
    let store: Arc<dyn KvStore> = open_store(&config.store, Arc::new(clock.clone()))
        .await
        .unwrap();
    let monitor = CostMonitor::new(
        store,
        Arc::new(clock.clone()),
        CostLimits::from(&config.cost),
    );
    let spent = monitor.get_daily_cost().await.unwrap();
    assert!((spent - 0.000045).abs() < 1e-12, "spent {spent}");

    // And serves the cached answer without touching the model.
    let model = MockModel::failing("model should not be called");
    let gateway = serve(&config, &clock, model.clone()).await;
    let (status, body) = ask(&client, &gateway, "how much is it").await;
    assert_eq!(status, 200);
    assert_eq!(body["cached"], true);
    assert_eq!(model.call_count().await, 0);
    gateway.shutdown().await;
}

#[tokio::test]
async fn rate_limit_block_persists_across_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut config = sqlite_config(&dir);
    config.rate_limit.minute_limit = 2;
    let clock = clock();
    let client = reqwest::Client::new();

    let gateway = serve(&config, &clock, MockModel::new()).await;
    for _ in 0..2 {
        let (status, _) = ask(&client, &gateway, "Tell me about your team").await;
        assert_eq!(status, 200);
    }
    let (status, body) = ask(&client, &gateway, "Tell me about your team").await;
    assert_eq!(status, 429);
    assert!(body["error"].as_str().unwrap().contains("Blocked for 1 hour"));
    gateway.shutdown().await;

    clock.advance_secs(120);
    let gateway = serve(&config, &clock, MockModel::new()).await;
    let response = client
        .post(gateway.url("/api/voice-agent"))
        .json(&json!({ "question": "Tell me about your team" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 429);
    assert_eq!(response.headers()["retry-after"], "3480");
    gateway.shutdown().await;
}
