// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for backend selection and SQLite durability.

use std::sync::Arc;

use serde_json::json;
use tempfile::tempdir;
use vocalis_config::model::{StoreBackend, StoreConfig};
use vocalis_core::{Clock, KvStore, ManualClock, PutOptions, SystemClock};
use vocalis_store::{SqliteKvStore, open_store};

#[tokio::test]
async fn open_store_selects_memory_backend() {
    let config = StoreConfig::default();
    let store = open_store(&config, Arc::new(SystemClock)).await.unwrap();
    assert_eq!(store.name(), "memory");
}

#[tokio::test]
async fn open_store_creates_sqlite_parent_dirs() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("nested").join("vocalis.db");
    let config = StoreConfig {
        backend: StoreBackend::Sqlite,
        database_path: db_path.to_string_lossy().into_owned(),
        wal_mode: true,
        ..StoreConfig::default()
    };

    let store = open_store(&config, Arc::new(SystemClock)).await.unwrap();
    assert_eq!(store.name(), "sqlite");
    assert!(db_path.exists(), "database file should be created");
}

#[tokio::test]
async fn sqlite_values_survive_reopen_with_ttl() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("kv.db");
    let path = db_path.to_str().unwrap();
    let clock = ManualClock::starting_now();
    let shared: Arc<dyn Clock> = Arc::new(clock.clone());

    {
        let store = SqliteKvStore::open(path, true, shared.clone()).await.unwrap();
        store
            .put("cost:daily:2026-03-01", json!(1.25), PutOptions::ttl(3600))
            .await
            .unwrap();
        store.checkpoint().await.unwrap();
    }

    let store = SqliteKvStore::open(path, true, shared).await.unwrap();
    assert_eq!(
        store.get("cost:daily:2026-03-01").await.unwrap(),
        Some(json!(1.25))
    );

    clock.advance_secs(3600);
    assert_eq!(store.get("cost:daily:2026-03-01").await.unwrap(), None);
}

#[tokio::test]
async fn purge_through_trait_deletes_expired_sqlite_rows() {
    let dir = tempdir().unwrap();
    let clock = ManualClock::starting_now();
    let config = StoreConfig {
        backend: StoreBackend::Sqlite,
        database_path: dir.path().join("kv.db").to_string_lossy().into_owned(),
        ..StoreConfig::default()
    };
    let store = open_store(&config, Arc::new(clock.clone())).await.unwrap();

    for i in 0..5 {
        store
            .put(&format!("usage:{i}"), json!(i), PutOptions::ttl(60))
            .await
            .unwrap();
    }
    store
        .put("session:keep", json!("x"), PutOptions::ttl(3600))
        .await
        .unwrap();

    assert_eq!(store.purge_expired().await.unwrap(), 0);
    clock.advance_secs(61);
    assert_eq!(store.purge_expired().await.unwrap(), 5);
    assert_eq!(store.purge_expired().await.unwrap(), 0);
    assert_eq!(store.get("session:keep").await.unwrap(), Some(json!("x")));
}
