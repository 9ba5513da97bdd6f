// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value store backends for Vocalis.
//!
//! - [`MemoryKvStore`]: process-local, DashMap-backed.
//! - [`SqliteKvStore`]: durable, single-writer SQLite via tokio-rusqlite.
//!
//! Both enforce TTLs against an injected [`Clock`], so an entry reads as
//! absent from the instant its TTL elapses.

pub mod memory;
pub mod purge;
pub mod sqlite;

use std::sync::Arc;

use tracing::info;
use vocalis_config::model::{StoreBackend, StoreConfig};
use vocalis_core::{Clock, KvStore, VocalisError};

pub use memory::MemoryKvStore;
pub use purge::spawn_purger;
pub use sqlite::SqliteKvStore;

/// Open the backend selected by `config`.
pub async fn open_store(
    config: &StoreConfig,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn KvStore>, VocalisError> {
    let store: Arc<dyn KvStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryKvStore::new(clock)),
        StoreBackend::Sqlite => {
            if let Some(parent) = std::path::Path::new(&config.database_path).parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).map_err(|e| VocalisError::Storage {
                    source: Box::new(e),
                })?;
            }
            Arc::new(SqliteKvStore::open(&config.database_path, config.wal_mode, clock).await?)
        }
    };
    info!(backend = store.name(), "key-value store ready");
    Ok(store)
}
