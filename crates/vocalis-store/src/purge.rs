// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic removal of expired entries.
//!
//! Reads already hide expired entries, but keys that are written once and
//! never read again (usage records, past daily totals, windows of callers
//! that never return) stay in the backend until a purge deletes them.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use vocalis_core::KvStore;

/// Run [`KvStore::purge_expired`] every `period` until `cancel` fires.
///
/// A failed purge is logged and retried on the next tick.
pub fn spawn_purger(
    store: Arc<dyn KvStore>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match store.purge_expired().await {
                        Ok(0) => {}
                        Ok(removed) => debug!(backend = store.name(), removed, "store purge complete"),
                        Err(e) => warn!(backend = store.name(), error = %e, "store purge failed"),
                    }
                }
                _ = cancel.cancelled() => {
                    debug!("store purger stopped");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;
    use serde_json::json;
    use vocalis_core::{ManualClock, PutOptions};

    use super::*;
    use crate::MemoryKvStore;

    #[tokio::test(start_paused = true)]
    async fn purger_removes_entries_nobody_reads() {
        let clock = ManualClock::starting_now();
        let store = Arc::new(MemoryKvStore::new(Arc::new(clock.clone())));
        for i in 0..1000 {
            store
                .put(
                    &format!("usage:{i}"),
                    json!({ "cost": 0.001 }),
                    PutOptions::ttl(48 * 3600),
                )
                .await
                .unwrap();
        }
        store
            .put("cost:daily:keep", json!(1.0), PutOptions::default())
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        let handle = spawn_purger(store.clone(), Duration::from_secs(600), cancel.clone());

        // First tick fires immediately; nothing has expired yet.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(store.stored_len(), 1001);

        clock.advance(ChronoDuration::seconds(200_000));
        assert_eq!(store.len(), 1);
        assert_eq!(store.stored_len(), 1001);

        tokio::time::sleep(Duration::from_secs(601)).await;
        assert_eq!(store.stored_len(), 1);
        assert_eq!(store.get("cost:daily:keep").await.unwrap(), Some(json!(1.0)));

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn purger_stops_on_cancel() {
        let store: Arc<dyn KvStore> =
            Arc::new(MemoryKvStore::new(Arc::new(ManualClock::starting_now())));
        let cancel = CancellationToken::new();
        let handle = spawn_purger(store, Duration::from_secs(60), cancel.clone());
        cancel.cancel();
        handle.await.unwrap();
    }
}
