// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vocalis status` command implementation.
//!
//! Reads today's accumulated spend straight from the configured store.
//! With the in-memory backend nothing survives the serving process, so the
//! figure is only meaningful for SQLite deployments.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use vocalis_config::{StoreBackend, VocalisConfig};
use vocalis_core::{Clock, KvStore, SystemClock, VocalisError};
use vocalis_cost::{CostLimits, CostMonitor};
use vocalis_store::open_store;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub date: NaiveDate,
    pub daily_cost: f64,
    pub daily_limit: f64,
    pub alert_threshold: f64,
    pub over_daily_limit: bool,
    pub store_backend: StoreBackend,
}

/// Read today's spend from `store` against the configured limits.
pub async fn collect_status(
    config: &VocalisConfig,
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
) -> Result<StatusReport, VocalisError> {
    let date = clock.now().date_naive();
    let monitor = CostMonitor::new(store, clock, CostLimits::from(&config.cost));
    let daily_cost = monitor.get_daily_cost().await?;
    let limits = monitor.limits();

    Ok(StatusReport {
        date,
        daily_cost,
        daily_limit: limits.daily_limit_usd,
        alert_threshold: limits.alert_threshold_usd,
        over_daily_limit: daily_cost >= limits.daily_limit_usd,
        store_backend: config.store.backend,
    })
}

fn format_report(report: &StatusReport) -> String {
    let mut out = format!(
        "vocalis status ({date})\n  spend:     ${cost:.4} of ${limit:.2}\n  alert at:  ${alert:.2}\n",
        date = report.date,
        cost = report.daily_cost,
        limit = report.daily_limit,
        alert = report.alert_threshold,
    );
    if report.over_daily_limit {
        out.push_str("  budget:    exhausted, model calls are refused until UTC midnight\n");
    } else {
        out.push_str("  budget:    available\n");
    }
    if report.store_backend == StoreBackend::Memory {
        out.push_str("  note:      in-memory store; spend of a running server is not visible here\n");
    }
    out
}

/// Run the `vocalis status` command.
pub async fn run_status(config: &VocalisConfig, json: bool) -> Result<(), VocalisError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = open_store(&config.store, clock.clone()).await?;
    let report = collect_status(config, store, clock).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use vocalis_core::{ManualClock, TokenUsage};
    use vocalis_cost::{ModelKind, UsageInput};
    use vocalis_store::MemoryKvStore;

    use super::*;

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn empty_store_reports_zero_spend() {
        let clock = clock();
        let store = Arc::new(MemoryKvStore::new(Arc::new(clock.clone())));

        let report = collect_status(&VocalisConfig::default(), store, Arc::new(clock))
            .await
            .unwrap();
        assert_eq!(report.daily_cost, 0.0);
        assert!(!report.over_daily_limit);
        assert_eq!(report.date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }

    #[tokio::test]
    async fn reports_spend_recorded_by_the_pipeline() {
        let clock = clock();
        let store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new(Arc::new(clock.clone())));
        let mut config = VocalisConfig::default();
        config.cost.daily_limit_usd = 0.01;
        config.cost.alert_threshold_usd = 0.005;

        let monitor = CostMonitor::new(
            store.clone(),
            Arc::new(clock.clone()),
            CostLimits::from(&config.cost),
        );
        monitor
            .track(UsageInput::new(
                "/api/voice-agent",
                ModelKind::Gpt4oMini,
                TokenUsage {
                    input_tokens: 100_000,
                    output_tokens: 0,
                },
            ))
            .await
            .unwrap();

        let report = collect_status(&config, store, Arc::new(clock)).await.unwrap();
        assert!((report.daily_cost - 0.015).abs() < 1e-12);
        assert!(report.over_daily_limit);

        let text = format_report(&report);
        assert!(text.contains("$0.0150 of $0.01"));
        assert!(text.contains("exhausted"));
        assert!(text.contains("in-memory store"));
    }

    #[test]
    fn json_report_uses_lowercase_backend() {
        let report = StatusReport {
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            daily_cost: 0.5,
            daily_limit: 10.0,
            alert_threshold: 5.0,
            over_daily_limit: false,
            store_backend: StoreBackend::Sqlite,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["date"], "2026-03-01");
        assert_eq!(value["store_backend"], "sqlite");
        assert_eq!(value["over_daily_limit"], false);
    }
}
