// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-call cost tracking with daily thresholds.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};
use vocalis_config::model::CostConfig;
use vocalis_core::{Clock, KvStore, TokenUsage, VocalisError};

use crate::ledger::{UsageLedger, UsageRecord};
use crate::pricing::{ModelKind, calculate_cost};

/// Spend thresholds and retention.
#[derive(Debug, Clone, PartialEq)]
pub struct CostLimits {
    pub daily_limit_usd: f64,
    pub alert_threshold_usd: f64,
    pub usage_ttl_secs: u64,
    pub daily_total_ttl_secs: u64,
}

impl Default for CostLimits {
    fn default() -> Self {
        Self::from(&CostConfig::default())
    }
}

impl From<&CostConfig> for CostLimits {
    fn from(config: &CostConfig) -> Self {
        Self {
            daily_limit_usd: config.daily_limit_usd,
            alert_threshold_usd: config.alert_threshold_usd,
            usage_ttl_secs: config.usage_ttl_secs,
            daily_total_ttl_secs: config.daily_total_ttl_secs,
        }
    }
}

/// Usage reported for one model call.
#[derive(Debug, Clone)]
pub struct UsageInput {
    pub endpoint: String,
    pub model: ModelKind,
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Served from cache; always costs zero.
    pub cached: bool,
    pub ip: Option<String>,
}

impl UsageInput {
    pub fn new(endpoint: impl Into<String>, model: ModelKind, usage: TokenUsage) -> Self {
        Self {
            endpoint: endpoint.into(),
            model,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            cached: false,
            ip: None,
        }
    }

    pub fn cached(mut self, cached: bool) -> Self {
        self.cached = cached;
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }
}

/// Threshold crossed by the updated daily total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CostAlert {
    /// At or above the alert threshold.
    Warning,
    /// At or above the daily limit.
    Critical,
}

/// Result of recording one call.
#[derive(Debug, Clone, PartialEq)]
pub struct CostReceipt {
    pub cost: f64,
    pub daily_total: f64,
    pub alert: Option<CostAlert>,
}

/// Prices calls, appends them to the ledger, and maintains the daily total.
pub struct CostMonitor {
    ledger: UsageLedger,
    clock: Arc<dyn Clock>,
    limits: CostLimits,
}

impl CostMonitor {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, limits: CostLimits) -> Self {
        Self {
            ledger: UsageLedger::new(store, limits.usage_ttl_secs, limits.daily_total_ttl_secs),
            clock,
            limits,
        }
    }

    pub fn limits(&self) -> &CostLimits {
        &self.limits
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    /// Record one call and return its cost.
    pub async fn track(&self, input: UsageInput) -> Result<f64, VocalisError> {
        Ok(self.record(input).await?.cost)
    }

    /// Record one call and report the updated daily total and any threshold crossed.
    pub async fn record(&self, input: UsageInput) -> Result<CostReceipt, VocalisError> {
        let now = self.clock.now();
        let cost = if input.cached {
            0.0
        } else {
            calculate_cost(
                input.model,
                &TokenUsage {
                    input_tokens: input.input_tokens,
                    output_tokens: input.output_tokens,
                },
            )
        };

        let record = UsageRecord {
            timestamp: now,
            endpoint: input.endpoint,
            model: input.model,
            input_tokens: input.input_tokens,
            output_tokens: input.output_tokens,
            cost,
            cached: input.cached,
            ip: input.ip,
        };
        self.ledger.append(&record).await?;

        let daily_total = self.ledger.add_to_daily_total(now.date_naive(), cost).await?;
        info!(
            endpoint = %record.endpoint,
            model = %record.model,
            cost,
            daily_total,
            cached = record.cached,
            "usage cost recorded"
        );

        let alert = self.classify(daily_total);
        match alert {
            Some(CostAlert::Critical) => error!(
                daily_total,
                daily_limit = self.limits.daily_limit_usd,
                "daily cost limit reached"
            ),
            Some(CostAlert::Warning) => warn!(
                daily_total,
                alert_threshold = self.limits.alert_threshold_usd,
                "daily cost alert threshold reached"
            ),
            None => {}
        }

        Ok(CostReceipt {
            cost,
            daily_total,
            alert,
        })
    }

    /// Today's accumulated spend (UTC).
    pub async fn get_daily_cost(&self) -> Result<f64, VocalisError> {
        self.ledger.daily_total(self.clock.now().date_naive()).await
    }

    /// Whether today's spend has reached the daily limit.
    pub async fn is_over_daily_limit(&self) -> Result<bool, VocalisError> {
        Ok(self.get_daily_cost().await? >= self.limits.daily_limit_usd)
    }

    fn classify(&self, daily_total: f64) -> Option<CostAlert> {
        if daily_total >= self.limits.daily_limit_usd {
            Some(CostAlert::Critical)
        } else if daily_total >= self.limits.alert_threshold_usd {
            Some(CostAlert::Warning)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tracing_test::traced_test;
    use vocalis_core::ManualClock;
    use vocalis_store::MemoryKvStore;

    use super::*;

    fn monitor(limits: CostLimits) -> (CostMonitor, ManualClock) {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 23, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let store = Arc::new(MemoryKvStore::new(Arc::new(clock.clone())));
        (
            CostMonitor::new(store, Arc::new(clock.clone()), limits),
            clock,
        )
    }

    fn chat(input: u32, output: u32) -> UsageInput {
        UsageInput::new(
            "/api/voice-agent",
            ModelKind::Gpt4oMini,
            TokenUsage {
                input_tokens: input,
                output_tokens: output,
            },
        )
    }

    #[tokio::test]
    async fn track_returns_priced_cost_and_accumulates() {
        let (monitor, _) = monitor(CostLimits::default());

        let cost = monitor.track(chat(1000, 500)).await.unwrap();
        let expected = 1000.0 * 0.15 / 1e6 + 500.0 * 0.60 / 1e6;
        assert!((cost - expected).abs() < 1e-12);

        monitor.track(chat(1000, 500)).await.unwrap();
        let total = monitor.get_daily_cost().await.unwrap();
        assert!((total - 2.0 * expected).abs() < 1e-12);
    }

    #[tokio::test]
    async fn cached_usage_is_free_but_recorded() {
        let (monitor, _) = monitor(CostLimits::default());

        let receipt = monitor.record(chat(1000, 500).cached(true)).await.unwrap();
        assert_eq!(receipt.cost, 0.0);
        assert_eq!(receipt.daily_total, 0.0);
    }

    #[tokio::test]
    async fn daily_total_starts_over_at_utc_midnight() {
        let (monitor, clock) = monitor(CostLimits::default());
        monitor.track(chat(1_000_000, 0)).await.unwrap();
        assert!(monitor.get_daily_cost().await.unwrap() > 0.0);

        clock.advance_secs(3600);
        assert_eq!(monitor.get_daily_cost().await.unwrap(), 0.0);
    }

    #[tokio::test]
    #[traced_test]
    async fn thresholds_escalate() {
        let limits = CostLimits {
            daily_limit_usd: 1.0,
            alert_threshold_usd: 0.5,
            ..CostLimits::default()
        };
        let (monitor, _) = monitor(limits);
        let tts = |chars: u32| {
            UsageInput::new(
                "/api/voice-agent/speech",
                ModelKind::Tts1,
                TokenUsage {
                    input_tokens: 0,
                    output_tokens: chars,
                },
            )
        };

        // 20k characters of speech = $0.30
        let first = monitor.record(tts(20_000)).await.unwrap();
        assert_eq!(first.alert, None);
        assert!(!monitor.is_over_daily_limit().await.unwrap());

        let second = monitor.record(tts(20_000)).await.unwrap();
        assert_eq!(second.alert, Some(CostAlert::Warning));
        assert!(logs_contain("alert threshold reached"));

        let third = monitor.record(tts(30_000)).await.unwrap();
        assert_eq!(third.alert, Some(CostAlert::Critical));
        assert!(logs_contain("daily cost limit reached"));
        assert!(monitor.is_over_daily_limit().await.unwrap());
    }
}
