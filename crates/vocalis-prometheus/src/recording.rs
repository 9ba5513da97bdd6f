// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any installed recorder collects these.

use metrics::{describe_counter, describe_gauge, describe_histogram};

/// Register all Vocalis metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!("vocalis_requests_total", "Voice requests by outcome");
    describe_counter!(
        "vocalis_rate_limit_rejections_total",
        "Requests rejected by the rate limiter"
    );
    describe_counter!(
        "vocalis_cache_lookups_total",
        "Response cache lookups by result"
    );
    describe_histogram!("vocalis_call_cost_usd", "Cost of individual model calls in USD");
    describe_gauge!("vocalis_daily_cost_usd", "Accumulated spend for the current UTC day");
    describe_histogram!(
        "vocalis_model_latency_seconds",
        "Model call latency in seconds"
    );
}

/// Count a handled request; `outcome` is one of `answered`, `cached`,
/// `rate_limited`, `budget_exhausted`, `invalid`, `error`.
pub fn record_request(outcome: &'static str) {
    metrics::counter!("vocalis_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_rate_limit_rejection() {
    metrics::counter!("vocalis_rate_limit_rejections_total").increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("vocalis_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_call_cost(model: &str, usd: f64) {
    metrics::histogram!("vocalis_call_cost_usd", "model" => model.to_string()).record(usd);
}

pub fn set_daily_cost(usd: f64) {
    metrics::gauge!("vocalis_daily_cost_usd").set(usd);
}

pub fn record_model_latency(seconds: f64) {
    metrics::histogram!("vocalis_model_latency_seconds").record(seconds);
}
