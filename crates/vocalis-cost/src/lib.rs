// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost metering for Vocalis.
//!
//! Every model call is priced, written to an append-only usage ledger, and
//! added to the running total for the current UTC day. Crossing the alert
//! threshold or the daily limit emits a signal but never blocks; callers
//! gate spending with [`CostMonitor::is_over_daily_limit`].

pub mod ledger;
pub mod monitor;
pub mod pricing;

pub use ledger::{UsageLedger, UsageRecord};
pub use monitor::{CostAlert, CostLimits, CostMonitor, CostReceipt, UsageInput};
pub use pricing::{ModelKind, Pricing, calculate_cost};
