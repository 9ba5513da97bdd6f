// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Vocalis integration tests.
//!
//! Provides mock collaborators and a harness for fast, deterministic,
//! CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockModel`] - Model adapter with queued answers
//! - [`FailingKvStore`] - Key-value store whose every call fails
//! - [`TestHarness`] - Full voice pipeline over an in-memory or temp SQLite
//!   store driven by a [`ManualClock`](vocalis_core::ManualClock)

pub mod failing_store;
pub mod harness;
pub mod mock_model;

pub use failing_store::FailingKvStore;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_model::MockModel;
