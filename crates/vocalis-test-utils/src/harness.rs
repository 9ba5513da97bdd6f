// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline testing.
//!
//! `TestHarness` assembles the complete voice pipeline with a mock model,
//! a manual clock, and either an in-memory, temp SQLite, or failing store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use vocalis_agent::{VoiceOutcome, VoicePipeline, VoiceRequest};
use vocalis_config::VocalisConfig;
use vocalis_core::{Clock, KvStore, ManualClock, VocalisError};
use vocalis_store::{MemoryKvStore, SqliteKvStore};

use crate::failing_store::FailingKvStore;
use crate::mock_model::MockModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreKind {
    Memory,
    Sqlite,
    Failing,
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: VocalisConfig,
    model: MockModel,
    store: StoreKind,
    start: Option<DateTime<Utc>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: VocalisConfig::default(),
            model: MockModel::new(),
            store: StoreKind::Memory,
            start: None,
        }
    }

    /// Start from a custom configuration.
    pub fn with_config(mut self, config: VocalisConfig) -> Self {
        self.config = config;
        self
    }

    /// Queue answers on the mock model.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.model = MockModel::with_responses(responses);
        self
    }

    /// Use a specific mock model.
    pub fn with_model(mut self, model: MockModel) -> Self {
        self.model = model;
        self
    }

    /// Set the daily limit and alert threshold.
    pub fn with_budget(mut self, daily_limit_usd: f64, alert_threshold_usd: f64) -> Self {
        self.config.cost.daily_limit_usd = daily_limit_usd;
        self.config.cost.alert_threshold_usd = alert_threshold_usd;
        self
    }

    /// Back the pipeline with SQLite in a temp directory.
    pub fn with_sqlite(mut self) -> Self {
        self.store = StoreKind::Sqlite;
        self
    }

    /// Back the pipeline with a store that fails every call.
    pub fn with_failing_store(mut self) -> Self {
        self.store = StoreKind::Failing;
        self
    }

    /// Freeze the clock at `start` instead of the current time.
    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// Build the harness, creating all required components.
    pub async fn build(self) -> Result<TestHarness, VocalisError> {
        let clock = self
            .start
            .map(ManualClock::new)
            .unwrap_or_else(ManualClock::starting_now);
        let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());

        let mut temp_dir = None;
        let store: Arc<dyn KvStore> = match self.store {
            StoreKind::Memory => Arc::new(MemoryKvStore::new(shared_clock.clone())),
            StoreKind::Failing => Arc::new(FailingKvStore),
            StoreKind::Sqlite => {
                let dir = tempfile::TempDir::new().map_err(|e| VocalisError::Storage {
                    source: Box::new(e),
                })?;
                let path = dir.path().join("vocalis-test.db");
                let store =
                    SqliteKvStore::open(&path.to_string_lossy(), true, shared_clock.clone())
                        .await?;
                temp_dir = Some(dir);
                Arc::new(store)
            }
        };

        let pipeline = VoicePipeline::from_config(
            &self.config,
            store.clone(),
            shared_clock,
            Arc::new(self.model.clone()),
        )?;

        Ok(TestHarness {
            pipeline: Arc::new(pipeline),
            model: self.model,
            clock,
            store,
            config: self.config,
            _temp_dir: temp_dir,
        })
    }
}

/// A fully wired voice pipeline for integration tests.
pub struct TestHarness {
    pipeline: Arc<VoicePipeline>,
    model: MockModel,
    clock: ManualClock,
    store: Arc<dyn KvStore>,
    config: VocalisConfig,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A harness with default configuration over an in-memory store.
    pub async fn new() -> Result<Self, VocalisError> {
        Self::builder().build().await
    }

    /// Ask a question without a session.
    pub async fn ask(
        &self,
        identifier: &str,
        question: &str,
    ) -> Result<VoiceOutcome, VocalisError> {
        self.pipeline
            .handle(VoiceRequest::new(identifier, question))
            .await
    }

    /// Ask a question within a session.
    pub async fn ask_in_session(
        &self,
        identifier: &str,
        session_id: &str,
        question: &str,
    ) -> Result<VoiceOutcome, VocalisError> {
        self.pipeline
            .handle(VoiceRequest::new(identifier, question).with_session(session_id))
            .await
    }

    pub fn pipeline(&self) -> Arc<VoicePipeline> {
        self.pipeline.clone()
    }

    pub fn model(&self) -> &MockModel {
        &self.model
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn store(&self) -> Arc<dyn KvStore> {
        self.store.clone()
    }

    pub fn config(&self) -> &VocalisConfig {
        &self.config
    }
}
