// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock model adapter for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use vocalis_core::{CompletionRequest, CompletionResponse, ModelAdapter, TokenUsage, VocalisError};

/// A model adapter that returns pre-configured answers.
///
/// Answers are popped from a FIFO queue. When the queue is empty, a
/// default "mock answer" text is returned. Every request is kept for
/// later inspection.
#[derive(Clone)]
pub struct MockModel {
    responses: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    usage: TokenUsage,
    failure: Option<String>,
}

impl MockModel {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            usage: TokenUsage {
                input_tokens: 100,
                output_tokens: 50,
            },
            failure: None,
        }
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            ..Self::new()
        }
    }

    /// Report `usage` for every call.
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Fail every call with a provider error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(text.into());
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelAdapter for MockModel {
    fn name(&self) -> &str {
        "mock-model"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, VocalisError> {
        let model = request.model.clone();
        self.requests.lock().await.push(request);
        if let Some(message) = &self.failure {
            return Err(VocalisError::provider(message.clone()));
        }
        let text = self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock answer".to_string());
        Ok(CompletionResponse {
            text,
            model,
            usage: self.usage,
        })
    }
}
