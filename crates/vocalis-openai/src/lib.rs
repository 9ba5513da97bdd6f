// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI adapter for Vocalis.
//!
//! Implements [`ModelAdapter`] over the chat-completions endpoint. The
//! system prompt leads, followed by the session history and the current
//! question as the final user turn.

pub mod client;
pub mod types;

use async_trait::async_trait;
use tracing::debug;
use vocalis_core::{CompletionRequest, CompletionResponse, ModelAdapter, TokenUsage, VocalisError};

pub use client::OpenAiClient;

use crate::types::{ChatCompletionRequest, WireMessage};

/// Build the wire request for a completion.
pub fn to_wire(request: &CompletionRequest) -> ChatCompletionRequest {
    let mut messages = Vec::with_capacity(request.history.len() + 2);
    if let Some(system) = &request.system_prompt {
        messages.push(WireMessage::new("system", system.clone()));
    }
    messages.extend(
        request
            .history
            .iter()
            .map(|m| WireMessage::new(&m.role.to_string(), m.content.clone())),
    );
    messages.push(WireMessage::new("user", request.question.clone()));
    ChatCompletionRequest {
        model: request.model.clone(),
        messages,
        max_tokens: request.max_tokens,
    }
}

#[async_trait]
impl ModelAdapter for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, VocalisError> {
        let response = self.chat_completion(&to_wire(&request)).await?;
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| VocalisError::provider("API returned no choices"))?;
        let usage = response
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();
        debug!(model = %response.model, chars = text.len(), "completion received");

        Ok(CompletionResponse {
            text,
            model: response.model,
            usage,
        })
    }
}
