// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the Vocalis components.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by backend health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Backend is fully operational.
    Healthy,
    /// Backend is operational but experiencing issues.
    Degraded(String),
    /// Backend is not operational.
    Unhealthy(String),
}

/// Author of a conversation turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of a voice conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Token counts reported by a model call.
///
/// For transcription calls `input_tokens` carries a word count, and for
/// speech synthesis `output_tokens` carries a character count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A chat completion request sent to a [`ModelAdapter`](crate::ModelAdapter).
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier, e.g. `gpt-4o-mini`.
    pub model: String,
    /// Optional system prompt placed before the history.
    pub system_prompt: Option<String>,
    /// Prior turns of the session, oldest first.
    pub history: Vec<ChatMessage>,
    /// The user's current question.
    pub question: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// The result of a chat completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated answer text.
    pub text: String,
    /// Model that produced the answer, as reported by the provider.
    pub model: String,
    /// Token usage for cost tracking.
    pub usage: TokenUsage,
}
