// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model adapter trait for chat completion providers.

use async_trait::async_trait;

use crate::error::VocalisError;
use crate::types::{CompletionRequest, CompletionResponse};

/// Adapter for a chat completion provider.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Human-readable adapter name, used in logs.
    fn name(&self) -> &str;

    /// Sends a completion request and returns the full response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, VocalisError>;
}
