// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Vocalis.

use thiserror::Error;

/// The primary error type used across all Vocalis components.
#[derive(Debug, Error)]
pub enum VocalisError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Key-value store errors (connection failure, query failure, unavailable backend).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A stored value could not be encoded or decoded.
    #[error("serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// Model provider errors (API failure, bad status, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Caller-supplied input was malformed. Never retried, never a system fault.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VocalisError {
    /// Build a storage error from a plain message.
    pub fn storage(message: impl Into<String>) -> Self {
        VocalisError::Storage {
            source: message.into().into(),
        }
    }

    /// Build a provider error without an underlying cause.
    pub fn provider(message: impl Into<String>) -> Self {
        VocalisError::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Returns `true` when the error was caused by caller input rather than a fault.
    pub fn is_validation(&self) -> bool {
        matches!(self, VocalisError::Validation(_))
    }
}
