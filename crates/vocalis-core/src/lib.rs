// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Vocalis.
//!
//! This crate provides the collaborator traits (key-value store, model
//! adapter), the shared error type, the injectable clock, and the common
//! types used throughout the Vocalis workspace.

pub mod clock;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::VocalisError;
pub use types::{
    ChatMessage, CompletionRequest, CompletionResponse, HealthStatus, Role, TokenUsage,
};

pub use traits::{KvStore, KvStoreExt, ModelAdapter, PutOptions};
