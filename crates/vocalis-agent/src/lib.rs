// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Voice request pipeline for Vocalis.
//!
//! The [`VoicePipeline`] is the central coordinator that, per request:
//! - Checks the caller against the rate limiter
//! - Serves topic-matched questions from the response cache
//! - Refuses model calls once the daily budget is spent
//! - Calls the model with the session history and records the cost
//! - Stores cacheable answers and appends both turns to the session
//!
//! [`shutdown`] wires SIGINT/SIGTERM to a cancellation token.

pub mod pipeline;
pub mod shutdown;

pub use pipeline::{
    PipelineParts, PipelineSettings, VOICE_ENDPOINT, VoiceAnswer, VoiceOutcome, VoicePipeline,
    VoiceRequest,
};
pub use shutdown::install_signal_handler;
