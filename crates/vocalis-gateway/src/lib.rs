// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Vocalis voice pipeline.
//!
//! Routes:
//! - `POST /api/voice-agent` ask a question
//! - `GET /api/voice-agent/status` rate-limit, cost and cache status
//! - `DELETE /api/voice-agent/sessions/{id}` forget a session
//! - `GET /health`, `GET /metrics`

pub mod handlers;
pub mod identity;
pub mod server;

pub use identity::ClientId;
pub use server::{GatewayState, HealthState, ServerConfig, build_router, start_server};
