// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use vocalis_agent::{VoiceOutcome, VoiceRequest};
use vocalis_cache::{CacheStats, ResponseCache};
use vocalis_core::{Clock, HealthStatus, KvStore, VocalisError};
use vocalis_ratelimit::{RateLimitStats, RateLimitStatus};

use crate::identity::ClientId;
use crate::server::GatewayState;

/// Request body for `POST /api/voice-agent`.
#[derive(Debug, Deserialize)]
pub struct VoiceAgentRequest {
    pub question: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response body for an answered question.
#[derive(Debug, Serialize)]
pub struct VoiceAgentResponse {
    pub answer: String,
    pub cached: bool,
    pub session_id: Option<String>,
    pub remaining: u32,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_time: Option<DateTime<Utc>>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            reset_time: None,
        }
    }
}

/// Response body for `GET /api/voice-agent/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub rate_limit: RateLimitStatus,
    pub limiter: RateLimitStats,
    pub daily_cost: f64,
    pub daily_limit: f64,
    pub over_daily_limit: bool,
    pub cache: CacheStats,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub store: String,
}

/// POST /api/voice-agent
pub async fn post_voice_agent(
    State(state): State<GatewayState>,
    ClientId(identifier): ClientId,
    body: Result<Json<VoiceAgentRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!(status = %rejection.status(), "rejected request body");
            return (rejection.status(), Json(ErrorResponse::new(rejection.body_text())))
                .into_response();
        }
    };

    let mut request = VoiceRequest::new(identifier, body.question);
    request.session_id = body.session_id;

    match state.pipeline.handle(request).await {
        Ok(VoiceOutcome::Answered(answer)) => (
            StatusCode::OK,
            Json(VoiceAgentResponse {
                answer: answer.answer,
                cached: answer.cached,
                session_id: answer.session_id,
                remaining: answer.remaining,
            }),
        )
            .into_response(),
        Ok(VoiceOutcome::RateLimited(result)) => {
            let retry_after = result.retry_after_secs(state.clock.now());
            let body = ErrorResponse {
                error: result
                    .reason
                    .unwrap_or_else(|| "Too many requests.".to_string()),
                reset_time: Some(result.reset_time),
            };
            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
        Ok(VoiceOutcome::BudgetExhausted { .. }) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new(
                "The assistant is unavailable for the rest of the day.",
            )),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/voice-agent/status
pub async fn get_status(
    State(state): State<GatewayState>,
    ClientId(identifier): ClientId,
) -> Response {
    match collect_status(&state, &identifier).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn collect_status(
    state: &GatewayState,
    identifier: &str,
) -> Result<StatusResponse, VocalisError> {
    let pipeline = &state.pipeline;
    let daily_cost = pipeline.cost().get_daily_cost().await?;
    let daily_limit = pipeline.cost().limits().daily_limit_usd;
    Ok(StatusResponse {
        rate_limit: pipeline.limiter().status(identifier).await?,
        limiter: pipeline.limiter().stats(),
        daily_cost,
        daily_limit,
        over_daily_limit: daily_cost >= daily_limit,
        cache: pipeline.cache().stats().await?,
    })
}

/// DELETE /api/voice-agent/sessions/{id}
pub async fn delete_session(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    match state.pipeline.sessions().delete_session(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let (code, status, store) = match state.store.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "ok", "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, "degraded", reason),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", reason)
        }
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", e.to_string()),
    };
    let body = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        store,
    };
    (code, Json(body)).into_response()
}

/// GET /metrics
pub async fn get_metrics(State(state): State<GatewayState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("metrics are not enabled")),
        )
            .into_response(),
    }
}

/// Map a pipeline error to a response. Caller mistakes are echoed back;
/// faults are logged and reported generically.
fn error_response(e: VocalisError) -> Response {
    let (status, message) = match &e {
        VocalisError::Validation(_) => {
            debug!(error = %e, "rejected invalid request");
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        VocalisError::Timeout { .. } => {
            error!(error = %e, "request failed");
            (
                StatusCode::GATEWAY_TIMEOUT,
                "The assistant took too long to answer.".to_string(),
            )
        }
        _ => {
            error!(error = %e, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error.".to_string(),
            )
        }
    };
    (status, Json(ErrorResponse::new(message))).into_response()
}
