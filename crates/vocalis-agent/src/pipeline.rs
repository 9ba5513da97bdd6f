// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One voice request, end to end.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vocalis_cache::{CachedAnswer, MemoryResponseCache, ResponseCache, build_cache};
use vocalis_config::VocalisConfig;
use vocalis_core::{
    Clock, CompletionRequest, CompletionResponse, KvStore, ModelAdapter, Role, TokenUsage,
    VocalisError,
};
use vocalis_cost::{CostLimits, CostMonitor, ModelKind, UsageInput};
use vocalis_ratelimit::{RateLimitPolicy, RateLimitResult, RateLimiter};
use vocalis_session::{SessionStore, validate_session_id};

/// Endpoint recorded on usage entries for voice questions.
pub const VOICE_ENDPOINT: &str = "/api/voice-agent";

/// Per-request knobs taken from configuration.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub chat_model: ModelKind,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub max_question_chars: usize,
    /// Upper bound on a single model call.
    pub model_timeout: Duration,
}

impl PipelineSettings {
    pub fn from_config(config: &VocalisConfig) -> Result<Self, VocalisError> {
        let chat_model = ModelKind::parse(&config.openai.chat_model)
            .map_err(|e| VocalisError::Config(format!("openai.chat_model: {e}")))?;
        Ok(Self {
            chat_model,
            system_prompt: config.agent.system_prompt.clone(),
            max_tokens: config.openai.max_tokens,
            max_question_chars: config.agent.max_question_chars,
            model_timeout: Duration::from_secs(config.openai.timeout_secs),
        })
    }
}

/// An inbound voice question.
#[derive(Debug, Clone)]
pub struct VoiceRequest {
    pub question: String,
    pub session_id: Option<String>,
    /// Rate-limit key, normally the client address.
    pub identifier: String,
}

impl VoiceRequest {
    pub fn new(identifier: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            session_id: None,
            identifier: identifier.into(),
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// A successful answer.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceAnswer {
    pub answer: String,
    /// Served from the response cache.
    pub cached: bool,
    pub session_id: Option<String>,
    /// Requests left in the caller's tighter rate-limit window.
    pub remaining: u32,
}

/// How a request ended, short of an error.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceOutcome {
    Answered(VoiceAnswer),
    RateLimited(RateLimitResult),
    BudgetExhausted { daily_cost: f64, daily_limit: f64 },
}

/// The shared components a pipeline drives.
pub struct PipelineParts {
    pub limiter: Arc<RateLimiter>,
    pub cost: Arc<CostMonitor>,
    pub cache: Arc<dyn ResponseCache>,
    pub sessions: Arc<SessionStore>,
    pub model: Arc<dyn ModelAdapter>,
}

/// Orchestrates rate limiting, caching, budget gating, the model call,
/// cost tracking and session history for each voice request.
pub struct VoicePipeline {
    parts: PipelineParts,
    settings: PipelineSettings,
    memory_cache: Option<Arc<MemoryResponseCache>>,
}

impl VoicePipeline {
    pub fn new(parts: PipelineParts, settings: PipelineSettings) -> Self {
        Self {
            parts,
            settings,
            memory_cache: None,
        }
    }

    /// Build every component from configuration over one shared store.
    pub fn from_config(
        config: &VocalisConfig,
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        model: Arc<dyn ModelAdapter>,
    ) -> Result<Self, VocalisError> {
        let settings = PipelineSettings::from_config(config)?;
        let (cache, memory_cache) = build_cache(&config.cache, store.clone(), clock.clone());
        let parts = PipelineParts {
            limiter: Arc::new(RateLimiter::new(
                store.clone(),
                clock.clone(),
                RateLimitPolicy::from(&config.rate_limit),
            )),
            cost: Arc::new(CostMonitor::new(
                store.clone(),
                clock.clone(),
                CostLimits::from(&config.cost),
            )),
            cache,
            sessions: Arc::new(SessionStore::from_config(store, clock, &config.session)),
            model,
        };
        info!(
            model = %settings.chat_model,
            adapter = parts.model.name(),
            "voice pipeline ready"
        );
        Ok(Self {
            parts,
            settings,
            memory_cache,
        })
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.parts.limiter
    }

    pub fn cost(&self) -> &CostMonitor {
        &self.parts.cost
    }

    pub fn cache(&self) -> &dyn ResponseCache {
        self.parts.cache.as_ref()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.parts.sessions
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Start the expiry sweeper when the in-memory cache is in use.
    pub fn spawn_cache_sweeper(
        &self,
        period: Duration,
        cancel: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        self.memory_cache
            .as_ref()
            .map(|cache| cache.clone().spawn_sweeper(period, cancel))
    }

    /// Handle one voice request.
    ///
    /// Rejections by the rate limiter or the daily budget are outcomes, not
    /// errors. Errors are validation failures (caller input) or faults in
    /// the store or the model.
    pub async fn handle(&self, request: VoiceRequest) -> Result<VoiceOutcome, VocalisError> {
        let result = self.process(request).await;
        #[cfg(feature = "prometheus")]
        vocalis_prometheus::record_request(outcome_label(&result));
        result
    }

    async fn process(&self, request: VoiceRequest) -> Result<VoiceOutcome, VocalisError> {
        let question = self.validate_question(&request.question)?;
        if let Some(id) = &request.session_id {
            validate_session_id(id)?;
        }
        let session_id = request.session_id.as_deref();
        let identifier = request.identifier.as_str();

        let limit = self.parts.limiter.check(identifier).await?;
        if !limit.allowed {
            debug!(identifier, reset_time = %limit.reset_time, "request rate limited");
            #[cfg(feature = "prometheus")]
            vocalis_prometheus::record_rate_limit_rejection();
            return Ok(VoiceOutcome::RateLimited(limit));
        }

        if let Some(hit) = self.cached_answer(question).await {
            self.parts
                .cost
                .track(
                    UsageInput::new(VOICE_ENDPOINT, self.settings.chat_model, TokenUsage::default())
                        .cached(true)
                        .with_ip(identifier),
                )
                .await?;
            self.remember(session_id, question, &hit.text).await?;
            return Ok(VoiceOutcome::Answered(VoiceAnswer {
                answer: hit.text,
                cached: true,
                session_id: request.session_id,
                remaining: limit.remaining,
            }));
        }

        if self.parts.cost.is_over_daily_limit().await? {
            let daily_cost = self.parts.cost.get_daily_cost().await?;
            let daily_limit = self.parts.cost.limits().daily_limit_usd;
            warn!(daily_cost, daily_limit, "daily budget exhausted, refusing model call");
            return Ok(VoiceOutcome::BudgetExhausted {
                daily_cost,
                daily_limit,
            });
        }

        let history = match session_id {
            Some(id) => self
                .parts
                .sessions
                .get_session(id)
                .await?
                .map(|s| s.messages)
                .unwrap_or_default(),
            None => Vec::new(),
        };
        let completion = self
            .complete(CompletionRequest {
                model: self.settings.chat_model.to_string(),
                system_prompt: Some(self.settings.system_prompt.clone()),
                history,
                question: question.to_string(),
                max_tokens: self.settings.max_tokens,
            })
            .await?;

        let receipt = self
            .parts
            .cost
            .record(
                UsageInput::new(VOICE_ENDPOINT, self.settings.chat_model, completion.usage)
                    .with_ip(identifier),
            )
            .await?;
        #[cfg(feature = "prometheus")]
        {
            vocalis_prometheus::record_call_cost(&completion.model, receipt.cost);
            vocalis_prometheus::set_daily_cost(receipt.daily_total);
        }
        debug!(cost = receipt.cost, daily_total = receipt.daily_total, "model answer priced");

        if let Err(e) = self.parts.cache.set(question, &completion.text).await {
            warn!(error = %e, "response cache write failed, continuing without caching");
        }
        self.remember(session_id, question, &completion.text).await?;

        Ok(VoiceOutcome::Answered(VoiceAnswer {
            answer: completion.text,
            cached: false,
            session_id: request.session_id,
            remaining: limit.remaining,
        }))
    }

    fn validate_question<'a>(&self, question: &'a str) -> Result<&'a str, VocalisError> {
        let question = question.trim();
        if question.is_empty() {
            debug!("rejected empty question");
            return Err(VocalisError::Validation("question must not be empty".into()));
        }
        let max = self.settings.max_question_chars;
        if question.chars().count() > max {
            debug!(max, "rejected oversized question");
            return Err(VocalisError::Validation(format!(
                "question must be at most {max} characters"
            )));
        }
        Ok(question)
    }

    /// Cache lookup that treats any cache failure as a miss.
    async fn cached_answer(&self, question: &str) -> Option<CachedAnswer> {
        let hit = match self.parts.cache.get(question).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(error = %e, "response cache read failed, treating as miss");
                None
            }
        };
        #[cfg(feature = "prometheus")]
        vocalis_prometheus::record_cache_lookup(hit.is_some());
        hit
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, VocalisError> {
        let timeout = self.settings.model_timeout;
        let started = std::time::Instant::now();
        let response = match tokio::time::timeout(timeout, self.parts.model.complete(request)).await
        {
            Ok(response) => response?,
            Err(_) => {
                warn!(?timeout, "model call timed out");
                return Err(VocalisError::Timeout { duration: timeout });
            }
        };
        #[cfg(feature = "prometheus")]
        vocalis_prometheus::record_model_latency(started.elapsed().as_secs_f64());
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "model call completed"
        );
        Ok(response)
    }

    async fn remember(
        &self,
        session_id: Option<&str>,
        question: &str,
        answer: &str,
    ) -> Result<(), VocalisError> {
        if let Some(id) = session_id {
            self.parts.sessions.add_message(id, Role::User, question).await?;
            self.parts.sessions.add_message(id, Role::Assistant, answer).await?;
        }
        Ok(())
    }
}

#[cfg(feature = "prometheus")]
fn outcome_label(result: &Result<VoiceOutcome, VocalisError>) -> &'static str {
    match result {
        Ok(VoiceOutcome::Answered(a)) if a.cached => "cached",
        Ok(VoiceOutcome::Answered(_)) => "answered",
        Ok(VoiceOutcome::RateLimited(_)) => "rate_limited",
        Ok(VoiceOutcome::BudgetExhausted { .. }) => "budget_exhausted",
        Err(e) if e.is_validation() => "invalid",
        Err(_) => "error",
    }
}
