//! Request orchestration: one prompt, retry with backoff and a one-shot model fallback.
//!
//! # Flow
//! 1. Validate inputs (fail fast, no network).
//! 2. Build the prompt once.
//! 3. `attempt_with_retry(primary)`.
//! 4. If the primary model id was rejected: `attempt_with_retry(fallback)` with the same prompt.
//! 5. Strip the optional score marker from the successful text.
//!
//! The whole run sits under the configured request timeout and an optional abort
//! future, so backoff sleeps are always cancellable.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::llm_client::{
    text_from_blocks, FailureClass, LlmTransport, ModelAttempt, ProviderReply,
};
use crate::optimizer::policy::{ModelConfig, OptimizerConfig};
use crate::optimizer::prompts::build_optimization_prompt;
use crate::optimizer::score::extract_score;

/// Returned in place of text when the provider answered without any text block.
pub const NO_RESPONSE_SENTINEL: &str = "No response received.";

// ────────────────────────────────────────────────────────────────────────────
// Request / result types
// ────────────────────────────────────────────────────────────────────────────

/// One user action: résumé text plus the job description it is tailored to.
#[derive(Debug, Clone)]
pub struct OptimizationRequest {
    pub resume_text: String,
    pub job_description: String,
}

impl OptimizationRequest {
    pub fn new(resume_text: impl Into<String>, job_description: impl Into<String>) -> Self {
        Self {
            resume_text: resume_text.into(),
            job_description: job_description.into(),
        }
    }

    fn validate(&self) -> Result<(), OptimizeError> {
        if self.resume_text.trim().is_empty() {
            return Err(OptimizeError::Validation(
                "resume text is empty".to_string(),
            ));
        }
        if self.job_description.trim().is_empty() {
            return Err(OptimizeError::Validation(
                "job description is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Successful optimization output. `text` is never empty.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizedText {
    pub text: String,
    pub ats_score: Option<String>,
    /// The model that produced the text (primary or fallback).
    pub model_id: String,
    /// Total sends across every model tried.
    pub attempts: u32,
}

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("ValidationError: {0}")]
    Validation(String),

    #[error("{class}: {message}")]
    Provider {
        class: FailureClass,
        status: Option<u16>,
        message: String,
        models_tried: Vec<String>,
        attempts: u32,
    },

    #[error("ProviderTransientError: request timed out after {}s", .0.as_secs_f32())]
    TimedOut(Duration),

    #[error("Request cancelled")]
    Cancelled,
}

/// The last failure observed for one model's retry loop.
#[derive(Debug, Clone)]
struct AttemptFailure {
    class: FailureClass,
    status: Option<u16>,
    message: String,
    attempts: u32,
}

impl AttemptFailure {
    fn describe(&self, model_id: &str) -> String {
        match self.status {
            Some(status) => format!("{model_id} returned {status}: {}", self.message),
            None => format!("{model_id} unreachable: {}", self.message),
        }
    }
}

struct AttemptSuccess {
    text: String,
    attempts: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

/// Stateless between calls; the transport handle is shared read-only.
#[derive(Clone)]
pub struct RequestOrchestrator {
    transport: Arc<dyn LlmTransport>,
    config: OptimizerConfig,
}

impl RequestOrchestrator {
    pub fn new(transport: Arc<dyn LlmTransport>, config: OptimizerConfig) -> Self {
        Self { transport, config }
    }

    /// Optimizes under the configured request timeout.
    pub async fn optimize(
        &self,
        request: &OptimizationRequest,
    ) -> Result<OptimizedText, OptimizeError> {
        self.optimize_until(request, std::future::pending()).await
    }

    /// Same as `optimize`, but resolves to `Cancelled` as soon as `abort` completes.
    pub async fn optimize_until<F>(
        &self,
        request: &OptimizationRequest,
        abort: F,
    ) -> Result<OptimizedText, OptimizeError>
    where
        F: Future<Output = ()>,
    {
        request.validate()?;

        let prompt = build_optimization_prompt(
            &request.resume_text,
            &request.job_description,
            &self.config.prompt,
        );
        let timeout = self.config.request_timeout;

        tokio::select! {
            biased;
            _ = abort => {
                warn!("Optimization aborted by caller");
                Err(OptimizeError::Cancelled)
            }
            outcome = tokio::time::timeout(timeout, self.run(prompt)) => {
                outcome.unwrap_or(Err(OptimizeError::TimedOut(timeout)))
            }
        }
    }

    async fn run(&self, prompt: String) -> Result<OptimizedText, OptimizeError> {
        let primary = &self.config.primary;
        let mut models_tried = vec![primary.model_id.clone()];

        let primary_failure = match self.attempt_with_retry(primary, &prompt).await {
            Ok(success) => return Ok(finish(success, primary)),
            Err(failure) => failure,
        };

        let fallback = match (&self.config.fallback, primary_failure.class) {
            (Some(fallback), FailureClass::ModelUnavailable) => fallback,
            _ => {
                return Err(provider_error(
                    primary_failure.clone(),
                    primary_failure.describe(&primary.model_id),
                    models_tried,
                    primary_failure.attempts,
                ))
            }
        };

        warn!(
            primary = %primary.model_id,
            fallback = %fallback.model_id,
            "Primary model unavailable, switching to fallback model"
        );
        models_tried.push(fallback.model_id.clone());

        match self.attempt_with_retry(fallback, &prompt).await {
            Ok(success) => {
                let mut result = finish(success, fallback);
                result.attempts += primary_failure.attempts;
                Ok(result)
            }
            Err(fallback_failure) => {
                let message = format!(
                    "{}; after primary {}",
                    fallback_failure.describe(&fallback.model_id),
                    primary_failure.describe(&primary.model_id)
                );
                let attempts = primary_failure.attempts + fallback_failure.attempts;
                Err(provider_error(fallback_failure, message, models_tried, attempts))
            }
        }
    }

    /// Sends the prompt to one model, retrying retryable failures under the policy.
    async fn attempt_with_retry(
        &self,
        model: &ModelConfig,
        prompt: &str,
    ) -> Result<AttemptSuccess, AttemptFailure> {
        let policy = &self.config.retry;
        let attempt = ModelAttempt {
            model_id: model.model_id.clone(),
            max_output_tokens: model.max_output_tokens,
            prompt: prompt.to_string(),
        };

        let mut retries_used = 0u32;
        loop {
            let attempts = retries_used + 1;

            let failure = match self.transport.send(&attempt).await {
                Ok(ProviderReply::Success { content }) => {
                    debug!(model = %model.model_id, attempts, "Optimization attempt succeeded");
                    let text = text_from_blocks(&content)
                        .filter(|t| !t.trim().is_empty())
                        .unwrap_or_else(|| {
                            warn!(model = %model.model_id, "Provider returned no text blocks");
                            NO_RESPONSE_SENTINEL.to_string()
                        });
                    return Ok(AttemptSuccess { text, attempts });
                }
                Ok(ProviderReply::Failure(failure)) => AttemptFailure {
                    class: failure.classify(&model.model_id),
                    status: Some(failure.status),
                    message: failure.message,
                    attempts,
                },
                Err(e) => AttemptFailure {
                    class: FailureClass::Network,
                    status: None,
                    message: e.to_string(),
                    attempts,
                },
            };

            if !failure.class.is_retryable() || retries_used >= policy.max_retries {
                return Err(failure);
            }

            let delay = policy.delay_for(retries_used);
            warn!(
                model = %model.model_id,
                status = ?failure.status,
                class = %failure.class,
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                "LLM call failed, retrying after backoff"
            );
            tokio::time::sleep(delay).await;
            retries_used += 1;
        }
    }
}

fn finish(success: AttemptSuccess, model: &ModelConfig) -> OptimizedText {
    let scored = extract_score(&success.text);
    let text = if scored.body.trim().is_empty() {
        NO_RESPONSE_SENTINEL.to_string()
    } else {
        scored.body
    };

    info!(
        model = %model.model_id,
        attempts = success.attempts,
        ats_score = ?scored.score,
        "Resume optimization complete"
    );

    OptimizedText {
        text,
        ats_score: scored.score,
        model_id: model.model_id.clone(),
        attempts: success.attempts,
    }
}

fn provider_error(
    failure: AttemptFailure,
    message: String,
    models_tried: Vec<String>,
    attempts: u32,
) -> OptimizeError {
    OptimizeError::Provider {
        class: failure.class,
        status: failure.status,
        message,
        models_tried,
        attempts,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
