//! Retry policy and model configuration for the optimization request.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Exponential backoff over a fixed retry budget.
///
/// `max_retries` counts retries, not attempts: a budget of 3 allows 4 sends.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1500),
            backoff_factor: 1.5,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based): `initial_delay × factor^retry`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.backoff_factor.max(1.0).powi(retry as i32);
        self.initial_delay.mul_f64(factor)
    }
}

/// A model id and its output token budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_id: String,
    pub max_output_tokens: u32,
}

impl ModelConfig {
    pub fn new(model_id: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            model_id: model_id.into(),
            max_output_tokens,
        }
    }
}

/// Content bounds written into the optimization prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptBounds {
    pub min_bullets_per_role: u8,
    pub max_bullets_per_role: u8,
    pub section_order: Vec<String>,
    pub page_target: u8,
    /// Ask the model to append `[ATS_SCORE: NN]`. Extraction stays best-effort either way.
    pub emit_score_marker: bool,
}

impl Default for PromptBounds {
    fn default() -> Self {
        Self {
            min_bullets_per_role: 2,
            max_bullets_per_role: 5,
            section_order: [
                "PROFESSIONAL SUMMARY",
                "EXPERIENCE",
                "EDUCATION",
                "SKILLS",
                "CERTIFICATIONS",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            page_target: 1,
            emit_score_marker: true,
        }
    }
}

/// Everything the orchestrator needs besides a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    pub primary: ModelConfig,
    /// Used once, only when the primary model id is rejected.
    pub fallback: Option<ModelConfig>,
    pub retry: RetryPolicy,
    pub prompt: PromptBounds,
    /// Overall deadline for one `optimize` call, backoff sleeps included.
    pub request_timeout: Duration,
}

pub const DEFAULT_PRIMARY_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_FALLBACK_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1500;

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            primary: ModelConfig::new(DEFAULT_PRIMARY_MODEL, DEFAULT_MAX_OUTPUT_TOKENS),
            fallback: Some(ModelConfig::new(
                DEFAULT_FALLBACK_MODEL,
                DEFAULT_MAX_OUTPUT_TOKENS,
            )),
            retry: RetryPolicy::default(),
            prompt: PromptBounds::default(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The full sleep schedule if every retry is consumed.
    fn schedule(policy: &RetryPolicy) -> Vec<Duration> {
        (0..policy.max_retries).map(|r| policy.delay_for(r)).collect()
    }

    #[test]
    fn test_default_schedule_is_1500_2250_3375() {
        let policy = RetryPolicy::default();
        assert_eq!(
            schedule(&policy),
            vec![
                Duration::from_millis(1500),
                Duration::from_millis(2250),
                Duration::from_micros(3_375_000),
            ]
        );
    }

    #[test]
    fn test_factor_below_one_never_shrinks_delay() {
        let policy = RetryPolicy {
            max_retries: 2,
            initial_delay: Duration::from_millis(100),
            backoff_factor: 0.5,
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
    }

    #[test]
    fn test_zero_budget_has_empty_schedule() {
        let policy = RetryPolicy {
            max_retries: 0,
            ..RetryPolicy::default()
        };
        assert!(schedule(&policy).is_empty());
    }

    #[test]
    fn test_default_config_has_distinct_fallback() {
        let config = OptimizerConfig::default();
        let fallback = config.fallback.expect("default fallback");
        assert_ne!(config.primary.model_id, fallback.model_id);
    }
}
