use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::compose::LayoutConfig;
use crate::optimizer::policy::{
    DEFAULT_FALLBACK_MODEL, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_PRIMARY_MODEL,
};
use crate::optimizer::{ModelConfig, OptimizerConfig, PromptBounds, RetryPolicy};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub optimizer: OptimizerConfig,
    pub layout: LayoutConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let primary = ModelConfig::new(
            env.string_or("LLM_PRIMARY_MODEL", DEFAULT_PRIMARY_MODEL),
            env.parse_or("LLM_PRIMARY_MAX_TOKENS", DEFAULT_MAX_OUTPUT_TOKENS)?,
        );

        // Set but empty disables the fallback.
        let fallback_model = env.string_or("LLM_FALLBACK_MODEL", DEFAULT_FALLBACK_MODEL);
        let fallback = if fallback_model.trim().is_empty() {
            None
        } else {
            Some(ModelConfig::new(
                fallback_model.trim(),
                env.parse_or("LLM_FALLBACK_MAX_TOKENS", DEFAULT_MAX_OUTPUT_TOKENS)?,
            ))
        };

        let retry = RetryPolicy {
            max_retries: env.parse_or("LLM_MAX_RETRIES", 3)?,
            initial_delay: Duration::from_millis(env.parse_or("LLM_INITIAL_DELAY_MS", 1500)?),
            backoff_factor: env.parse_or("LLM_BACKOFF_FACTOR", 1.5)?,
        };
        if !(retry.backoff_factor >= 1.0) {
            bail!("LLM_BACKOFF_FACTOR must be >= 1.0, got {}", retry.backoff_factor);
        }

        let defaults = PromptBounds::default();
        let prompt = PromptBounds {
            min_bullets_per_role: env.parse_or("RESUME_MIN_BULLETS", defaults.min_bullets_per_role)?,
            max_bullets_per_role: env.parse_or("RESUME_MAX_BULLETS", defaults.max_bullets_per_role)?,
            section_order: match env.get("RESUME_SECTION_ORDER") {
                Some(raw) => parse_section_order(&raw),
                None => defaults.section_order,
            },
            ..defaults
        };
        if prompt.min_bullets_per_role > prompt.max_bullets_per_role {
            bail!(
                "RESUME_MIN_BULLETS ({}) exceeds RESUME_MAX_BULLETS ({})",
                prompt.min_bullets_per_role,
                prompt.max_bullets_per_role
            );
        }

        let timeout_secs: u64 = env.parse_or("LLM_REQUEST_TIMEOUT_SECS", 120)?;
        if timeout_secs == 0 {
            bail!("LLM_REQUEST_TIMEOUT_SECS must be positive");
        }

        Ok(Config {
            anthropic_api_key: env.require("ANTHROPIC_API_KEY")?,
            port: env
                .string_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env.string_or("RUST_LOG", "info"),
            optimizer: OptimizerConfig {
                primary,
                fallback,
                retry,
                prompt,
                request_timeout: Duration::from_secs(timeout_secs),
            },
            layout: LayoutConfig::default(),
        })
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("Required environment variable '{key}' is not set"))
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("{key}={raw:?} is invalid: {e}")),
        }
    }
}

fn parse_section_order(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
