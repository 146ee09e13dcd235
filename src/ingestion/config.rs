//! Configuration for the ingestion pipeline

use crate::ingestion::{IngestionError, IngestionResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Configuration for the assisted fallback extractor's completion service.
///
/// Only the fallback path needs any of this; the deterministic parsers are
/// configuration-free.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// API key for the completion service
    pub api_key: String,
    /// Model identifier to request
    pub model: String,
    /// Base URL of the completion API
    pub base_url: String,
    /// Timeout for completion calls in seconds
    pub timeout_seconds: u64,
    /// Whether assisted extraction is enabled
    pub enabled: bool,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "google/gemini-pro-1.5".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            timeout_seconds: 60,
            enabled: true,
        }
    }
}

impl IngestionConfig {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env::var("OPENROUTER_API_KEY").unwrap_or(defaults.api_key),
            model: env::var("INGESTION_MODEL").unwrap_or(defaults.model),
            base_url: env::var("INGESTION_BASE_URL").unwrap_or(defaults.base_url),
            timeout_seconds: env::var("INGESTION_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_seconds),
            enabled: true,
        }
    }

    /// Whether the configuration is complete enough to call the service
    pub fn is_ready(&self) -> bool {
        self.enabled && !self.api_key.is_empty()
    }

    /// Timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Masked representation of the API key for status reporting
    pub fn api_key_masked(&self) -> String {
        if self.api_key.is_empty() {
            "<not configured>".to_string()
        } else {
            "***configured***".to_string()
        }
    }

    /// Validate the configuration, returning a typed error on the first problem
    pub fn validate(&self) -> IngestionResult<()> {
        if self.enabled && self.api_key.is_empty() {
            return Err(IngestionError::configuration_error(
                "API key is required when assisted extraction is enabled",
            ));
        }
        if self.model.is_empty() {
            return Err(IngestionError::configuration_error(
                "Model identifier is required",
            ));
        }
        if self.base_url.is_empty() {
            return Err(IngestionError::configuration_error("Base URL is required"));
        }
        if self.timeout_seconds == 0 {
            return Err(IngestionError::configuration_error(
                "Timeout must be greater than 0",
            ));
        }
        Ok(())
    }
}
