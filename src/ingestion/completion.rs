//! The external text-completion capability and its OpenRouter-backed
//! implementation.
//!
//! The extractor only ever sees the [`CompletionProvider`] trait, so the
//! deterministic parsers and all extraction post-processing stay unit-testable
//! without network access.

use crate::ingestion::{IngestionConfig, IngestionError, IngestionResult};
use async_trait::async_trait;
use log::info;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// The injected generative capability: given a prompt, return a completion.
///
/// Fallible, unbounded latency. Implementations must not retry internally;
/// retry and timeout policy belongs to the caller of the pipeline.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> IngestionResult<String>;
}

/// Chat-completions request body
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

/// One message in a chat-completions request
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat-completions response body
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

/// One choice in a chat-completions response
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

/// Message content of a choice
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[allow(dead_code)]
    role: Option<String>,
    content: String,
}

/// Token accounting reported by the API
#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

/// OpenRouter-compatible completion client.
///
/// Performs exactly one API call per [`complete`](CompletionProvider::complete)
/// invocation.
pub struct OpenRouterClient {
    client: Client,
    config: IngestionConfig,
}

impl OpenRouterClient {
    /// Create a new client, validating the configuration up front
    pub fn new(config: IngestionConfig) -> IngestionResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                IngestionError::completion_failed(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterClient {
    async fn complete(&self, prompt: &str) -> IngestionResult<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: Some(4000),
            temperature: Some(0.1),
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        info!(
            "Requesting completion from model {} ({} prompt chars)",
            self.config.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(IngestionError::completion_failed(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response.json().await?;

        if let Some(usage) = &chat_response.usage {
            info!(
                "Completion usage - prompt tokens: {:?}, completion tokens: {:?}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| IngestionError::completion_failed("No choices in API response"))?;

        Ok(choice.message.content)
    }
}
