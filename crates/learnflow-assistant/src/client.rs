// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI-compatible chat completions API.
//!
//! One synchronous call per reply, bounded by the configured timeout. There
//! is deliberately no retry loop here: an upstream failure is surfaced as
//! `UpstreamUnavailable` and the student retries by sending another message.

use std::time::Duration;

use async_trait::async_trait;
use learnflow_config::model::AssistantConfig;
use learnflow_core::types::CompletionMessage;
use learnflow_core::{CompletionProvider, LearnFlowError};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, ApiMessage, ChatCompletionRequest, ChatCompletionResponse};

/// Client for an OpenAI-compatible completion service.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl CompletionClient {
    /// Creates a client from configuration. Requires `api_key` to be set.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, LearnFlowError> {
        let api_key = config.api_key.as_deref().ok_or_else(|| {
            LearnFlowError::Config("assistant.api_key is required for the HTTP client".to_string())
        })?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| LearnFlowError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert("authorization", auth);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LearnFlowError::UpstreamUnavailable {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Returns the configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionProvider for CompletionClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(
        &self,
        system: &str,
        messages: &[CompletionMessage],
    ) -> Result<String, LearnFlowError> {
        let mut api_messages = Vec::with_capacity(messages.len() + 1);
        api_messages.push(ApiMessage {
            role: "system".to_string(),
            content: system.to_string(),
        });
        api_messages.extend(messages.iter().map(|m| ApiMessage {
            role: m.role.clone(),
            content: m.content.clone(),
        }));

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: api_messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LearnFlowError::UpstreamUnavailable {
                message: format!("completion request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "completion response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "completion API error ({}): {}",
                    api_err.error.type_.as_deref().unwrap_or("unknown"),
                    api_err.error.message
                )
            } else {
                format!("completion API returned {status}: {body}")
            };
            return Err(LearnFlowError::UpstreamUnavailable {
                message,
                source: None,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LearnFlowError::UpstreamUnavailable {
                message: format!("failed to read completion response body: {e}"),
                source: Some(Box::new(e)),
            })?;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| LearnFlowError::UpstreamUnavailable {
                message: format!("failed to parse completion response: {e}"),
                source: Some(Box::new(e)),
            })?;

        let Some(choice) = parsed.choices.into_iter().next() else {
            return Err(LearnFlowError::UpstreamUnavailable {
                message: "completion response contained no choices".to_string(),
                source: None,
            });
        };

        Ok(choice.message.content)
    }
}
