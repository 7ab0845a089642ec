// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the OpenAI-compatible chat completions API.

use serde::{Deserialize, Serialize};

/// One conversation turn on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ApiMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// One generated completion choice.
#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ApiMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token accounting reported by the service.
#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Response body for `POST /chat/completions`.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Error envelope returned by the API on failure.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parses_without_usage() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": "hi"}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "hi");
        assert!(response.usage.is_none());
    }

    #[test]
    fn error_envelope_parses() {
        let json = r#"{"error": {"message": "quota exceeded", "type": "rate_limit"}}"#;
        let err: ApiErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(err.error.message, "quota exceeded");
        assert_eq!(err.error.type_.as_deref(), Some("rate_limit"));
    }

    #[test]
    fn request_serializes_messages_in_order() {
        let request = ChatCompletionRequest {
            model: "gemini-2.5-flash".to_string(),
            messages: vec![
                ApiMessage {
                    role: "system".to_string(),
                    content: "be helpful".to_string(),
                },
                ApiMessage {
                    role: "user".to_string(),
                    content: "hi".to_string(),
                },
            ],
            temperature: 0.7,
            max_tokens: 1000,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
    }
}
