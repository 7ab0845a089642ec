// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the LearnFlow backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level LearnFlow configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LearnFlowConfig {
    /// Service identity and HTTP bind settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Authentication and session settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Completion service settings for the assistant.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Message bus settings for domain event publication.
    #[serde(default)]
    pub bus: BusConfig,
}

/// Service identity and HTTP bind configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service, used in logs and event payloads.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Host address the gateway binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the gateway binds to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "learnflow".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode (recommended).
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "learnflow.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Authentication and session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Validity window of an issued session, in hours.
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u32,

    /// Interval between expired-session sweeps, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl_hours(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_session_ttl_hours() -> u32 {
    24
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

/// Completion service configuration for the assistant responder.
///
/// The API is OpenAI-compatible; the defaults front Gemini through its
/// compatibility endpoint. With no `api_key` set, the assistant falls back
/// to deterministic canned replies (development mode).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantConfig {
    /// API key for the completion service. `None` enables canned replies.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier to request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Request timeout in seconds for one completion call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Number of most-recent messages used as model context.
    #[serde(default = "default_context_window")]
    pub context_window: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            context_window: default_context_window(),
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f64 {
    0.7
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_context_window() -> u32 {
    10
}

/// Message bus configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BusConfig {
    /// Base URL of the bus bridge endpoint. `None` disables publication.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Client identifier attached to outgoing events.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Timeout in milliseconds for one publish attempt.
    #[serde(default = "default_publish_timeout_ms")]
    pub publish_timeout_ms: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            client_id: default_client_id(),
            publish_timeout_ms: default_publish_timeout_ms(),
        }
    }
}

fn default_client_id() -> String {
    "learnflow-backend".to_string()
}

fn default_publish_timeout_ms() -> u64 {
    1000
}
