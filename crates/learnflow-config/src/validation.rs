// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses, non-empty paths, and sane
//! timeout windows.

use crate::diagnostic::ConfigError;
use crate::model::LearnFlowConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LearnFlowConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.service.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "service.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("service.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.auth.session_ttl_hours == 0 {
        errors.push(ConfigError::Validation {
            message: "auth.session_ttl_hours must be at least 1".to_string(),
        });
    }

    if config.auth.sweep_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "auth.sweep_interval_secs must be at least 1".to_string(),
        });
    }

    if config.assistant.context_window == 0 {
        errors.push(ConfigError::Validation {
            message: "assistant.context_window must be at least 1".to_string(),
        });
    }

    if config.assistant.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "assistant.max_tokens must be at least 1".to_string(),
        });
    }

    if !(0.0..=2.0).contains(&config.assistant.temperature) {
        errors.push(ConfigError::Validation {
            message: format!(
                "assistant.temperature must be between 0.0 and 2.0, got {}",
                config.assistant.temperature
            ),
        });
    }

    if config.assistant.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "assistant.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if let Some(endpoint) = &config.bus.endpoint {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            errors.push(ConfigError::Validation {
                message: format!("bus.endpoint `{endpoint}` must be an http(s) URL"),
            });
        }
    }

    if config.bus.publish_timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "bus.publish_timeout_ms must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
