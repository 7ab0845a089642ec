// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./learnflow.toml` > `~/.config/learnflow/learnflow.toml`
//! > `/etc/learnflow/learnflow.toml` with environment variable overrides via
//! `LEARNFLOW_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::LearnFlowConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/learnflow/learnflow.toml` (system-wide)
/// 3. `~/.config/learnflow/learnflow.toml` (user XDG config)
/// 4. `./learnflow.toml` (local directory)
/// 5. `LEARNFLOW_*` environment variables
pub fn load_config() -> Result<LearnFlowConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<LearnFlowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LearnFlowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LearnFlowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LearnFlowConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LearnFlowConfig::default()))
        .merge(Toml::file("/etc/learnflow/learnflow.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("learnflow/learnflow.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("learnflow.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `LEARNFLOW_AUTH_SESSION_TTL_HOURS` must
/// map to `auth.session_ttl_hours`, not `auth.session.ttl.hours`.
fn env_provider() -> Env {
    Env::prefixed("LEARNFLOW_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: LEARNFLOW_ASSISTANT_API_KEY -> "assistant_api_key"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("auth_", "auth.", 1)
            .replacen("assistant_", "assistant.", 1)
            .replacen("bus_", "bus.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn string_loading_applies_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.service.name, "learnflow");
        assert_eq!(config.auth.session_ttl_hours, 24);
    }

    #[test]
    fn string_loading_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[storage]
database_path = "/var/lib/learnflow/data.db"
"#,
        )
        .unwrap();
        assert_eq!(config.storage.database_path, "/var/lib/learnflow/data.db");
        assert!(config.storage.wal_mode);
    }

    #[test]
    fn unknown_key_in_string_fails() {
        let result = load_config_from_str(
            r#"
[service]
naem = "oops"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn env_var_overrides_file_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learnflow.toml");
        std::fs::write(&path, "[auth]\nsession_ttl_hours = 48\n").unwrap();

        // SAFETY: test is serialized; no other thread reads the environment.
        unsafe { std::env::set_var("LEARNFLOW_AUTH_SESSION_TTL_HOURS", "12") };
        let config = load_config_from_path(&path).unwrap();
        unsafe { std::env::remove_var("LEARNFLOW_AUTH_SESSION_TTL_HOURS") };

        assert_eq!(config.auth.session_ttl_hours, 12);
    }

    #[test]
    #[serial]
    fn underscore_keys_map_to_correct_section() {
        // SAFETY: test is serialized; no other thread reads the environment.
        unsafe { std::env::set_var("LEARNFLOW_BUS_PUBLISH_TIMEOUT_MS", "250") };
        let config = load_config().unwrap();
        unsafe { std::env::remove_var("LEARNFLOW_BUS_PUBLISH_TIMEOUT_MS") };

        assert_eq!(config.bus.publish_timeout_ms, 250);
    }
}
