// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `learnflow serve` command implementation.
//!
//! Wires storage, auth, chat, assistant, bus, and exercise services
//! together, spawns the periodic expired-session sweep, and runs the HTTP
//! gateway until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use learnflow_assistant::{AssistantResponder, provider_from_config};
use learnflow_auth::{CredentialStore, SessionManager};
use learnflow_bus::{DomainEvent, EventPublisher, sink_from_config};
use learnflow_chat::ChatService;
use learnflow_config::LearnFlowConfig;
use learnflow_core::LearnFlowError;
use learnflow_exercises::ExerciseService;
use learnflow_gateway::{AppState, HealthState, start_server};
use learnflow_storage::Database;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber from the configured log level.
///
/// `RUST_LOG` takes precedence when set. `try_init` keeps repeated calls
/// (tests, embedded use) from panicking.
fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Installs the Prometheus metrics recorder.
///
/// Returns the render closure for the gateway's `/metrics` endpoint, or
/// `None` if a recorder is already installed (embedded/test contexts).
fn install_metrics_recorder() -> Option<Arc<dyn Fn() -> String + Send + Sync>> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(Arc::new(move || handle.render())),
        Err(e) => {
            warn!(error = %e, "prometheus recorder not installed, /metrics disabled");
            None
        }
    }
}

/// Runs the `learnflow serve` command.
pub async fn run_serve(config: LearnFlowConfig) -> Result<(), LearnFlowError> {
    init_tracing(&config.service.log_level);

    info!(service = %config.service.name, "starting learnflow serve");

    let prometheus_render = install_metrics_recorder();

    // Storage first: opening the database runs pending migrations.
    let db = Database::from_config(&config.storage).await?;

    // Event publication: explicit sink construction, no module-level
    // producer singleton. The null sink stands in when no bus is configured.
    let sink = sink_from_config(&config.bus)?;
    info!(sink = sink.name(), "event sink ready");
    let publisher = EventPublisher::new(sink);

    let credentials = CredentialStore::new(db.clone());
    let sessions = SessionManager::new(db.clone(), &config.auth);
    let chat = ChatService::new(db.clone());

    let provider = provider_from_config(&config.assistant)?;
    info!(provider = provider.name(), model = %config.assistant.model, "assistant provider ready");
    let responder = AssistantResponder::new(
        chat.clone(),
        provider,
        publisher.clone(),
        config.assistant.context_window,
    );

    let exercises = ExerciseService::new(db.clone(), publisher.clone());

    publisher.publish(DomainEvent::system(
        &config.service.name,
        "service_started",
        serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }),
    ));

    // Periodic expired-session sweep.
    let sweep_sessions = sessions.clone();
    let sweep_interval = Duration::from_secs(config.auth.sweep_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        // The first tick fires immediately; skip it so startup stays quiet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = sweep_sessions.sweep_expired().await {
                warn!(error = %e, "session sweep failed");
            }
        }
    });

    let state = AppState {
        credentials,
        sessions,
        chat,
        responder,
        exercises,
        publisher: publisher.clone(),
        health: HealthState {
            start_time: std::time::Instant::now(),
            prometheus_render,
        },
    };

    tokio::select! {
        result = start_server(&config.service, state) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            publisher
                .publish_now(DomainEvent::system(
                    &config.service.name,
                    "service_stopped",
                    serde_json::json!({}),
                ))
                .await;
            db.close().await?;
            info!("learnflow stopped");
            Ok(())
        }
    }
}
