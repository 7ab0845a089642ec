// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared state for axum request handlers.

use std::sync::Arc;
use std::time::Instant;

use learnflow_assistant::AssistantResponder;
use learnflow_auth::{CredentialStore, SessionManager};
use learnflow_bus::EventPublisher;
use learnflow_chat::ChatService;
use learnflow_exercises::ExerciseService;

/// Health state for the unauthenticated health/metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: Instant,
    /// Optional Prometheus metrics render function, installed by the binary.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            prometheus_render: None,
        }
    }
}

/// Everything a handler needs, injected into the router.
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialStore,
    pub sessions: SessionManager,
    pub chat: ChatService,
    pub responder: AssistantResponder,
    pub exercises: ExerciseService,
    pub publisher: EventPublisher,
    pub health: HealthState,
}
