// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. Login/registration and the
//! health endpoints are public; everything else sits behind the session
//! middleware.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use learnflow_config::model::ServiceConfig;
use learnflow_core::LearnFlowError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::handlers;
use crate::state::AppState;

/// Build the full gateway router for the given state.
///
/// Exposed separately from [`start_server`] so tests can drive the router
/// in-process without binding a socket.
pub fn build_router(state: AppState) -> Router {
    // Unauthenticated public routes: health/metrics plus login/register.
    let public_routes = Router::new()
        .route("/health", get(handlers::health::get_health))
        .route("/metrics", get(handlers::health::get_metrics))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .with_state(state.clone());

    // Routes requiring a valid session token.
    let api_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        .route(
            "/api/auth/change-password",
            post(handlers::auth::change_password),
        )
        .route(
            "/api/chat/sessions",
            post(handlers::chat::open_session).get(handlers::chat::list_sessions),
        )
        .route(
            "/api/chat/sessions/{id}/messages",
            post(handlers::chat::post_message).get(handlers::chat::get_messages),
        )
        .route(
            "/api/chat/sessions/{id}/close",
            post(handlers::chat::close_session),
        )
        .route(
            "/api/exercises",
            post(handlers::exercises::create_exercise).get(handlers::exercises::list_exercises),
        )
        .route(
            "/api/exercises/{id}",
            get(handlers::exercises::get_exercise)
                .put(handlers::exercises::update_exercise)
                .delete(handlers::exercises::delete_exercise),
        )
        .route(
            "/api/exercises/{id}/submissions",
            post(handlers::exercises::submit),
        )
        .route(
            "/api/submissions",
            get(handlers::exercises::list_submissions),
        )
        .route(
            "/api/submissions/{id}",
            get(handlers::exercises::get_submission),
        )
        .route(
            "/api/submissions/{id}/grade",
            post(handlers::exercises::grade_submission),
        )
        .route("/api/progress", get(handlers::exercises::get_progress))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind the configured address and serve until the process is stopped.
pub async fn start_server(config: &ServiceConfig, state: AppState) -> Result<(), LearnFlowError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LearnFlowError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| LearnFlowError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
