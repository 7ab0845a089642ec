// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat session and message handlers.
//!
//! Sessions are only ever visible to their owning student; a foreign
//! session ID answers 404 rather than 403 so IDs cannot be probed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use learnflow_bus::DomainEvent;
use learnflow_chat::AgentKind;
use learnflow_core::LearnFlowError;
use learnflow_core::types::{ChatMessage, ChatSession, MessageRole};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentStudent;
use crate::error::ApiResult;
use crate::state::AppState;

/// Request body for POST /api/chat/sessions.
#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    #[serde(default)]
    pub topic: Option<String>,
    /// Persona tag; unknown values degrade to "general".
    #[serde(default)]
    pub agent_kind: Option<String>,
}

/// Request body for POST /api/chat/sessions/{id}/messages.
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Response body for POST /api/chat/sessions/{id}/messages: the student's
/// message and the assistant reply it produced.
#[derive(Debug, Serialize)]
pub struct ChatExchange {
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
}

/// Pagination for transcript reads.
#[derive(Debug, Deserialize)]
pub struct TranscriptQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Listing cap for GET /api/chat/sessions.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_list_limit")]
    pub limit: i64,
}

fn default_list_limit() -> i64 {
    50
}

/// Load a session and enforce ownership.
async fn owned_session(
    state: &AppState,
    current: &CurrentStudent,
    session_id: &str,
) -> Result<ChatSession, LearnFlowError> {
    let session = state
        .chat
        .get(session_id)
        .await?
        .filter(|s| s.student_id == current.0.id);
    session.ok_or_else(|| LearnFlowError::NotFound(format!("chat session {session_id}")))
}

/// POST /api/chat/sessions
pub async fn open_session(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentStudent>,
    Json(body): Json<OpenSessionRequest>,
) -> ApiResult<(StatusCode, Json<ChatSession>)> {
    let agent_kind = body
        .agent_kind
        .as_deref()
        .map(AgentKind::parse_or_general)
        .unwrap_or_default();
    let session = state
        .chat
        .open(current.0.id, body.topic.as_deref(), agent_kind)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/chat/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentStudent>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<ChatSession>>> {
    let sessions = state
        .chat
        .list_for_student(current.0.id, query.limit)
        .await?;
    Ok(Json(sessions))
}

/// POST /api/chat/sessions/{id}/messages
///
/// Appends the student's message, asks the assistant for a reply, and
/// returns both. An upstream failure surfaces as 502 with the user message
/// already persisted, so resending is safe.
pub async fn post_message(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentStudent>,
    Path(session_id): Path<String>,
    Json(body): Json<PostMessageRequest>,
) -> ApiResult<Json<ChatExchange>> {
    let session = owned_session(&state, &current, &session_id).await?;

    let user_message = state
        .chat
        .append_message(
            &session_id,
            MessageRole::User,
            &body.content,
            body.metadata.as_ref(),
        )
        .await?;
    state
        .publisher
        .publish(DomainEvent::chat_message(session.student_id, &user_message));

    let assistant_message = state.responder.respond(&session_id).await?;

    Ok(Json(ChatExchange {
        user_message,
        assistant_message,
    }))
}

/// GET /api/chat/sessions/{id}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentStudent>,
    Path(session_id): Path<String>,
    Query(query): Query<TranscriptQuery>,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    owned_session(&state, &current, &session_id).await?;
    let messages = state.chat.transcript(&session_id, query.limit).await?;
    Ok(Json(messages))
}

/// POST /api/chat/sessions/{id}/close
pub async fn close_session(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentStudent>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ChatSession>> {
    owned_session(&state, &current, &session_id).await?;
    let session = state.chat.close(&session_id).await?;
    Ok(Json(session))
}
