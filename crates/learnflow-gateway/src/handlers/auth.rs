// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registration, login, logout, and profile handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use learnflow_bus::DomainEvent;
use learnflow_core::types::{NewStudent, Student};
use serde::{Deserialize, Serialize};

use crate::auth::{CurrentStudent, SessionToken};
use crate::error::ApiResult;
use crate::state::AppState;

/// Public view of a student account.
#[derive(Debug, Serialize)]
pub struct StudentProfile {
    pub id: i64,
    pub public_id: String,
    pub email: String,
    pub name: String,
    pub grade_level: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<&Student> for StudentProfile {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id,
            public_id: student.public_id.clone(),
            email: student.email.clone(),
            name: student.name.clone(),
            grade_level: student.grade_level.clone(),
            is_active: student.is_active,
            created_at: student.created_at.clone(),
        }
    }
}

/// Request body for POST /api/auth/login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response body for POST /api/auth/login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Opaque session token; send it back via `X-Session-Token`.
    pub token: String,
    pub expires_at: String,
    pub student: StudentProfile,
}

/// Request body for POST /api/auth/change-password.
#[derive(Debug, Deserialize)]
pub struct PasswordChangeRequest {
    pub old_password: String,
    pub new_password: String,
}

/// POST /api/auth/register (public)
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<NewStudent>,
) -> ApiResult<(StatusCode, Json<StudentProfile>)> {
    let student = state.credentials.register(&body).await?;
    state
        .publisher
        .publish(DomainEvent::student_registered(&student));
    Ok((StatusCode::CREATED, Json(StudentProfile::from(&student))))
}

/// POST /api/auth/login (public)
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let student = state
        .credentials
        .authenticate(&body.email, &body.password)
        .await?;
    let session = state.sessions.issue(student.id).await?;
    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        student: StudentProfile::from(&student),
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(token): Extension<SessionToken>,
) -> ApiResult<StatusCode> {
    state.sessions.revoke(&token.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
pub async fn me(
    Extension(current): Extension<CurrentStudent>,
) -> Json<StudentProfile> {
    Json(StudentProfile::from(&current.0))
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentStudent>,
    Json(body): Json<PasswordChangeRequest>,
) -> ApiResult<StatusCode> {
    state
        .credentials
        .change_password(current.0.id, &body.old_password, &body.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
