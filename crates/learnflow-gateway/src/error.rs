// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error-to-response mapping for the REST API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use learnflow_core::LearnFlowError;
use serde::Serialize;
use tracing::error;

/// JSON error body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wrapper that maps [`LearnFlowError`] onto HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub LearnFlowError);

/// Handler result alias.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<LearnFlowError> for ApiError {
    fn from(err: LearnFlowError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            LearnFlowError::Authentication { .. } => {
                (StatusCode::UNAUTHORIZED, self.0.to_string())
            }
            // A closed chat session is a conflict with the resource's
            // current state; the caller must open a new session.
            LearnFlowError::SessionClosed { .. } | LearnFlowError::Conflict(_) => {
                (StatusCode::CONFLICT, self.0.to_string())
            }
            LearnFlowError::NotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            LearnFlowError::Validation(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.0.to_string())
            }
            LearnFlowError::UpstreamUnavailable { .. } => {
                (StatusCode::BAD_GATEWAY, self.0.to_string())
            }
            // Publish errors never reach here (the publisher swallows them);
            // if one does, treat it like any other internal fault.
            LearnFlowError::Storage { .. }
            | LearnFlowError::Config(_)
            | LearnFlowError::Publish { .. }
            | LearnFlowError::Internal(_) => {
                error!(error = %self.0, "internal error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnflow_core::AuthFailure;

    fn status_of(err: LearnFlowError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn status_mapping_matches_the_taxonomy() {
        assert_eq!(
            status_of(LearnFlowError::auth(AuthFailure::ExpiredSession)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(LearnFlowError::SessionClosed {
                session_id: "s".into()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(LearnFlowError::Conflict("dup".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(LearnFlowError::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(LearnFlowError::Validation("bad".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(LearnFlowError::UpstreamUnavailable {
                message: "down".into(),
                source: None
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(LearnFlowError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let response = ApiError(LearnFlowError::Internal("secret detail".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
