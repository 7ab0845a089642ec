// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-token authentication middleware.
//!
//! Protected routes read the opaque token from `X-Session-Token` (or
//! `Authorization: Bearer <token>`), validate it against the session
//! manager, and inject the owning student into request extensions.
//! Login and registration are mounted outside this middleware.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use learnflow_core::types::Student;
use learnflow_core::{AuthFailure, LearnFlowError};

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated student, available to handlers via `Extension`.
#[derive(Debug, Clone)]
pub struct CurrentStudent(pub Student);

/// The raw token the request authenticated with (for logout).
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Pull the session token out of the request headers.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers.get("x-session-token").and_then(|v| v.to_str().ok()) {
        return Some(token.to_string());
    }
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

/// Middleware validating the session token on every protected request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_token(request.headers()) else {
        metrics::counter!("learnflow_auth_rejected_total").increment(1);
        return Err(ApiError(LearnFlowError::auth(AuthFailure::UnknownSession)));
    };

    let student = state.sessions.validate(&token).await.inspect_err(|_| {
        metrics::counter!("learnflow_auth_rejected_total").increment(1);
    })?;

    request.extensions_mut().insert(CurrentStudent(student));
    request.extensions_mut().insert(SessionToken(token));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn x_session_token_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-session-token", HeaderValue::from_static("abc"));
        headers.insert("authorization", HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn bearer_header_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn missing_and_malformed_headers_yield_none() {
        assert_eq!(extract_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic xyz"));
        assert_eq!(extract_token(&headers), None);
    }
}
