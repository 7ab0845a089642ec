// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the LearnFlow backend.

use thiserror::Error;

/// Why an authentication attempt was rejected.
///
/// The gateway collapses all four reasons into a single 401 response;
/// the distinction exists for logging and tests only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// The session token is not present in the store (never issued or revoked).
    UnknownSession,
    /// The session exists but its expiry instant has passed.
    ExpiredSession,
    /// Email/password pair did not match a stored credential.
    BadCredentials,
    /// The account exists but has been deactivated.
    InactiveAccount,
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthFailure::UnknownSession => write!(f, "unknown session"),
            AuthFailure::ExpiredSession => write!(f, "expired session"),
            AuthFailure::BadCredentials => write!(f, "invalid email or password"),
            AuthFailure::InactiveAccount => write!(f, "account is inactive"),
        }
    }
}

/// The primary error type used across all LearnFlow crates.
///
/// None of these variants are retried inside the core: expired sessions
/// require re-authentication, closed chat sessions require a new session,
/// and upstream completion failures are resent by the caller.
#[derive(Debug, Error)]
pub enum LearnFlowError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Authentication failure: unknown/expired session or bad credentials.
    #[error("authentication failed: {reason}")]
    Authentication {
        reason: AuthFailure,
    },

    /// A message append was attempted on a chat session already closed.
    #[error("chat session {session_id} is closed")]
    SessionClosed {
        session_id: String,
    },

    /// The external completion service failed or timed out.
    #[error("completion service unavailable: {message}")]
    UpstreamUnavailable {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Event bus hand-off failed. Logged and swallowed by the publisher;
    /// never crosses the gateway boundary.
    #[error("event publish failed: {message}")]
    Publish {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Uniqueness violation at the data layer (duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Request payload failed domain validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LearnFlowError {
    /// Shorthand for an authentication failure with the given reason.
    pub fn auth(reason: AuthFailure) -> Self {
        LearnFlowError::Authentication { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_display_is_stable() {
        assert_eq!(AuthFailure::UnknownSession.to_string(), "unknown session");
        assert_eq!(AuthFailure::ExpiredSession.to_string(), "expired session");
        assert_eq!(
            AuthFailure::BadCredentials.to_string(),
            "invalid email or password"
        );
        assert_eq!(AuthFailure::InactiveAccount.to_string(), "account is inactive");
    }

    #[test]
    fn bad_email_and_bad_password_are_indistinguishable() {
        // Both must render the same message so the gateway cannot leak
        // which part of the credential pair was wrong.
        let a = LearnFlowError::auth(AuthFailure::BadCredentials).to_string();
        let b = LearnFlowError::auth(AuthFailure::BadCredentials).to_string();
        assert_eq!(a, b);
    }

    #[test]
    fn session_closed_names_the_session() {
        let err = LearnFlowError::SessionClosed {
            session_id: "sess-42".into(),
        };
        assert!(err.to_string().contains("sess-42"));
    }

    #[test]
    fn all_variants_construct() {
        let _config = LearnFlowError::Config("test".into());
        let _storage = LearnFlowError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _auth = LearnFlowError::auth(AuthFailure::ExpiredSession);
        let _closed = LearnFlowError::SessionClosed {
            session_id: "s".into(),
        };
        let _upstream = LearnFlowError::UpstreamUnavailable {
            message: "test".into(),
            source: None,
        };
        let _publish = LearnFlowError::Publish {
            message: "test".into(),
            source: None,
        };
        let _conflict = LearnFlowError::Conflict("email already registered".into());
        let _not_found = LearnFlowError::NotFound("student 7".into());
        let _validation = LearnFlowError::Validation("empty content".into());
        let _internal = LearnFlowError::Internal("test".into());
    }
}
