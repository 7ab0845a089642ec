// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session manager: issues, validates, and revokes opaque session tokens.
//!
//! A session is valid iff the current time is strictly before its expiry
//! and it has not been revoked. Validation is read-only; nothing refreshes
//! a session implicitly, and expired sessions are only removed by the
//! periodic sweep (or explicit revocation).

use chrono::{DateTime, Duration, Utc};
use learnflow_core::types::{AuthSession, Student};
use learnflow_core::{AuthFailure, LearnFlowError};
use learnflow_storage::Database;
use learnflow_storage::queries::{auth_sessions, students};
use rand::RngCore;
use tracing::{debug, info};

/// Formats a UTC instant the way storage stores timestamps.
fn fmt_utc(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Issues and validates time-bounded session tokens.
///
/// Cheap to clone; clones share the same database handle.
#[derive(Clone)]
pub struct SessionManager {
    db: Database,
    ttl: Duration,
}

impl SessionManager {
    /// Creates a session manager with the configured TTL.
    pub fn new(db: Database, config: &learnflow_config::model::AuthConfig) -> Self {
        Self {
            db,
            ttl: Duration::hours(i64::from(config.session_ttl_hours)),
        }
    }

    /// Issue a new session for `student_id`, valid for the configured TTL.
    ///
    /// Tokens are 32 random bytes, hex-encoded. Existing sessions for the
    /// same student are left alone; concurrent sessions are allowed.
    pub async fn issue(&self, student_id: i64) -> Result<AuthSession, LearnFlowError> {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let now = Utc::now();
        let session = AuthSession {
            token,
            student_id,
            created_at: fmt_utc(now),
            expires_at: fmt_utc(now + self.ttl),
        };
        auth_sessions::insert_session(&self.db, &session).await?;
        info!(student_id, expires_at = %session.expires_at, "session issued");
        Ok(session)
    }

    /// Validate a token and return the owning student.
    ///
    /// Read-only: callers decide whether to re-issue. Fails with
    /// `UnknownSession` for tokens never issued (or already revoked) and
    /// `ExpiredSession` at or after the expiry instant.
    pub async fn validate(&self, token: &str) -> Result<Student, LearnFlowError> {
        self.validate_at(token, Utc::now()).await
    }

    /// Clock-explicit variant of [`validate`](Self::validate), used directly
    /// by tests that need to step past the expiry instant.
    pub async fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Student, LearnFlowError> {
        let Some(session) = auth_sessions::get_session(&self.db, token).await? else {
            return Err(LearnFlowError::auth(AuthFailure::UnknownSession));
        };

        let expires_at = DateTime::parse_from_rfc3339(&session.expires_at)
            .map_err(|e| {
                LearnFlowError::Internal(format!(
                    "stored expiry `{}` is not RFC 3339: {e}",
                    session.expires_at
                ))
            })?
            .with_timezone(&Utc);

        if now >= expires_at {
            debug!(student_id = session.student_id, "rejected expired session");
            return Err(LearnFlowError::auth(AuthFailure::ExpiredSession));
        }

        let Some(student) = students::get_student(&self.db, session.student_id).await? else {
            return Err(LearnFlowError::Internal(format!(
                "session references missing student {}",
                session.student_id
            )));
        };

        if !student.is_active {
            return Err(LearnFlowError::auth(AuthFailure::InactiveAccount));
        }

        Ok(student)
    }

    /// Revoke a token. Idempotent: revoking an unknown token is a no-op.
    pub async fn revoke(&self, token: &str) -> Result<(), LearnFlowError> {
        auth_sessions::delete_session(&self.db, token).await?;
        debug!("session revoked");
        Ok(())
    }

    /// Delete every session at or past its expiry. Returns the count removed.
    pub async fn sweep_expired(&self) -> Result<u64, LearnFlowError> {
        let removed = auth_sessions::delete_expired(&self.db, &fmt_utc(Utc::now())).await?;
        if removed > 0 {
            info!(removed, "swept expired sessions");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialStore;
    use learnflow_core::types::NewStudent;
    use tempfile::tempdir;

    async fn setup() -> (SessionManager, CredentialStore, i64, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();
        let store = CredentialStore::new(db.clone());
        let student = store
            .register(&NewStudent {
                email: "alice@example.com".to_string(),
                name: "Alice".to_string(),
                password: "hunter2hunter2".to_string(),
                grade_level: None,
            })
            .await
            .unwrap();
        let sessions =
            SessionManager::new(db, &learnflow_config::model::AuthConfig::default());
        (sessions, store, student.id, dir)
    }

    #[tokio::test]
    async fn issued_session_validates_immediately() {
        let (sessions, _store, student_id, _dir) = setup().await;

        let session = sessions.issue(student_id).await.unwrap();
        assert_eq!(session.token.len(), 64); // 32 bytes hex-encoded

        let student = sessions.validate(&session.token).await.unwrap();
        assert_eq!(student.id, student_id);
    }

    #[tokio::test]
    async fn expiry_window_is_24_hours_by_default() {
        let (sessions, _store, student_id, _dir) = setup().await;

        let session = sessions.issue(student_id).await.unwrap();
        let created = DateTime::parse_from_rfc3339(&session.created_at).unwrap();
        let expires = DateTime::parse_from_rfc3339(&session.expires_at).unwrap();
        assert_eq!(expires - created, Duration::hours(24));
    }

    #[tokio::test]
    async fn validate_fails_at_and_after_expiry_succeeds_before() {
        let (sessions, _store, student_id, _dir) = setup().await;

        let session = sessions.issue(student_id).await.unwrap();
        let expires_at = DateTime::parse_from_rfc3339(&session.expires_at)
            .unwrap()
            .with_timezone(&Utc);

        // Strictly before the expiry instant: valid.
        sessions
            .validate_at(&session.token, expires_at - Duration::milliseconds(1))
            .await
            .unwrap();

        // At the expiry instant: invalid.
        let at = sessions
            .validate_at(&session.token, expires_at)
            .await
            .unwrap_err();
        assert!(matches!(
            at,
            LearnFlowError::Authentication {
                reason: AuthFailure::ExpiredSession
            }
        ));

        // After the expiry instant: invalid.
        let after = sessions
            .validate_at(&session.token, expires_at + Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(
            after,
            LearnFlowError::Authentication {
                reason: AuthFailure::ExpiredSession
            }
        ));
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let (sessions, _store, _student_id, _dir) = setup().await;

        let err = sessions.validate("deadbeef").await.unwrap_err();
        assert!(matches!(
            err,
            LearnFlowError::Authentication {
                reason: AuthFailure::UnknownSession
            }
        ));
    }

    #[tokio::test]
    async fn revoke_is_idempotent_and_invalidates() {
        let (sessions, _store, student_id, _dir) = setup().await;

        let session = sessions.issue(student_id).await.unwrap();
        sessions.revoke(&session.token).await.unwrap();
        // Second revoke of the same token, and one for a token never issued.
        sessions.revoke(&session.token).await.unwrap();
        sessions.revoke("never-issued").await.unwrap();

        let err = sessions.validate(&session.token).await.unwrap_err();
        assert!(matches!(
            err,
            LearnFlowError::Authentication {
                reason: AuthFailure::UnknownSession
            }
        ));
    }

    #[tokio::test]
    async fn concurrent_sessions_do_not_interfere() {
        let (sessions, _store, student_id, _dir) = setup().await;

        let first = sessions.issue(student_id).await.unwrap();
        let second = sessions.issue(student_id).await.unwrap();
        assert_ne!(first.token, second.token);

        sessions.revoke(&first.token).await.unwrap();
        sessions.validate(&second.token).await.unwrap();
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_sessions() {
        let (sessions, _store, student_id, dir) = setup().await;

        // One live session via the manager, one already-expired planted row.
        let live = sessions.issue(student_id).await.unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();
        auth_sessions::insert_session(
            &db,
            &AuthSession {
                token: "stale".to_string(),
                student_id,
                created_at: "2020-01-01T00:00:00.000Z".to_string(),
                expires_at: "2020-01-02T00:00:00.000Z".to_string(),
            },
        )
        .await
        .unwrap();

        let removed = sessions.sweep_expired().await.unwrap();
        assert_eq!(removed, 1);
        sessions.validate(&live.token).await.unwrap();
    }

    #[tokio::test]
    async fn deactivated_student_fails_validation() {
        let (sessions, store, student_id, _dir) = setup().await;

        let session = sessions.issue(student_id).await.unwrap();
        store.deactivate(student_id).await.unwrap();

        let err = sessions.validate(&session.token).await.unwrap_err();
        assert!(matches!(
            err,
            LearnFlowError::Authentication {
                reason: AuthFailure::InactiveAccount
            }
        ));
    }
}
