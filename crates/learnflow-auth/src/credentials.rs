// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential store: registration, password verification, and account
//! lifecycle for student identities.

use learnflow_core::types::{NewStudent, Student};
use learnflow_core::{AuthFailure, LearnFlowError};
use learnflow_storage::Database;
use learnflow_storage::queries::students;
use tracing::{info, warn};

use crate::password;

/// Persists student identities and their password hashes.
///
/// Cheap to clone; clones share the same database handle.
#[derive(Clone)]
pub struct CredentialStore {
    db: Database,
}

impl CredentialStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Register a new student.
    ///
    /// The password is hashed with Argon2id before it touches storage.
    /// A duplicate email surfaces as [`LearnFlowError::Conflict`].
    pub async fn register(&self, new: &NewStudent) -> Result<Student, LearnFlowError> {
        let email = new.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(LearnFlowError::Validation(format!(
                "`{email}` is not a valid email address"
            )));
        }
        if new.password.len() < 8 {
            return Err(LearnFlowError::Validation(
                "password must be at least 8 characters".to_string(),
            ));
        }

        let password_hash = password::hash_password(&new.password)?;
        let public_id = uuid::Uuid::new_v4().to_string();
        let student = students::create_student(
            &self.db,
            &public_id,
            email,
            new.name.trim(),
            &password_hash,
            new.grade_level.as_deref(),
        )
        .await?;

        info!(email = %student.email, id = student.id, "student registered");
        Ok(student)
    }

    /// Verify an email/password pair and return the matching student.
    ///
    /// Unknown email and wrong password both fail with `BadCredentials` so
    /// the response cannot be used to probe which emails are registered.
    pub async fn authenticate(
        &self,
        email: &str,
        password_attempt: &str,
    ) -> Result<Student, LearnFlowError> {
        let Some(student) = students::get_student_by_email(&self.db, email).await? else {
            warn!(email, "login attempt with unknown email");
            return Err(LearnFlowError::auth(AuthFailure::BadCredentials));
        };

        if !password::verify_password(password_attempt, &student.password_hash)? {
            warn!(email, "failed login attempt");
            return Err(LearnFlowError::auth(AuthFailure::BadCredentials));
        }

        if !student.is_active {
            return Err(LearnFlowError::auth(AuthFailure::InactiveAccount));
        }

        info!(email, "student authenticated");
        Ok(student)
    }

    /// Change a student's password after verifying the old one.
    pub async fn change_password(
        &self,
        student_id: i64,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), LearnFlowError> {
        if new_password.len() < 8 {
            return Err(LearnFlowError::Validation(
                "password must be at least 8 characters".to_string(),
            ));
        }

        let Some(student) = students::get_student(&self.db, student_id).await? else {
            return Err(LearnFlowError::NotFound(format!("student {student_id}")));
        };

        if !password::verify_password(old_password, &student.password_hash)? {
            return Err(LearnFlowError::auth(AuthFailure::BadCredentials));
        }

        let new_hash = password::hash_password(new_password)?;
        students::update_password_hash(&self.db, student_id, &new_hash).await?;
        info!(email = %student.email, "password changed");
        Ok(())
    }

    /// Soft-deactivate a student account. The row is never deleted.
    pub async fn deactivate(&self, student_id: i64) -> Result<(), LearnFlowError> {
        students::set_active(&self.db, student_id, false).await?;
        info!(student_id, "student deactivated");
        Ok(())
    }

    /// Look up a student by row ID.
    pub async fn get_student(&self, student_id: i64) -> Result<Option<Student>, LearnFlowError> {
        students::get_student(&self.db, student_id).await
    }

    /// Look up a student by email.
    pub async fn get_student_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Student>, LearnFlowError> {
        students::get_student_by_email(&self.db, email).await
    }
}
