// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Student account CRUD operations.

use learnflow_core::LearnFlowError;
use rusqlite::params;

use crate::database::{Database, is_constraint_violation, map_tr_err};
use crate::models::Student;

fn row_to_student(row: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        public_id: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        password_hash: row.get(4)?,
        grade_level: row.get(5)?,
        is_active: row.get::<_, i64>(6)? != 0,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

const STUDENT_COLUMNS: &str = "id, public_id, email, name, password_hash, grade_level, \
                               is_active, created_at, updated_at";

/// Insert a new student and return the stored row.
///
/// A duplicate email surfaces as [`LearnFlowError::Conflict`].
pub async fn create_student(
    db: &Database,
    public_id: &str,
    email: &str,
    name: &str,
    password_hash: &str,
    grade_level: Option<&str>,
) -> Result<Student, LearnFlowError> {
    let public_id = public_id.to_string();
    let email = email.to_string();
    let name = name.to_string();
    let password_hash = password_hash.to_string();
    let grade_level = grade_level.map(|g| g.to_string());
    db.connection()
        .call(move |conn| {
            let insert = conn.execute(
                "INSERT INTO students (public_id, email, name, password_hash, grade_level,
                                       is_active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1,
                         strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                         strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                params![public_id, email, name, password_hash, grade_level],
            );
            match insert {
                Ok(_) => {}
                Err(e) if is_constraint_violation(&e) => {
                    return Ok(Err(LearnFlowError::Conflict(
                        "email already registered".to_string(),
                    )));
                }
                Err(e) => return Err(e),
            }
            let id = conn.last_insert_rowid();
            let student = conn.query_row(
                &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1"),
                params![id],
                row_to_student,
            )?;
            Ok(Ok(student))
        })
        .await
        .map_err(map_tr_err)?
}

/// Get a student by row ID.
pub async fn get_student(db: &Database, id: i64) -> Result<Option<Student>, LearnFlowError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1"),
                params![id],
                row_to_student,
            );
            match result {
                Ok(student) => Ok(Some(student)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Get a student by login email.
pub async fn get_student_by_email(
    db: &Database,
    email: &str,
) -> Result<Option<Student>, LearnFlowError> {
    let email = email.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE email = ?1"),
                params![email],
                row_to_student,
            );
            match result {
                Ok(student) => Ok(Some(student)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Replace a student's password hash and bump `updated_at`.
pub async fn update_password_hash(
    db: &Database,
    id: i64,
    password_hash: &str,
) -> Result<(), LearnFlowError> {
    let password_hash = password_hash.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE students
                 SET password_hash = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![password_hash, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Set the active flag (soft deactivation / reactivation).
pub async fn set_active(db: &Database, id: i64, active: bool) -> Result<(), LearnFlowError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE students
                 SET is_active = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![i64::from(active), id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn create_and_get_student_roundtrips() {
        let (db, _dir) = setup_db().await;

        let created = create_student(&db, "pub-1", "alice@example.com", "Alice", "hash", None)
            .await
            .unwrap();
        assert!(created.id > 0);
        assert!(created.is_active);

        let fetched = get_student(&db, created.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "alice@example.com");
        assert_eq!(fetched.password_hash, "hash");
        assert_eq!(fetched.created_at, created.created_at);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let (db, _dir) = setup_db().await;

        create_student(&db, "pub-1", "bob@example.com", "Bob", "h1", None)
            .await
            .unwrap();
        let err = create_student(&db, "pub-2", "bob@example.com", "Bobby", "h2", None)
            .await
            .unwrap_err();
        assert!(matches!(err, LearnFlowError::Conflict(_)));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn lookup_by_email_and_missing_rows() {
        let (db, _dir) = setup_db().await;

        create_student(&db, "pub-1", "carol@example.com", "Carol", "h", Some("7"))
            .await
            .unwrap();

        let found = get_student_by_email(&db, "carol@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.grade_level.as_deref(), Some("7"));

        assert!(get_student_by_email(&db, "nobody@example.com")
            .await
            .unwrap()
            .is_none());
        assert!(get_student(&db, 9999).await.unwrap().is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn password_update_and_deactivation() {
        let (db, _dir) = setup_db().await;

        let student = create_student(&db, "pub-1", "dee@example.com", "Dee", "old", None)
            .await
            .unwrap();

        update_password_hash(&db, student.id, "new").await.unwrap();
        set_active(&db, student.id, false).await.unwrap();

        let fetched = get_student(&db, student.id).await.unwrap().unwrap();
        assert_eq!(fetched.password_hash, "new");
        assert!(!fetched.is_active);

        db.close().await.unwrap();
    }
}
