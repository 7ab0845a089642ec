// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Submission storage operations.

use learnflow_core::LearnFlowError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::Submission;

fn row_to_submission(row: &rusqlite::Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: row.get(0)?,
        student_id: row.get(1)?,
        exercise_id: row.get(2)?,
        code: row.get(3)?,
        language: row.get(4)?,
        status: row.get(5)?,
        score: row.get(6)?,
        feedback: row.get(7)?,
        submitted_at: row.get(8)?,
        completed_at: row.get(9)?,
    })
}

const SUBMISSION_COLUMNS: &str = "id, student_id, exercise_id, code, language, status, score, \
                                  feedback, submitted_at, completed_at";

/// Insert a new submission in `submitted` state and return the stored row.
pub async fn insert_submission(
    db: &Database,
    student_id: i64,
    exercise_id: i64,
    code: &str,
    language: &str,
) -> Result<Submission, LearnFlowError> {
    let code = code.to_string();
    let language = language.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO submissions (student_id, exercise_id, code, language, status,
                                          submitted_at)
                 VALUES (?1, ?2, ?3, ?4, 'submitted', strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                params![student_id, exercise_id, code, language],
            )?;
            let id = conn.last_insert_rowid();
            let submission = conn.query_row(
                &format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?1"),
                params![id],
                row_to_submission,
            )?;
            Ok(submission)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a submission by ID.
pub async fn get_submission(
    db: &Database,
    id: i64,
) -> Result<Option<Submission>, LearnFlowError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?1"),
                params![id],
                row_to_submission,
            );
            match result {
                Ok(submission) => Ok(Some(submission)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List a student's submissions, newest first.
pub async fn list_for_student(
    db: &Database,
    student_id: i64,
    limit: i64,
) -> Result<Vec<Submission>, LearnFlowError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUBMISSION_COLUMNS} FROM submissions
                 WHERE student_id = ?1
                 ORDER BY submitted_at DESC, id DESC
                 LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![student_id, limit], row_to_submission)?;
            let mut submissions = Vec::new();
            for row in rows {
                submissions.push(row?);
            }
            Ok(submissions)
        })
        .await
        .map_err(map_tr_err)
}

/// Record a grading outcome. Returns the updated row, or `None` when the
/// submission does not exist.
pub async fn apply_grade(
    db: &Database,
    id: i64,
    status: &str,
    score: Option<i64>,
    feedback: Option<&str>,
) -> Result<Option<Submission>, LearnFlowError> {
    let status = status.to_string();
    let feedback = feedback.map(|f| f.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE submissions
                 SET status = ?1, score = ?2, feedback = ?3,
                     completed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?4",
                params![status, score, feedback, id],
            )?;
            let result = conn.query_row(
                &format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?1"),
                params![id],
                row_to_submission,
            );
            match result {
                Ok(submission) => Ok(Some(submission)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}
