use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{StoredFileRef, TheorySubmission};

pub(crate) const COLUMNS: &str = "\
    id, student_id, student_name, assignment_id, course_id, comment, \
    submitted_files, created_at, updated_at";

pub(crate) struct CreateTheorySubmission<'a> {
    pub(crate) id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) student_name: &'a str,
    pub(crate) assignment_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) comment: Option<&'a str>,
    pub(crate) submitted_files: Vec<StoredFileRef>,
    pub(crate) now: PrimitiveDateTime,
}

/// Inserts a theory submission. A second submission by the same student for
/// the same assignment surfaces as a unique violation.
pub(crate) async fn create(
    pool: &PgPool,
    params: CreateTheorySubmission<'_>,
) -> Result<TheorySubmission, sqlx::Error> {
    sqlx::query_as::<_, TheorySubmission>(&format!(
        "INSERT INTO theory_submissions (
            id, student_id, student_name, assignment_id, course_id, comment,
            submitted_files, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.student_id)
    .bind(params.student_name)
    .bind(params.assignment_id)
    .bind(params.course_id)
    .bind(params.comment)
    .bind(Json(params.submitted_files))
    .bind(params.now)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn replace_content(
    pool: &PgPool,
    student_id: &str,
    assignment_id: &str,
    comment: Option<&str>,
    submitted_files: Vec<StoredFileRef>,
    now: PrimitiveDateTime,
) -> Result<Option<TheorySubmission>, sqlx::Error> {
    sqlx::query_as::<_, TheorySubmission>(&format!(
        "UPDATE theory_submissions
         SET comment = $1, submitted_files = $2, updated_at = $3
         WHERE student_id = $4 AND assignment_id = $5
         RETURNING {COLUMNS}"
    ))
    .bind(comment)
    .bind(Json(submitted_files))
    .bind(now)
    .bind(student_id)
    .bind(assignment_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_by_student_assignment(
    pool: &PgPool,
    student_id: &str,
    assignment_id: &str,
) -> Result<Option<TheorySubmission>, sqlx::Error> {
    sqlx::query_as::<_, TheorySubmission>(&format!(
        "SELECT {COLUMNS} FROM theory_submissions WHERE student_id = $1 AND assignment_id = $2"
    ))
    .bind(student_id)
    .bind(assignment_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_for_assignment(
    pool: &PgPool,
    course_id: &str,
    assignment_id: &str,
) -> Result<Vec<TheorySubmission>, sqlx::Error> {
    sqlx::query_as::<_, TheorySubmission>(&format!(
        "SELECT {COLUMNS} FROM theory_submissions
         WHERE course_id = $1 AND assignment_id = $2
         ORDER BY created_at"
    ))
    .bind(course_id)
    .bind(assignment_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_assignment(
    pool: &PgPool,
    assignment_id: &str,
) -> Result<Vec<TheorySubmission>, sqlx::Error> {
    sqlx::query_as::<_, TheorySubmission>(&format!(
        "SELECT {COLUMNS} FROM theory_submissions WHERE assignment_id = $1"
    ))
    .bind(assignment_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete_by_assignment(
    pool: &PgPool,
    assignment_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM theory_submissions WHERE assignment_id = $1")
        .bind(assignment_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
