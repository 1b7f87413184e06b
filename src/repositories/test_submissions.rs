use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{TestResponse, TestSubmission};

pub(crate) const COLUMNS: &str = "\
    id, student_id, student_name, test_id, course_id, responses, total_marks, \
    created_at, updated_at";

pub(crate) struct CreateTestSubmission<'a> {
    pub(crate) id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) student_name: &'a str,
    pub(crate) test_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) responses: Vec<TestResponse>,
    pub(crate) total_marks: i32,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateTestSubmission<'_>,
) -> Result<TestSubmission, sqlx::Error> {
    sqlx::query_as::<_, TestSubmission>(&format!(
        "INSERT INTO test_submissions (
            id, student_id, student_name, test_id, course_id, responses, total_marks,
            created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.student_id)
    .bind(params.student_name)
    .bind(params.test_id)
    .bind(params.course_id)
    .bind(Json(params.responses))
    .bind(params.total_marks)
    .bind(params.now)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

/// Wholesale replacement of the response set; the caller supplies already
/// trusted per-question marks and the recomputed total.
pub(crate) async fn replace_responses(
    pool: &PgPool,
    id: &str,
    responses: Vec<TestResponse>,
    total_marks: i32,
    now: PrimitiveDateTime,
) -> Result<Option<TestSubmission>, sqlx::Error> {
    sqlx::query_as::<_, TestSubmission>(&format!(
        "UPDATE test_submissions
         SET responses = $1, total_marks = $2, updated_at = $3
         WHERE id = $4
         RETURNING {COLUMNS}"
    ))
    .bind(Json(responses))
    .bind(total_marks)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<TestSubmission>, sqlx::Error> {
    sqlx::query_as::<_, TestSubmission>(&format!(
        "SELECT {COLUMNS} FROM test_submissions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<TestSubmission>, sqlx::Error> {
    sqlx::query_as::<_, TestSubmission>(&format!(
        "SELECT {COLUMNS} FROM test_submissions ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_test(
    pool: &PgPool,
    test_id: &str,
) -> Result<Vec<TestSubmission>, sqlx::Error> {
    sqlx::query_as::<_, TestSubmission>(&format!(
        "SELECT {COLUMNS} FROM test_submissions WHERE test_id = $1 ORDER BY created_at"
    ))
    .bind(test_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<TestSubmission>, sqlx::Error> {
    sqlx::query_as::<_, TestSubmission>(&format!(
        "SELECT {COLUMNS} FROM test_submissions WHERE student_id = $1 ORDER BY created_at"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<TestSubmission>, sqlx::Error> {
    sqlx::query_as::<_, TestSubmission>(&format!(
        "SELECT {COLUMNS} FROM test_submissions WHERE course_id = $1 ORDER BY created_at"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM test_submissions WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
