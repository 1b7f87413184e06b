use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{StoredFileRef, Test, TestQuestion};
use crate::db::types::TestType;

pub(crate) const COLUMNS: &str = "\
    id, course_id, name, test_type, description, scheduled_at, duration_minutes, \
    visible_to_students, files, questions, created_at, updated_at";

pub(crate) struct CreateTest<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) test_type: TestType,
    pub(crate) description: Option<&'a str>,
    pub(crate) scheduled_at: Option<PrimitiveDateTime>,
    pub(crate) duration_minutes: Option<i32>,
    pub(crate) visible_to_students: bool,
    pub(crate) files: Vec<StoredFileRef>,
    pub(crate) questions: Vec<TestQuestion>,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) struct UpdateTest<'a> {
    pub(crate) name: Option<&'a str>,
    pub(crate) description: Option<&'a str>,
    pub(crate) scheduled_at: Option<PrimitiveDateTime>,
    pub(crate) duration_minutes: Option<i32>,
    pub(crate) visible_to_students: Option<bool>,
    pub(crate) files: Option<Vec<StoredFileRef>>,
    pub(crate) questions: Option<Vec<TestQuestion>>,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateTest<'_>) -> Result<Test, sqlx::Error> {
    sqlx::query_as::<_, Test>(&format!(
        "INSERT INTO tests (
            id, course_id, name, test_type, description, scheduled_at, duration_minutes,
            visible_to_students, files, questions, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.name)
    .bind(params.test_type)
    .bind(params.description)
    .bind(params.scheduled_at)
    .bind(params.duration_minutes)
    .bind(params.visible_to_students)
    .bind(Json(params.files))
    .bind(Json(params.questions))
    .bind(params.now)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateTest<'_>,
) -> Result<Option<Test>, sqlx::Error> {
    sqlx::query_as::<_, Test>(&format!(
        "UPDATE tests
         SET name = COALESCE($1, name),
             description = COALESCE($2, description),
             scheduled_at = COALESCE($3, scheduled_at),
             duration_minutes = COALESCE($4, duration_minutes),
             visible_to_students = COALESCE($5, visible_to_students),
             files = COALESCE($6, files),
             questions = COALESCE($7, questions),
             updated_at = $8
         WHERE id = $9
         RETURNING {COLUMNS}"
    ))
    .bind(params.name)
    .bind(params.description)
    .bind(params.scheduled_at)
    .bind(params.duration_minutes)
    .bind(params.visible_to_students)
    .bind(params.files.map(Json))
    .bind(params.questions.map(Json))
    .bind(params.now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Test>, sqlx::Error> {
    sqlx::query_as::<_, Test>(&format!("SELECT {COLUMNS} FROM tests WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Test>, sqlx::Error> {
    sqlx::query_as::<_, Test>(&format!(
        "SELECT {COLUMNS} FROM tests WHERE course_id = $1 ORDER BY created_at"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_visible_by_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Test>, sqlx::Error> {
    sqlx::query_as::<_, Test>(&format!(
        "SELECT {COLUMNS} FROM tests
         WHERE course_id = $1 AND visible_to_students = TRUE
         ORDER BY created_at"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tests WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
