use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{Assignment, AssignmentQuestion, StoredFileRef};

pub(crate) const COLUMNS: &str = "\
    id, course_id, name, description, due_date, visible_to_students, \
    instructor_files, questions, created_at, updated_at";

pub(crate) struct CreateAssignment<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) due_date: Option<PrimitiveDateTime>,
    pub(crate) visible_to_students: bool,
    pub(crate) instructor_files: Vec<StoredFileRef>,
    pub(crate) questions: Vec<AssignmentQuestion>,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) struct UpdateAssignment<'a> {
    pub(crate) name: Option<&'a str>,
    pub(crate) description: Option<&'a str>,
    pub(crate) due_date: Option<PrimitiveDateTime>,
    pub(crate) visible_to_students: Option<bool>,
    pub(crate) instructor_files: Option<Vec<StoredFileRef>>,
    pub(crate) questions: Option<Vec<AssignmentQuestion>>,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateAssignment<'_>,
) -> Result<Assignment, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "INSERT INTO assignments (
            id, course_id, name, description, due_date, visible_to_students,
            instructor_files, questions, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.name)
    .bind(params.description)
    .bind(params.due_date)
    .bind(params.visible_to_students)
    .bind(Json(params.instructor_files))
    .bind(Json(params.questions))
    .bind(params.now)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateAssignment<'_>,
) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "UPDATE assignments
         SET name = COALESCE($1, name),
             description = COALESCE($2, description),
             due_date = COALESCE($3, due_date),
             visible_to_students = COALESCE($4, visible_to_students),
             instructor_files = COALESCE($5, instructor_files),
             questions = COALESCE($6, questions),
             updated_at = $7
         WHERE id = $8
         RETURNING {COLUMNS}"
    ))
    .bind(params.name)
    .bind(params.description)
    .bind(params.due_date)
    .bind(params.visible_to_students)
    .bind(params.instructor_files.map(Json))
    .bind(params.questions.map(Json))
    .bind(params.now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!("SELECT {COLUMNS} FROM assignments WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {COLUMNS} FROM assignments WHERE course_id = $1 ORDER BY created_at"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_visible_by_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {COLUMNS} FROM assignments
         WHERE course_id = $1 AND visible_to_students = TRUE
         ORDER BY created_at"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM assignments WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
