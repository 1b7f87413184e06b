use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::PlagiarismRecord;

pub(crate) const COLUMNS: &str = "\
    id, course_id, assignment_id, question_id, language_name, \
    student_1_id, student_1_name, student_2_id, student_2_name, similarity, \
    created_at, updated_at";

pub(crate) struct UpsertPlagiarismRecord<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) assignment_id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) language_name: &'a str,
    pub(crate) student_1_id: &'a str,
    pub(crate) student_1_name: &'a str,
    pub(crate) student_2_id: &'a str,
    pub(crate) student_2_name: &'a str,
    pub(crate) similarity: f64,
    pub(crate) now: PrimitiveDateTime,
}

/// Insert-or-overwrite keyed on the full pair identity. Similarity is
/// clamped to the 0..=100 range before it is stored.
pub(crate) async fn upsert(
    pool: &PgPool,
    params: UpsertPlagiarismRecord<'_>,
) -> Result<PlagiarismRecord, sqlx::Error> {
    let similarity = params.similarity.clamp(0.0, 100.0);

    sqlx::query_as::<_, PlagiarismRecord>(&format!(
        "INSERT INTO plagiarism_records (
            id, course_id, assignment_id, question_id, language_name,
            student_1_id, student_1_name, student_2_id, student_2_name, similarity,
            created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
        ON CONFLICT (course_id, assignment_id, question_id, language_name,
                     student_1_id, student_2_id)
        DO UPDATE SET similarity = EXCLUDED.similarity,
                      student_1_name = EXCLUDED.student_1_name,
                      student_2_name = EXCLUDED.student_2_name,
                      updated_at = EXCLUDED.updated_at
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.assignment_id)
    .bind(params.question_id)
    .bind(params.language_name)
    .bind(params.student_1_id)
    .bind(params.student_1_name)
    .bind(params.student_2_id)
    .bind(params.student_2_name)
    .bind(similarity)
    .bind(params.now)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_for_assignment(
    pool: &PgPool,
    course_id: &str,
    assignment_id: &str,
) -> Result<Vec<PlagiarismRecord>, sqlx::Error> {
    sqlx::query_as::<_, PlagiarismRecord>(&format!(
        "SELECT {COLUMNS} FROM plagiarism_records
         WHERE course_id = $1 AND assignment_id = $2
         ORDER BY similarity DESC"
    ))
    .bind(course_id)
    .bind(assignment_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete_by_assignment(
    pool: &PgPool,
    assignment_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM plagiarism_records WHERE assignment_id = $1")
        .bind(assignment_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
