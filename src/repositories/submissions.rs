use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Submission;

pub(crate) const COLUMNS: &str = "\
    id, student_id, student_name, assignment_id, course_id, question_id, \
    question_num, question_info, language_name, test_case_summary, answer, \
    created_at, updated_at";

pub(crate) struct CreateSubmission<'a> {
    pub(crate) id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) student_name: &'a str,
    pub(crate) assignment_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) question_num: i32,
    pub(crate) question_info: &'a str,
    pub(crate) language_name: &'a str,
    pub(crate) test_case_summary: &'a str,
    pub(crate) answer: &'a str,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) struct SubmissionKey<'a> {
    pub(crate) course_id: &'a str,
    pub(crate) assignment_id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) student_id: &'a str,
}

/// Inserts a new coding submission. A duplicate (student_id, question_id)
/// pair surfaces as a unique violation for the caller to map to a conflict.
pub(crate) async fn create(
    pool: &PgPool,
    params: CreateSubmission<'_>,
) -> Result<Submission, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "INSERT INTO submissions (
            id, student_id, student_name, assignment_id, course_id, question_id,
            question_num, question_info, language_name, test_case_summary, answer,
            created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.student_id)
    .bind(params.student_name)
    .bind(params.assignment_id)
    .bind(params.course_id)
    .bind(params.question_id)
    .bind(params.question_num)
    .bind(params.question_info)
    .bind(params.language_name)
    .bind(params.test_case_summary)
    .bind(params.answer)
    .bind(params.now)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn update_answer(
    pool: &PgPool,
    key: SubmissionKey<'_>,
    answer: &str,
    language_name: &str,
    test_case_summary: &str,
    now: PrimitiveDateTime,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "UPDATE submissions
         SET answer = $1, language_name = $2, test_case_summary = $3, updated_at = $4
         WHERE course_id = $5 AND assignment_id = $6 AND question_id = $7 AND student_id = $8
         RETURNING {COLUMNS}"
    ))
    .bind(answer)
    .bind(language_name)
    .bind(test_case_summary)
    .bind(now)
    .bind(key.course_id)
    .bind(key.assignment_id)
    .bind(key.question_id)
    .bind(key.student_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_by_student_question(
    pool: &PgPool,
    student_id: &str,
    question_id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions WHERE student_id = $1 AND question_id = $2"
    ))
    .bind(student_id)
    .bind(question_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_custom(
    pool: &PgPool,
    key: SubmissionKey<'_>,
    language_name: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions
         WHERE course_id = $1 AND assignment_id = $2 AND question_id = $3
           AND language_name = $4 AND student_id = $5"
    ))
    .bind(key.course_id)
    .bind(key.assignment_id)
    .bind(key.question_id)
    .bind(language_name)
    .bind(key.student_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!("SELECT {COLUMNS} FROM submissions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_for_assignment(
    pool: &PgPool,
    course_id: &str,
    assignment_id: &str,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions
         WHERE course_id = $1 AND assignment_id = $2
         ORDER BY created_at"
    ))
    .bind(course_id)
    .bind(assignment_id)
    .fetch_all(pool)
    .await
}

/// Comparison set for plagiarism checks: every other student's submission
/// to the same question in the same language.
pub(crate) async fn list_same_language_excluding(
    pool: &PgPool,
    key: SubmissionKey<'_>,
    language_name: &str,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions
         WHERE course_id = $1 AND assignment_id = $2 AND question_id = $3
           AND language_name = $4 AND student_id <> $5
         ORDER BY created_at"
    ))
    .bind(key.course_id)
    .bind(key.assignment_id)
    .bind(key.question_id)
    .bind(language_name)
    .bind(key.student_id)
    .fetch_all(pool)
    .await
}
