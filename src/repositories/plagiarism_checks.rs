use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::PlagiarismCheck;
use crate::db::types::PlagiarismCheckStatus;

pub(crate) const COLUMNS: &str = "\
    id, submission_id, course_id, assignment_id, question_id, language_name, \
    student_id, status, retry_count, error, claimed_at, created_at, updated_at";

pub(crate) struct EnqueueCheck<'a> {
    pub(crate) id: &'a str,
    pub(crate) submission_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) assignment_id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) language_name: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn enqueue(pool: &PgPool, params: EnqueueCheck<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO plagiarism_checks (
            id, submission_id, course_id, assignment_id, question_id, language_name,
            student_id, status, retry_count, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,0,$9,$10)",
    )
    .bind(params.id)
    .bind(params.submission_id)
    .bind(params.course_id)
    .bind(params.assignment_id)
    .bind(params.question_id)
    .bind(params.language_name)
    .bind(params.student_id)
    .bind(PlagiarismCheckStatus::Pending)
    .bind(params.now)
    .bind(params.now)
    .execute(pool)
    .await?;
    Ok(())
}

/// Atomically claims the oldest pending check so that concurrent workers
/// never process the same row twice.
pub(crate) async fn claim_next_for_processing(
    pool: &PgPool,
    now: PrimitiveDateTime,
) -> Result<Option<PlagiarismCheck>, sqlx::Error> {
    sqlx::query_as::<_, PlagiarismCheck>(&format!(
        "WITH candidate AS (
            SELECT id AS candidate_id FROM plagiarism_checks
            WHERE status = $1
            ORDER BY retry_count, created_at
            FOR UPDATE SKIP LOCKED
            LIMIT 1
        )
        UPDATE plagiarism_checks
        SET status = $2, claimed_at = $3, updated_at = $3, error = NULL
        FROM candidate
        WHERE plagiarism_checks.id = candidate.candidate_id
        RETURNING {COLUMNS}"
    ))
    .bind(PlagiarismCheckStatus::Pending)
    .bind(PlagiarismCheckStatus::Processing)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn mark_completed(
    pool: &PgPool,
    id: &str,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE plagiarism_checks SET status = $1, updated_at = $2 WHERE id = $3")
        .bind(PlagiarismCheckStatus::Completed)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Requeues the check for another attempt, or parks it as failed once the
/// retry budget is spent.
pub(crate) async fn mark_failed_or_retry(
    pool: &PgPool,
    id: &str,
    error: &str,
    max_retries: u32,
    now: PrimitiveDateTime,
) -> Result<PlagiarismCheckStatus, sqlx::Error> {
    let status: PlagiarismCheckStatus = sqlx::query_scalar(
        "UPDATE plagiarism_checks
         SET retry_count = retry_count + 1,
             status = CASE WHEN retry_count + 1 >= $1 THEN $2::plagiarismcheckstatus
                           ELSE $3::plagiarismcheckstatus END,
             error = $4,
             claimed_at = NULL,
             updated_at = $5
         WHERE id = $6
         RETURNING status",
    )
    .bind(max_retries as i32)
    .bind(PlagiarismCheckStatus::Failed)
    .bind(PlagiarismCheckStatus::Pending)
    .bind(error)
    .bind(now)
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(status)
}

/// Returns checks stuck in `processing` (claimed longer ago than the cutoff)
/// to the pending pool; covers worker crashes mid-check.
pub(crate) async fn requeue_stale_processing(
    pool: &PgPool,
    claimed_before: PrimitiveDateTime,
    now: PrimitiveDateTime,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE plagiarism_checks
         SET status = $1, claimed_at = NULL, updated_at = $2
         WHERE status = $3 AND claimed_at IS NOT NULL AND claimed_at < $4",
    )
    .bind(PlagiarismCheckStatus::Pending)
    .bind(now)
    .bind(PlagiarismCheckStatus::Processing)
    .bind(claimed_before)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn find_by_submission(
    pool: &PgPool,
    submission_id: &str,
) -> Result<Vec<PlagiarismCheck>, sqlx::Error> {
    sqlx::query_as::<_, PlagiarismCheck>(&format!(
        "SELECT {COLUMNS} FROM plagiarism_checks WHERE submission_id = $1 ORDER BY created_at"
    ))
    .bind(submission_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete_by_assignment(
    pool: &PgPool,
    assignment_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM plagiarism_checks WHERE assignment_id = $1")
        .bind(assignment_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
