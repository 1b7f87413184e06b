use anyhow::Result;
use time::Duration;

use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::submissions::SubmissionKey;
use crate::services::plagiarism::PlagiarismService;

const STALE_CLAIM_MINUTES: i64 = 10;

/// Claims and processes one queued check. Returns false when the queue was
/// empty so the caller can back off.
pub(crate) async fn process_next_check(
    state: &AppState,
    service: &PlagiarismService,
) -> Result<bool> {
    let now = primitive_now_utc();
    let Some(check) = repositories::plagiarism_checks::claim_next_for_processing(state.db(), now)
        .await?
    else {
        return Ok(false);
    };

    let submission =
        repositories::submissions::find_by_id(state.db(), &check.submission_id).await?;

    // The submission may have been cascaded away while the check waited in
    // the queue; there is nothing left to compare.
    let Some(submission) = submission else {
        tracing::info!(
            check_id = %check.id,
            submission_id = %check.submission_id,
            "Submission gone before plagiarism check ran"
        );
        repositories::plagiarism_checks::mark_completed(state.db(), &check.id, primitive_now_utc())
            .await?;
        return Ok(true);
    };

    let others = repositories::submissions::list_same_language_excluding(
        state.db(),
        SubmissionKey {
            course_id: &check.course_id,
            assignment_id: &check.assignment_id,
            question_id: &check.question_id,
            student_id: &check.student_id,
        },
        &check.language_name,
    )
    .await?;

    if others.is_empty() {
        repositories::plagiarism_checks::mark_completed(state.db(), &check.id, primitive_now_utc())
            .await?;
        metrics::counter!("plagiarism_checks_total", "event" => "completed").increment(1);
        return Ok(true);
    }

    match service.submit_for_check(&submission, &others).await {
        Ok(()) => {
            repositories::plagiarism_checks::mark_completed(
                state.db(),
                &check.id,
                primitive_now_utc(),
            )
            .await?;
            metrics::counter!("plagiarism_checks_total", "event" => "completed").increment(1);
        }
        Err(err) => {
            let status = repositories::plagiarism_checks::mark_failed_or_retry(
                state.db(),
                &check.id,
                &err.to_string(),
                state.settings().plagiarism().max_submit_retries,
                primitive_now_utc(),
            )
            .await?;
            metrics::counter!("plagiarism_checks_total", "event" => "failed").increment(1);
            tracing::warn!(
                check_id = %check.id,
                submission_id = %check.submission_id,
                status = ?status,
                error = %err,
                "Plagiarism check failed"
            );
        }
    }

    Ok(true)
}

/// Returns checks stuck in `processing` to the pending pool; covers worker
/// crashes between claim and completion.
pub(crate) async fn requeue_stale_checks(state: &AppState) -> Result<()> {
    let now = primitive_now_utc();
    let cutoff = now - Duration::minutes(STALE_CLAIM_MINUTES);
    let requeued =
        repositories::plagiarism_checks::requeue_stale_processing(state.db(), cutoff, now).await?;

    if requeued > 0 {
        tracing::info!(requeued, "Requeued stale plagiarism checks");
    }

    Ok(())
}
