use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{AssignmentQuestion, Submission};
use crate::repositories;
use crate::repositories::submissions::{CreateSubmission, SubmissionKey};
use crate::schemas::submission::{
    AssignmentScopeQuery, CompareQuery, CompareResponse, CustomQuery, SubmissionCreate,
    SubmissionResponse, SubmissionUpdate,
};
use crate::services::test_cases;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/submission", post(create_submission))
        .route("/submission/compare", get(compare_submission))
        .route("/submission/custom", get(custom_submission))
        .route("/submission/update", patch(update_submission))
        .route("/submissions", get(list_submissions))
}

/// Full grading workflow: resolve the question, run its test cases through
/// the judge, persist the summarized result, then queue a plagiarism check.
/// Nothing is persisted when judging fails.
async fn create_submission(
    State(state): State<AppState>,
    Json(payload): Json<SubmissionCreate>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let question =
        resolve_question(&state, &payload.assignment_id, &payload.course_id, &payload.question_id)
            .await?;
    let summary = grade_answer(&state, &question, payload.language_id, &payload.answer).await?;

    let now = primitive_now_utc();
    let submission = repositories::submissions::create(
        state.db(),
        CreateSubmission {
            id: &Uuid::new_v4().to_string(),
            student_id: &payload.student_id,
            student_name: &payload.student_name,
            assignment_id: &payload.assignment_id,
            course_id: &payload.course_id,
            question_id: &payload.question_id,
            question_num: question.question_num,
            question_info: &question.question_info,
            language_name: &payload.language_name,
            test_case_summary: &summary,
            answer: &payload.answer,
            now,
        },
    )
    .await
    .map_err(|e| {
        if repositories::is_unique_violation(&e) {
            ApiError::Conflict("Submission already exists for this question".to_string())
        } else {
            ApiError::internal(e, "Failed to create submission")
        }
    })?;

    enqueue_plagiarism_check(&state, &submission).await;

    Ok((StatusCode::CREATED, Json(submission.into())))
}

async fn update_submission(
    State(state): State<AppState>,
    Json(payload): Json<SubmissionUpdate>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let question =
        resolve_question(&state, &payload.assignment_id, &payload.course_id, &payload.question_id)
            .await?;
    let summary = grade_answer(&state, &question, payload.language_id, &payload.answer).await?;

    let submission = repositories::submissions::update_answer(
        state.db(),
        SubmissionKey {
            course_id: &payload.course_id,
            assignment_id: &payload.assignment_id,
            question_id: &payload.question_id,
            student_id: &payload.student_id,
        },
        &payload.answer,
        &payload.language_name,
        &summary,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update submission"))?
    .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;

    enqueue_plagiarism_check(&state, &submission).await;

    Ok(Json(submission.into()))
}

/// Tells the client whether this student already answered this question, so
/// it can choose between create and update.
async fn compare_submission(
    State(state): State<AppState>,
    Query(params): Query<CompareQuery>,
) -> Result<Json<CompareResponse>, ApiError> {
    let existing = repositories::submissions::find_by_student_question(
        state.db(),
        &params.student_id,
        &params.question_id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to look up submission"))?;

    Ok(Json(CompareResponse {
        exists: existing.is_some(),
        submission: existing.map(SubmissionResponse::from),
    }))
}

async fn custom_submission(
    State(state): State<AppState>,
    Query(params): Query<CustomQuery>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let submission = repositories::submissions::find_custom(
        state.db(),
        SubmissionKey {
            course_id: &params.course_id,
            assignment_id: &params.assignment_id,
            question_id: &params.question_id,
            student_id: &params.student_id,
        },
        &params.language_name,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to look up submission"))?
    .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;

    Ok(Json(submission.into()))
}

async fn list_submissions(
    State(state): State<AppState>,
    Query(params): Query<AssignmentScopeQuery>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let submissions = repositories::submissions::list_for_assignment(
        state.db(),
        &params.course_id,
        &params.assignment_id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    Ok(Json(submissions.into_iter().map(SubmissionResponse::from).collect()))
}

async fn resolve_question(
    state: &AppState,
    assignment_id: &str,
    course_id: &str,
    question_id: &str,
) -> Result<AssignmentQuestion, ApiError> {
    let assignment = repositories::assignments::find_by_id(state.db(), assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load assignment"))?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;

    if assignment.course_id != course_id {
        return Err(ApiError::BadRequest(
            "Assignment does not belong to the given course".to_string(),
        ));
    }

    assignment
        .questions
        .0
        .into_iter()
        .find(|question| question.question_id == question_id)
        .ok_or_else(|| ApiError::NotFound("Question not found in assignment".to_string()))
}

/// Runs the question's test cases and renders the "passed/total" summary.
/// A question without test cases grades to "0/0" without touching the judge.
async fn grade_answer(
    state: &AppState,
    question: &AssignmentQuestion,
    language_id: i64,
    answer: &str,
) -> Result<String, ApiError> {
    if question.test_cases.is_empty() {
        return Ok(test_cases::summarize(0, 0));
    }

    let started = std::time::Instant::now();
    let judged = state.judge().run_cases(language_id, answer, &question.test_cases).await?;
    metrics::counter!("judge_submissions_total").increment(1);
    metrics::histogram!("submission_grading_duration_seconds")
        .record(started.elapsed().as_secs_f64());

    let passed = question
        .test_cases
        .iter()
        .zip(judged.iter())
        .filter(|(case, judged)| {
            test_cases::case_passes(&case.expected_output, &judged.observed_output)
        })
        .count();

    Ok(test_cases::summarize(passed, question.test_cases.len()))
}

/// Queues the durable plagiarism check. Failures are logged and swallowed:
/// a graded submission is never lost to plagiarism plumbing.
async fn enqueue_plagiarism_check(state: &AppState, submission: &Submission) {
    let result = repositories::plagiarism_checks::enqueue(
        state.db(),
        repositories::plagiarism_checks::EnqueueCheck {
            id: &Uuid::new_v4().to_string(),
            submission_id: &submission.id,
            course_id: &submission.course_id,
            assignment_id: &submission.assignment_id,
            question_id: &submission.question_id,
            language_name: &submission.language_name,
            student_id: &submission.student_id,
            now: primitive_now_utc(),
        },
    )
    .await;

    match result {
        Ok(()) => {
            metrics::counter!("plagiarism_checks_total", "event" => "enqueued").increment(1);
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                submission_id = %submission.id,
                "Failed to enqueue plagiarism check"
            );
        }
    }
}
