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
use crate::repositories;
use crate::repositories::theory_submissions::CreateTheorySubmission;
use crate::schemas::submission::{
    AssignmentScopeQuery, TheoryLookupQuery, TheorySubmissionCreate, TheorySubmissionResponse,
    TheorySubmissionUpdate,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/theory-submission", post(create_theory_submission).get(get_theory_submission))
        .route("/theory-submission/update", patch(update_theory_submission))
        .route("/theory-submissions", get(list_theory_submissions))
}

async fn create_theory_submission(
    State(state): State<AppState>,
    Json(payload): Json<TheorySubmissionCreate>,
) -> Result<(StatusCode, Json<TheorySubmissionResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let submission = repositories::theory_submissions::create(
        state.db(),
        CreateTheorySubmission {
            id: &Uuid::new_v4().to_string(),
            student_id: &payload.student_id,
            student_name: &payload.student_name,
            assignment_id: &payload.assignment_id,
            course_id: &payload.course_id,
            comment: payload.comment.as_deref(),
            submitted_files: payload.submitted_files,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        if repositories::is_unique_violation(&e) {
            ApiError::Conflict("Theory submission already exists for this assignment".to_string())
        } else {
            ApiError::internal(e, "Failed to create theory submission")
        }
    })?;

    Ok((StatusCode::CREATED, Json(submission.into())))
}

/// Replaces the comment and file set. Previously attached objects are
/// removed from storage first so the bucket does not accumulate orphans.
async fn update_theory_submission(
    State(state): State<AppState>,
    Json(payload): Json<TheorySubmissionUpdate>,
) -> Result<Json<TheorySubmissionResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let existing = repositories::theory_submissions::find_by_student_assignment(
        state.db(),
        &payload.student_id,
        &payload.assignment_id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to load theory submission"))?
    .ok_or_else(|| ApiError::NotFound("Theory submission not found".to_string()))?;

    if let Some(storage) = state.storage() {
        let old_ids: Vec<String> =
            existing.submitted_files.0.iter().map(|file| file.public_id.clone()).collect();
        if !old_ids.is_empty() {
            if let Err(err) = storage.delete_objects(&old_ids).await {
                tracing::warn!(
                    error = %err,
                    submission_id = %existing.id,
                    "Failed to delete replaced theory files"
                );
            }
        }
    }

    let submission = repositories::theory_submissions::replace_content(
        state.db(),
        &payload.student_id,
        &payload.assignment_id,
        payload.comment.as_deref(),
        payload.submitted_files,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update theory submission"))?
    .ok_or_else(|| ApiError::NotFound("Theory submission not found".to_string()))?;

    Ok(Json(submission.into()))
}

async fn get_theory_submission(
    State(state): State<AppState>,
    Query(params): Query<TheoryLookupQuery>,
) -> Result<Json<TheorySubmissionResponse>, ApiError> {
    let submission = repositories::theory_submissions::find_by_student_assignment(
        state.db(),
        &params.student_id,
        &params.assignment_id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to load theory submission"))?
    .ok_or_else(|| ApiError::NotFound("Theory submission not found".to_string()))?;

    Ok(Json(submission.into()))
}

async fn list_theory_submissions(
    State(state): State<AppState>,
    Query(params): Query<AssignmentScopeQuery>,
) -> Result<Json<Vec<TheorySubmissionResponse>>, ApiError> {
    let submissions = repositories::theory_submissions::list_for_assignment(
        state.db(),
        &params.course_id,
        &params.assignment_id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list theory submissions"))?;

    Ok(Json(submissions.into_iter().map(TheorySubmissionResponse::from).collect()))
}
