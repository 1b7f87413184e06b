use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::test_submissions::CreateTestSubmission;
use crate::schemas::test::{TestSubmissionCreate, TestSubmissionOverride, TestSubmissionResponse};
use crate::services::scoring;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/test-submission", post(create_test_submission))
        .route(
            "/test-submission/:id",
            get(get_test_submission).patch(override_test_submission).delete(delete_test_submission),
        )
        .route("/test-submissions", get(list_test_submissions))
        .route("/test-submissions/test/:test_id", get(list_by_test))
        .route("/test-submissions/student/:student_id", get(list_by_student))
        .route("/test-submissions/course/:course_id", get(list_by_course))
}

/// Scores the answer sheet synchronously against the test's question set
/// and stores the graded responses with their total.
async fn create_test_submission(
    State(state): State<AppState>,
    Json(payload): Json<TestSubmissionCreate>,
) -> Result<(StatusCode, Json<TestSubmissionResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let test = repositories::tests::find_by_id(state.db(), &payload.test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load test"))?
        .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))?;

    if test.course_id != payload.course_id {
        return Err(ApiError::BadRequest("Test does not belong to the given course".to_string()));
    }

    let answers: Vec<(i32, serde_json::Value)> =
        payload.answers.into_iter().map(|answer| (answer.question_num, answer.answer)).collect();
    let (responses, total_marks) = scoring::score_responses(&test.questions.0, &answers);

    let submission = repositories::test_submissions::create(
        state.db(),
        CreateTestSubmission {
            id: &Uuid::new_v4().to_string(),
            student_id: &payload.student_id,
            student_name: &payload.student_name,
            test_id: &payload.test_id,
            course_id: &payload.course_id,
            responses,
            total_marks,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create test submission"))?;

    Ok((StatusCode::CREATED, Json(submission.into())))
}

/// Instructor override: the supplied per-question marks replace the stored
/// ones verbatim and the total is recomputed as their sum.
async fn override_test_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<TestSubmissionOverride>,
) -> Result<Json<TestSubmissionResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let total_marks: i32 = payload.responses.iter().map(|response| response.marks_awarded).sum();

    let submission = repositories::test_submissions::replace_responses(
        state.db(),
        &id,
        payload.responses,
        total_marks,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to override test submission"))?
    .ok_or_else(|| ApiError::NotFound("Test submission not found".to_string()))?;

    Ok(Json(submission.into()))
}

async fn get_test_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TestSubmissionResponse>, ApiError> {
    let submission = repositories::test_submissions::find_by_id(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load test submission"))?
        .ok_or_else(|| ApiError::NotFound("Test submission not found".to_string()))?;

    Ok(Json(submission.into()))
}

async fn delete_test_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::test_submissions::delete_by_id(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete test submission"))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Test submission not found".to_string()))
    }
}

async fn list_test_submissions(
    State(state): State<AppState>,
) -> Result<Json<Vec<TestSubmissionResponse>>, ApiError> {
    let submissions = repositories::test_submissions::list_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list test submissions"))?;

    Ok(Json(submissions.into_iter().map(TestSubmissionResponse::from).collect()))
}

async fn list_by_test(
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<Json<Vec<TestSubmissionResponse>>, ApiError> {
    let submissions = repositories::test_submissions::list_by_test(state.db(), &test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list test submissions"))?;

    Ok(Json(submissions.into_iter().map(TestSubmissionResponse::from).collect()))
}

async fn list_by_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<TestSubmissionResponse>>, ApiError> {
    let submissions = repositories::test_submissions::list_by_student(state.db(), &student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list test submissions"))?;

    Ok(Json(submissions.into_iter().map(TestSubmissionResponse::from).collect()))
}

async fn list_by_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<TestSubmissionResponse>>, ApiError> {
    let submissions = repositories::test_submissions::list_by_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list test submissions"))?;

    Ok(Json(submissions.into_iter().map(TestSubmissionResponse::from).collect()))
}
