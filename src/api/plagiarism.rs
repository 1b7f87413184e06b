use axum::{
    extract::{Query, State},
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
use crate::repositories::plagiarism::UpsertPlagiarismRecord;
use crate::schemas::plagiarism::{
    PlagiarismListQuery, PlagiarismRecordResponse, PlagiarismReportCreate,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/plagiarism", post(report_plagiarism).get(list_plagiarism))
}

/// Callback endpoint for the detection service. Reports for a pair that was
/// already scored overwrite the stored similarity instead of duplicating.
async fn report_plagiarism(
    State(state): State<AppState>,
    Json(payload): Json<PlagiarismReportCreate>,
) -> Result<(StatusCode, Json<PlagiarismRecordResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let record = repositories::plagiarism::upsert(
        state.db(),
        UpsertPlagiarismRecord {
            id: &Uuid::new_v4().to_string(),
            course_id: &payload.course_id,
            assignment_id: &payload.assignment_id,
            question_id: &payload.question_id,
            language_name: &payload.language_name,
            student_1_id: &payload.student_1_id,
            student_1_name: &payload.student_1_name,
            student_2_id: &payload.student_2_id,
            student_2_name: &payload.student_2_name,
            similarity: payload.similarity,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to store plagiarism record"))?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

async fn list_plagiarism(
    State(state): State<AppState>,
    Query(params): Query<PlagiarismListQuery>,
) -> Result<Json<Vec<PlagiarismRecordResponse>>, ApiError> {
    let records = repositories::plagiarism::list_for_assignment(
        state.db(),
        &params.course_id,
        &params.assignment_id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list plagiarism records"))?;

    Ok(Json(records.into_iter().map(PlagiarismRecordResponse::from).collect()))
}
