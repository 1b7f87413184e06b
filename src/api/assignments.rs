use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::db::models::AssignmentQuestion;
use crate::repositories;
use crate::repositories::assignments::{CreateAssignment, UpdateAssignment};
use crate::schemas::assignment::{
    AssignmentCreate, AssignmentResponse, AssignmentUpdate, QuestionCreate,
};

#[derive(Debug, Deserialize)]
pub(crate) struct CourseQuery {
    #[serde(alias = "courseID")]
    course_id: String,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/assignments", post(create_assignment).get(list_assignments))
        .route("/assignments/visible", get(list_visible_assignments))
        .route(
            "/assignments/:id",
            get(get_assignment).patch(update_assignment).delete(delete_assignment),
        )
}

async fn create_assignment(
    State(state): State<AppState>,
    Json(payload): Json<AssignmentCreate>,
) -> Result<(StatusCode, Json<AssignmentResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let questions = build_questions(payload.questions);

    let assignment = repositories::assignments::create(
        state.db(),
        CreateAssignment {
            id: &Uuid::new_v4().to_string(),
            course_id: &payload.course_id,
            name: &payload.name,
            description: payload.description.as_deref(),
            due_date: payload.due_date.map(to_primitive_utc),
            visible_to_students: payload.visible_to_students,
            instructor_files: payload.instructor_files,
            questions,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        if repositories::is_unique_violation(&e) {
            ApiError::Conflict("Assignment with this name already exists".to_string())
        } else {
            ApiError::internal(e, "Failed to create assignment")
        }
    })?;

    Ok((StatusCode::CREATED, Json(assignment.into())))
}

async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AssignmentUpdate>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let assignment = repositories::assignments::update(
        state.db(),
        &id,
        UpdateAssignment {
            name: payload.name.as_deref(),
            description: payload.description.as_deref(),
            due_date: payload.due_date.map(to_primitive_utc),
            visible_to_students: payload.visible_to_students,
            instructor_files: payload.instructor_files,
            questions: payload.questions.map(build_questions),
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update assignment"))?
    .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;

    Ok(Json(assignment.into()))
}

async fn get_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let assignment = repositories::assignments::find_by_id(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load assignment"))?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;

    Ok(Json(assignment.into()))
}

async fn list_assignments(
    State(state): State<AppState>,
    Query(params): Query<CourseQuery>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    let assignments = repositories::assignments::list_by_course(state.db(), &params.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list assignments"))?;

    Ok(Json(assignments.into_iter().map(AssignmentResponse::from).collect()))
}

async fn list_visible_assignments(
    State(state): State<AppState>,
    Query(params): Query<CourseQuery>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    let assignments =
        repositories::assignments::list_visible_by_course(state.db(), &params.course_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list assignments"))?;

    Ok(Json(assignments.into_iter().map(AssignmentResponse::from).collect()))
}

/// Deleting an assignment takes its whole trail with it: coding submissions
/// (via FK cascade), theory submissions, plagiarism records and queued
/// checks, plus instructor files held in storage.
async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let assignment = repositories::assignments::find_by_id(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load assignment"))?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;

    let mut public_ids: Vec<String> =
        assignment.instructor_files.0.iter().map(|file| file.public_id.clone()).collect();

    let theory = repositories::theory_submissions::list_by_assignment(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load theory submissions"))?;
    for submission in &theory {
        public_ids.extend(submission.submitted_files.0.iter().map(|file| file.public_id.clone()));
    }

    if let Some(storage) = state.storage() {
        if !public_ids.is_empty() {
            if let Err(err) = storage.delete_objects(&public_ids).await {
                tracing::warn!(
                    error = %err,
                    assignment_id = %id,
                    "Failed to delete assignment files from storage"
                );
            }
        }
    }

    repositories::plagiarism::delete_by_assignment(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete plagiarism records"))?;
    repositories::plagiarism_checks::delete_by_assignment(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete plagiarism checks"))?;
    repositories::theory_submissions::delete_by_assignment(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete theory submissions"))?;

    repositories::assignments::delete_by_id(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete assignment"))?;

    Ok(StatusCode::NO_CONTENT)
}

fn build_questions(questions: Vec<QuestionCreate>) -> Vec<AssignmentQuestion> {
    questions
        .into_iter()
        .enumerate()
        .map(|(index, question)| AssignmentQuestion {
            question_id: Uuid::new_v4().to_string(),
            question_num: index as i32 + 1,
            question_info: question.question_info,
            test_cases: question.test_cases,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::repositories;
    use crate::test_support;

    #[tokio::test]
    async fn create_assigns_question_ids_and_numbers() {
        let ctx = test_support::setup_test_context().await;

        let payload = json!({
            "course_id": "cs101",
            "name": "Strings homework",
            "questions": [
                {"question_info": "Reverse a string", "test_cases": [
                    {"input_case": "abc", "expected_output": "cba"}
                ]},
                {"question_info": "Count vowels"}
            ]
        });

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/tracker/assignments",
                Some(payload),
            ))
            .await
            .expect("create");
        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::CREATED, "response: {body}");
        assert_eq!(body["questions"][0]["question_num"], 1);
        assert_eq!(body["questions"][1]["question_num"], 2);
        assert!(!body["questions"][0]["question_id"].as_str().expect("id").is_empty());
    }

    #[tokio::test]
    async fn duplicate_name_in_course_conflicts() {
        let ctx = test_support::setup_test_context().await;

        let payload = json!({"course_id": "cs101", "name": "Homework 1"});
        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let response = ctx
                .app
                .clone()
                .oneshot(test_support::json_request(
                    Method::POST,
                    "/api/v1/tracker/assignments",
                    Some(payload.clone()),
                ))
                .await
                .expect("create");
            assert_eq!(response.status(), expected);
        }
    }

    #[tokio::test]
    async fn visible_listing_filters_hidden_assignments() {
        let ctx = test_support::setup_test_context().await;

        for (name, visible) in [("Visible one", true), ("Hidden one", false)] {
            let payload =
                json!({"course_id": "cs101", "name": name, "visible_to_students": visible});
            let response = ctx
                .app
                .clone()
                .oneshot(test_support::json_request(
                    Method::POST,
                    "/api/v1/tracker/assignments",
                    Some(payload),
                ))
                .await
                .expect("create");
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/tracker/assignments/visible?course_id=cs101",
                None,
            ))
            .await
            .expect("list visible");
        let body = test_support::read_json(response).await;
        let listed = body.as_array().expect("array");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["name"], "Visible one");
    }

    #[tokio::test]
    async fn delete_cascades_submissions_and_plagiarism() {
        let ctx = test_support::setup_test_context().await;
        let assignment =
            test_support::insert_assignment(ctx.state.db(), "cs101", "Homework 1", &[]).await;
        let question_id = assignment.questions.0[0].question_id.clone();

        let submission = test_support::insert_submission(
            ctx.state.db(),
            "s-1",
            "Alice",
            &assignment.id,
            "cs101",
            &question_id,
            "python",
        )
        .await;

        let report = json!({
            "course_id": "cs101",
            "assignment_id": assignment.id,
            "question_id": question_id,
            "language_name": "python",
            "student_1_id": "s-1",
            "student_1_name": "Alice",
            "student_2_id": "s-2",
            "student_2_name": "Bob",
            "similarity": 90.0
        });
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/tracker/plagiarism",
                Some(report),
            ))
            .await
            .expect("report");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::DELETE,
                &format!("/api/v1/tracker/assignments/{}", assignment.id),
                None,
            ))
            .await
            .expect("delete");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let gone = repositories::submissions::find_by_id(ctx.state.db(), &submission.id)
            .await
            .expect("query");
        assert!(gone.is_none());

        let records =
            repositories::plagiarism::list_for_assignment(ctx.state.db(), "cs101", &assignment.id)
                .await
                .expect("records");
        assert!(records.is_empty());
    }
}
