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
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::db::models::{QuestionOption, TestQuestion};
use crate::db::types::ResponseType;
use crate::repositories;
use crate::repositories::tests::{CreateTest, UpdateTest};
use crate::schemas::test::{TestCreate, TestDetailResponse, TestQuestionCreate, TestUpdate};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/test", post(create_test))
        .route("/test/:id", get(get_test).patch(update_test).delete(delete_test))
        .route("/tests/course/:course_id", get(list_tests_for_course))
        .route("/tests/student/:course_id", get(list_tests_for_student))
}

async fn create_test(
    State(state): State<AppState>,
    Json(payload): Json<TestCreate>,
) -> Result<(StatusCode, Json<TestDetailResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let questions = build_questions(payload.questions);

    let test = repositories::tests::create(
        state.db(),
        CreateTest {
            id: &Uuid::new_v4().to_string(),
            course_id: &payload.course_id,
            name: &payload.name,
            test_type: payload.test_type,
            description: payload.description.as_deref(),
            scheduled_at: payload.scheduled_at.map(to_primitive_utc),
            duration_minutes: payload.duration_minutes,
            visible_to_students: payload.visible_to_students,
            files: payload.files,
            questions,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        if repositories::is_unique_violation(&e) {
            ApiError::Conflict("Test with this name already exists".to_string())
        } else {
            ApiError::internal(e, "Failed to create test")
        }
    })?;

    Ok((StatusCode::CREATED, Json(test.into())))
}

async fn update_test(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<TestUpdate>,
) -> Result<Json<TestDetailResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let test = repositories::tests::update(
        state.db(),
        &id,
        UpdateTest {
            name: payload.name.as_deref(),
            description: payload.description.as_deref(),
            scheduled_at: payload.scheduled_at.map(to_primitive_utc),
            duration_minutes: payload.duration_minutes,
            visible_to_students: payload.visible_to_students,
            files: payload.files,
            questions: payload.questions.map(build_questions),
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update test"))?
    .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))?;

    Ok(Json(test.into()))
}

async fn get_test(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TestDetailResponse>, ApiError> {
    let test = repositories::tests::find_by_id(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load test"))?
        .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))?;

    Ok(Json(test.into()))
}

async fn list_tests_for_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<TestDetailResponse>>, ApiError> {
    let tests = repositories::tests::list_by_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list tests"))?;

    Ok(Json(tests.into_iter().map(TestDetailResponse::from).collect()))
}

async fn list_tests_for_student(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<TestDetailResponse>>, ApiError> {
    let tests = repositories::tests::list_visible_by_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list tests"))?;

    Ok(Json(tests.into_iter().map(TestDetailResponse::from).collect()))
}

/// Deleting a test removes its submissions (FK cascade) and any attached
/// files in storage.
async fn delete_test(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let test = repositories::tests::find_by_id(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load test"))?
        .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))?;

    if let Some(storage) = state.storage() {
        let public_ids: Vec<String> =
            test.files.0.iter().map(|file| file.public_id.clone()).collect();
        if !public_ids.is_empty() {
            if let Err(err) = storage.delete_objects(&public_ids).await {
                tracing::warn!(error = %err, test_id = %id, "Failed to delete test files");
            }
        }
    }

    repositories::tests::delete_by_id(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete test"))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Derives each question's response type from its options: no options is a
/// subjective question, more than one correct option means multiple choice.
/// The derived type is frozen into the stored question.
fn build_questions(questions: Vec<TestQuestionCreate>) -> Vec<TestQuestion> {
    questions
        .into_iter()
        .enumerate()
        .map(|(index, question)| {
            let options: Vec<QuestionOption> = question
                .options
                .into_iter()
                .map(|option| QuestionOption { value: option.value, is_correct: option.is_correct })
                .collect();

            let correct = options.iter().filter(|option| option.is_correct).count();
            let response_type = if options.is_empty() {
                ResponseType::Subjective
            } else if correct > 1 {
                ResponseType::Multiple
            } else {
                ResponseType::Single
            };

            TestQuestion {
                question_num: index as i32 + 1,
                question_info: question.question_info,
                marks: question.marks,
                response_type,
                options,
            }
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
    async fn response_types_are_derived_from_options() {
        let ctx = test_support::setup_test_context().await;

        let payload = json!({
            "course_id": "cs101",
            "name": "Midterm",
            "test_type": "test",
            "questions": [
                {"question_info": "Essay question", "marks": 10, "options": []},
                {"question_info": "Pick one", "marks": 2, "options": [
                    {"value": "a", "is_correct": true},
                    {"value": "b", "is_correct": false}
                ]},
                {"question_info": "Pick all that apply", "marks": 3, "options": [
                    {"value": "x", "is_correct": true},
                    {"value": "y", "is_correct": true},
                    {"value": "z", "is_correct": false}
                ]}
            ]
        });

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/tracker/test",
                Some(payload),
            ))
            .await
            .expect("create test");
        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::CREATED, "response: {body}");
        assert_eq!(body["questions"][0]["response_type"], "subjective");
        assert_eq!(body["questions"][1]["response_type"], "single");
        assert_eq!(body["questions"][2]["response_type"], "multiple");
        assert_eq!(body["questions"][2]["question_num"], 3);
    }

    #[tokio::test]
    async fn student_listing_hides_invisible_tests() {
        let ctx = test_support::setup_test_context().await;

        for (name, visible) in [("Published quiz", true), ("Draft quiz", false)] {
            let payload = json!({
                "course_id": "cs101",
                "name": name,
                "test_type": "quiz",
                "visible_to_students": visible
            });
            let response = ctx
                .app
                .clone()
                .oneshot(test_support::json_request(
                    Method::POST,
                    "/api/v1/tracker/test",
                    Some(payload),
                ))
                .await
                .expect("create test");
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/tracker/tests/student/cs101",
                None,
            ))
            .await
            .expect("student list");
        let body = test_support::read_json(response).await;
        let listed = body.as_array().expect("array");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["name"], "Published quiz");

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/tracker/tests/course/cs101",
                None,
            ))
            .await
            .expect("course list");
        let body = test_support::read_json(response).await;
        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn delete_cascades_test_submissions() {
        let ctx = test_support::setup_test_context().await;

        let payload = json!({
            "course_id": "cs101",
            "name": "Short quiz",
            "test_type": "quiz",
            "questions": [
                {"question_info": "Pick one", "marks": 1, "options": [
                    {"value": "a", "is_correct": true}
                ]}
            ]
        });
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/tracker/test",
                Some(payload),
            ))
            .await
            .expect("create test");
        let created = test_support::read_json(response).await;
        let test_id = created["id"].as_str().expect("id").to_string();

        let submission = json!({
            "student_id": "s-1",
            "student_name": "Alice",
            "test_id": test_id,
            "course_id": "cs101",
            "answers": [{"question_num": 1, "answer": "a"}]
        });
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/tracker/test-submission",
                Some(submission),
            ))
            .await
            .expect("create submission");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::DELETE,
                &format!("/api/v1/tracker/test/{test_id}"),
                None,
            ))
            .await
            .expect("delete test");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let remaining = repositories::test_submissions::list_by_test(ctx.state.db(), &test_id)
            .await
            .expect("list");
        assert!(remaining.is_empty());
    }
}
