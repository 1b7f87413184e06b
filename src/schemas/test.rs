use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{StoredFileRef, Test, TestQuestion, TestResponse, TestSubmission};
use crate::db::types::TestType;
use crate::schemas::deserialize_option_offset_datetime_flexible;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct OptionCreate {
    #[validate(length(min = 1, message = "option value must not be empty"))]
    pub(crate) value: String,
    #[serde(default, alias = "isCorrect")]
    pub(crate) is_correct: bool,
}

/// The response type is not part of the payload: it is derived from the
/// options when the test is created and frozen from then on.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TestQuestionCreate {
    #[serde(alias = "questionInfo")]
    #[validate(length(min = 1, message = "question_info must not be empty"))]
    pub(crate) question_info: String,
    #[validate(range(min = 0, message = "marks must be non-negative"))]
    pub(crate) marks: i32,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) options: Vec<OptionCreate>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TestCreate {
    #[serde(alias = "courseID")]
    #[validate(length(min = 1, message = "course_id must not be empty"))]
    pub(crate) course_id: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[serde(alias = "testType")]
    pub(crate) test_type: TestType,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(
        default,
        alias = "scheduledAt",
        deserialize_with = "deserialize_option_offset_datetime_flexible"
    )]
    pub(crate) scheduled_at: Option<OffsetDateTime>,
    #[serde(default, alias = "durationMinutes")]
    #[validate(range(min = 1, message = "duration_minutes must be positive"))]
    pub(crate) duration_minutes: Option<i32>,
    #[serde(default = "default_visible", alias = "visibleToStudents")]
    pub(crate) visible_to_students: bool,
    #[serde(default)]
    pub(crate) files: Vec<StoredFileRef>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) questions: Vec<TestQuestionCreate>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TestUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(
        default,
        alias = "scheduledAt",
        deserialize_with = "deserialize_option_offset_datetime_flexible"
    )]
    pub(crate) scheduled_at: Option<OffsetDateTime>,
    #[serde(default, alias = "durationMinutes")]
    #[validate(range(min = 1, message = "duration_minutes must be positive"))]
    pub(crate) duration_minutes: Option<i32>,
    #[serde(default, alias = "visibleToStudents")]
    pub(crate) visible_to_students: Option<bool>,
    #[serde(default)]
    pub(crate) files: Option<Vec<StoredFileRef>>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) questions: Option<Vec<TestQuestionCreate>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TestDetailResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) name: String,
    pub(crate) test_type: TestType,
    pub(crate) description: Option<String>,
    pub(crate) scheduled_at: Option<String>,
    pub(crate) duration_minutes: Option<i32>,
    pub(crate) visible_to_students: bool,
    pub(crate) files: Vec<StoredFileRef>,
    pub(crate) questions: Vec<TestQuestion>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl From<Test> for TestDetailResponse {
    fn from(value: Test) -> Self {
        Self {
            id: value.id,
            course_id: value.course_id,
            name: value.name,
            test_type: value.test_type,
            description: value.description,
            scheduled_at: value.scheduled_at.map(format_primitive),
            duration_minutes: value.duration_minutes,
            visible_to_students: value.visible_to_students,
            files: value.files.0,
            questions: value.questions.0,
            created_at: format_primitive(value.created_at),
            updated_at: format_primitive(value.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerCreate {
    #[serde(alias = "questionNum")]
    pub(crate) question_num: i32,
    pub(crate) answer: serde_json::Value,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TestSubmissionCreate {
    #[serde(alias = "studentID")]
    #[validate(length(min = 1, message = "student_id must not be empty"))]
    pub(crate) student_id: String,
    #[serde(alias = "studentName")]
    #[validate(length(min = 1, message = "student_name must not be empty"))]
    pub(crate) student_name: String,
    #[serde(alias = "testID")]
    #[validate(length(min = 1, message = "test_id must not be empty"))]
    pub(crate) test_id: String,
    #[serde(alias = "courseID")]
    #[validate(length(min = 1, message = "course_id must not be empty"))]
    pub(crate) course_id: String,
    #[serde(default)]
    pub(crate) answers: Vec<AnswerCreate>,
}

/// Instructor override. The supplied marks are trusted as-is; the total is
/// recomputed as their sum.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TestSubmissionOverride {
    #[validate(length(min = 1, message = "responses must not be empty"))]
    pub(crate) responses: Vec<TestResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TestSubmissionResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) test_id: String,
    pub(crate) course_id: String,
    pub(crate) responses: Vec<TestResponse>,
    pub(crate) total_marks: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl From<TestSubmission> for TestSubmissionResponse {
    fn from(value: TestSubmission) -> Self {
        Self {
            id: value.id,
            student_id: value.student_id,
            student_name: value.student_name,
            test_id: value.test_id,
            course_id: value.course_id,
            responses: value.responses.0,
            total_marks: value.total_marks,
            created_at: format_primitive(value.created_at),
            updated_at: format_primitive(value.updated_at),
        }
    }
}

fn default_visible() -> bool {
    true
}
