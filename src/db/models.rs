use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use time::PrimitiveDateTime;

use crate::db::types::{PlagiarismCheckStatus, ResponseType, TestType};

/// Reference to an object kept in S3; `public_id` is the storage handle
/// clients send back when asking for deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredFileRef {
    pub(crate) public_id: String,
    pub(crate) file_name: String,
    pub(crate) url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TestCaseSpec {
    pub(crate) input_case: String,
    pub(crate) expected_output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AssignmentQuestion {
    pub(crate) question_id: String,
    pub(crate) question_num: i32,
    pub(crate) question_info: String,
    #[serde(default)]
    pub(crate) test_cases: Vec<TestCaseSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct QuestionOption {
    pub(crate) value: String,
    pub(crate) is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TestQuestion {
    pub(crate) question_num: i32,
    pub(crate) question_info: String,
    pub(crate) marks: i32,
    pub(crate) response_type: ResponseType,
    #[serde(default)]
    pub(crate) options: Vec<QuestionOption>,
}

/// One graded answer inside a test submission. `answer` is a string for
/// single/subjective questions and an array of strings for multiple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TestResponse {
    pub(crate) question_num: i32,
    pub(crate) response_type: ResponseType,
    pub(crate) answer: serde_json::Value,
    pub(crate) marks_awarded: i32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct Assignment {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) due_date: Option<PrimitiveDateTime>,
    pub(crate) visible_to_students: bool,
    pub(crate) instructor_files: Json<Vec<StoredFileRef>>,
    pub(crate) questions: Json<Vec<AssignmentQuestion>>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct Test {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) name: String,
    pub(crate) test_type: TestType,
    pub(crate) description: Option<String>,
    pub(crate) scheduled_at: Option<PrimitiveDateTime>,
    pub(crate) duration_minutes: Option<i32>,
    pub(crate) visible_to_students: bool,
    pub(crate) files: Json<Vec<StoredFileRef>>,
    pub(crate) questions: Json<Vec<TestQuestion>>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct Submission {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) assignment_id: String,
    pub(crate) course_id: String,
    pub(crate) question_id: String,
    pub(crate) question_num: i32,
    pub(crate) question_info: String,
    pub(crate) language_name: String,
    pub(crate) test_case_summary: String,
    pub(crate) answer: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct TheorySubmission {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) assignment_id: String,
    pub(crate) course_id: String,
    pub(crate) comment: Option<String>,
    pub(crate) submitted_files: Json<Vec<StoredFileRef>>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct TestSubmission {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) test_id: String,
    pub(crate) course_id: String,
    pub(crate) responses: Json<Vec<TestResponse>>,
    pub(crate) total_marks: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct PlagiarismRecord {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) assignment_id: String,
    pub(crate) question_id: String,
    pub(crate) language_name: String,
    pub(crate) student_1_id: String,
    pub(crate) student_1_name: String,
    pub(crate) student_2_id: String,
    pub(crate) student_2_name: String,
    pub(crate) similarity: f64,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct PlagiarismCheck {
    pub(crate) id: String,
    pub(crate) submission_id: String,
    pub(crate) course_id: String,
    pub(crate) assignment_id: String,
    pub(crate) question_id: String,
    pub(crate) language_name: String,
    pub(crate) student_id: String,
    pub(crate) status: PlagiarismCheckStatus,
    pub(crate) retry_count: i32,
    pub(crate) error: Option<String>,
    pub(crate) claimed_at: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}
