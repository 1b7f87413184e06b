use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{StoredFileRef, Submission, TheorySubmission};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubmissionCreate {
    #[serde(alias = "studentID")]
    #[validate(length(min = 1, message = "student_id must not be empty"))]
    pub(crate) student_id: String,
    #[serde(alias = "studentName")]
    #[validate(length(min = 1, message = "student_name must not be empty"))]
    pub(crate) student_name: String,
    #[serde(alias = "assignmentID")]
    #[validate(length(min = 1, message = "assignment_id must not be empty"))]
    pub(crate) assignment_id: String,
    #[serde(alias = "courseID")]
    #[validate(length(min = 1, message = "course_id must not be empty"))]
    pub(crate) course_id: String,
    #[serde(alias = "questionID")]
    #[validate(length(min = 1, message = "question_id must not be empty"))]
    pub(crate) question_id: String,
    #[serde(alias = "languageName")]
    #[validate(length(min = 1, message = "language_name must not be empty"))]
    pub(crate) language_name: String,
    #[serde(alias = "languageId")]
    pub(crate) language_id: i64,
    #[validate(length(min = 1, message = "answer must not be empty"))]
    pub(crate) answer: String,
}

/// Same shape as a create: an update re-runs the test cases against the
/// new answer, so the full submission context travels with it.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubmissionUpdate {
    #[serde(alias = "studentID")]
    #[validate(length(min = 1, message = "student_id must not be empty"))]
    pub(crate) student_id: String,
    #[serde(alias = "assignmentID")]
    #[validate(length(min = 1, message = "assignment_id must not be empty"))]
    pub(crate) assignment_id: String,
    #[serde(alias = "courseID")]
    #[validate(length(min = 1, message = "course_id must not be empty"))]
    pub(crate) course_id: String,
    #[serde(alias = "questionID")]
    #[validate(length(min = 1, message = "question_id must not be empty"))]
    pub(crate) question_id: String,
    #[serde(alias = "languageName")]
    #[validate(length(min = 1, message = "language_name must not be empty"))]
    pub(crate) language_name: String,
    #[serde(alias = "languageId")]
    pub(crate) language_id: i64,
    #[validate(length(min = 1, message = "answer must not be empty"))]
    pub(crate) answer: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompareQuery {
    #[serde(alias = "studentID")]
    pub(crate) student_id: String,
    #[serde(alias = "questionID")]
    pub(crate) question_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CustomQuery {
    #[serde(alias = "courseID")]
    pub(crate) course_id: String,
    #[serde(alias = "assignmentID")]
    pub(crate) assignment_id: String,
    #[serde(alias = "questionID")]
    pub(crate) question_id: String,
    #[serde(alias = "languageName")]
    pub(crate) language_name: String,
    #[serde(alias = "studentID")]
    pub(crate) student_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignmentScopeQuery {
    #[serde(alias = "courseID")]
    pub(crate) course_id: String,
    #[serde(alias = "assignmentID")]
    pub(crate) assignment_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResponse {
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
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl From<Submission> for SubmissionResponse {
    fn from(value: Submission) -> Self {
        Self {
            id: value.id,
            student_id: value.student_id,
            student_name: value.student_name,
            assignment_id: value.assignment_id,
            course_id: value.course_id,
            question_id: value.question_id,
            question_num: value.question_num,
            question_info: value.question_info,
            language_name: value.language_name,
            test_case_summary: value.test_case_summary,
            answer: value.answer,
            created_at: format_primitive(value.created_at),
            updated_at: format_primitive(value.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CompareResponse {
    pub(crate) exists: bool,
    pub(crate) submission: Option<SubmissionResponse>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TheorySubmissionCreate {
    #[serde(alias = "studentID")]
    #[validate(length(min = 1, message = "student_id must not be empty"))]
    pub(crate) student_id: String,
    #[serde(alias = "studentName")]
    #[validate(length(min = 1, message = "student_name must not be empty"))]
    pub(crate) student_name: String,
    #[serde(alias = "assignmentID")]
    #[validate(length(min = 1, message = "assignment_id must not be empty"))]
    pub(crate) assignment_id: String,
    #[serde(alias = "courseID")]
    #[validate(length(min = 1, message = "course_id must not be empty"))]
    pub(crate) course_id: String,
    #[serde(default)]
    pub(crate) comment: Option<String>,
    #[serde(default, alias = "submittedFiles")]
    pub(crate) submitted_files: Vec<StoredFileRef>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TheorySubmissionUpdate {
    #[serde(alias = "studentID")]
    #[validate(length(min = 1, message = "student_id must not be empty"))]
    pub(crate) student_id: String,
    #[serde(alias = "assignmentID")]
    #[validate(length(min = 1, message = "assignment_id must not be empty"))]
    pub(crate) assignment_id: String,
    #[serde(default)]
    pub(crate) comment: Option<String>,
    #[serde(default, alias = "submittedFiles")]
    pub(crate) submitted_files: Vec<StoredFileRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TheoryLookupQuery {
    #[serde(alias = "studentID")]
    pub(crate) student_id: String,
    #[serde(alias = "assignmentID")]
    pub(crate) assignment_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TheorySubmissionResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) assignment_id: String,
    pub(crate) course_id: String,
    pub(crate) comment: Option<String>,
    pub(crate) submitted_files: Vec<StoredFileRef>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl From<TheorySubmission> for TheorySubmissionResponse {
    fn from(value: TheorySubmission) -> Self {
        Self {
            id: value.id,
            student_id: value.student_id,
            student_name: value.student_name,
            assignment_id: value.assignment_id,
            course_id: value.course_id,
            comment: value.comment,
            submitted_files: value.submitted_files.0,
            created_at: format_primitive(value.created_at),
            updated_at: format_primitive(value.updated_at),
        }
    }
}
