use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::PlagiarismRecord;

/// One pairwise similarity report from the detection service. Similarity
/// arrives as a percentage and is clamped to [0, 100] before storage.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct PlagiarismReportCreate {
    #[serde(alias = "courseID")]
    #[validate(length(min = 1, message = "course_id must not be empty"))]
    pub(crate) course_id: String,
    #[serde(alias = "assignmentID")]
    #[validate(length(min = 1, message = "assignment_id must not be empty"))]
    pub(crate) assignment_id: String,
    #[serde(alias = "questionID")]
    #[validate(length(min = 1, message = "question_id must not be empty"))]
    pub(crate) question_id: String,
    #[serde(alias = "languageName")]
    #[validate(length(min = 1, message = "language_name must not be empty"))]
    pub(crate) language_name: String,
    #[serde(alias = "student1ID")]
    #[validate(length(min = 1, message = "student_1_id must not be empty"))]
    pub(crate) student_1_id: String,
    #[serde(alias = "student1Name")]
    pub(crate) student_1_name: String,
    #[serde(alias = "student2ID")]
    #[validate(length(min = 1, message = "student_2_id must not be empty"))]
    pub(crate) student_2_id: String,
    #[serde(alias = "student2Name")]
    pub(crate) student_2_name: String,
    #[validate(range(min = 0.0, message = "similarity must be non-negative"))]
    pub(crate) similarity: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlagiarismListQuery {
    #[serde(alias = "courseID")]
    pub(crate) course_id: String,
    #[serde(alias = "assignmentID")]
    pub(crate) assignment_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PlagiarismRecordResponse {
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
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl From<PlagiarismRecord> for PlagiarismRecordResponse {
    fn from(value: PlagiarismRecord) -> Self {
        Self {
            id: value.id,
            course_id: value.course_id,
            assignment_id: value.assignment_id,
            question_id: value.question_id,
            language_name: value.language_name,
            student_1_id: value.student_1_id,
            student_1_name: value.student_1_name,
            student_2_id: value.student_2_id,
            student_2_name: value.student_2_name,
            similarity: value.similarity,
            created_at: format_primitive(value.created_at),
            updated_at: format_primitive(value.updated_at),
        }
    }
}
