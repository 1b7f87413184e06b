use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Assignment, AssignmentQuestion, StoredFileRef, TestCaseSpec};
use crate::schemas::deserialize_option_offset_datetime_flexible;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    #[serde(alias = "questionInfo")]
    #[validate(length(min = 1, message = "question_info must not be empty"))]
    pub(crate) question_info: String,
    #[serde(default, alias = "testCases")]
    pub(crate) test_cases: Vec<TestCaseSpec>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AssignmentCreate {
    #[serde(alias = "courseID")]
    #[validate(length(min = 1, message = "course_id must not be empty"))]
    pub(crate) course_id: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(
        default,
        alias = "dueDate",
        deserialize_with = "deserialize_option_offset_datetime_flexible"
    )]
    pub(crate) due_date: Option<OffsetDateTime>,
    #[serde(default = "default_visible", alias = "visibleToStudents")]
    pub(crate) visible_to_students: bool,
    #[serde(default, alias = "instructorFiles")]
    pub(crate) instructor_files: Vec<StoredFileRef>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) questions: Vec<QuestionCreate>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AssignmentUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(
        default,
        alias = "dueDate",
        deserialize_with = "deserialize_option_offset_datetime_flexible"
    )]
    pub(crate) due_date: Option<OffsetDateTime>,
    #[serde(default, alias = "visibleToStudents")]
    pub(crate) visible_to_students: Option<bool>,
    #[serde(default, alias = "instructorFiles")]
    pub(crate) instructor_files: Option<Vec<StoredFileRef>>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) questions: Option<Vec<QuestionCreate>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) due_date: Option<String>,
    pub(crate) visible_to_students: bool,
    pub(crate) instructor_files: Vec<StoredFileRef>,
    pub(crate) questions: Vec<AssignmentQuestion>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl From<Assignment> for AssignmentResponse {
    fn from(value: Assignment) -> Self {
        Self {
            id: value.id,
            course_id: value.course_id,
            name: value.name,
            description: value.description,
            due_date: value.due_date.map(format_primitive),
            visible_to_students: value.visible_to_students,
            instructor_files: value.instructor_files.0,
            questions: value.questions.0,
            created_at: format_primitive(value.created_at),
            updated_at: format_primitive(value.updated_at),
        }
    }
}

fn default_visible() -> bool {
    true
}
