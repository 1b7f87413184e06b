use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "testtype", rename_all = "lowercase")]
pub(crate) enum TestType {
    Test,
    Quiz,
}

/// Answer shape of a test question, fixed at creation time and never
/// re-derived afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ResponseType {
    Single,
    Multiple,
    Subjective,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "plagiarismcheckstatus", rename_all = "lowercase")]
pub(crate) enum PlagiarismCheckStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}
