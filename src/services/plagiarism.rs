use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::config::Settings;
use crate::db::models::Submission;

/// Client for the external plagiarism-detection service. The service is
/// write-only from this side: results come back later through the
/// plagiarism upsert endpoint, so a call here carries no response payload
/// we depend on.
#[derive(Debug, Clone)]
pub(crate) struct PlagiarismService {
    client: Client,
    base_url: String,
    max_submit_retries: u32,
}

impl PlagiarismService {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(settings.plagiarism().timeout_seconds))
            .build()
            .context("Failed to build plagiarism HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.plagiarism().base_url.trim_end_matches('/').to_string(),
            max_submit_retries: settings.plagiarism().max_submit_retries,
        })
    }

    pub(crate) fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }

    /// Forwards a fresh submission together with the full comparison set in
    /// a single call, retrying transient failures with exponential backoff.
    pub(crate) async fn submit_for_check(
        &self,
        submission: &Submission,
        others: &[Submission],
    ) -> Result<()> {
        let endpoint = format!("{}/plagiarism/", self.base_url);
        let body = check_payload(submission, others);

        let mut last_error = None;

        for attempt in 0..=self.max_submit_retries {
            match self.client.post(&endpoint).json(&body).send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => {
                    let status = response.status();
                    let detail = response.text().await.unwrap_or_default();
                    last_error = Some(anyhow::anyhow!(
                        "plagiarism submit failed (status {status}): {detail}"
                    ));
                }
                Err(err) => {
                    last_error =
                        Some(anyhow::anyhow!(err).context("Failed to call plagiarism service"));
                }
            }

            if attempt < self.max_submit_retries {
                let backoff = Duration::from_secs(2_u64.pow(attempt));
                tokio::time::sleep(backoff).await;
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Unknown plagiarism submit error")))
    }
}

fn check_payload(submission: &Submission, others: &[Submission]) -> Value {
    json!({
        "studentID": submission.student_id,
        "studentName": submission.student_name,
        "courseID": submission.course_id,
        "assignmentID": submission.assignment_id,
        "questionID": submission.question_id,
        "languageName": submission.language_name,
        "answer": submission.answer,
        "otherSubmissions": others
            .iter()
            .map(|other| json!({
                "studentID": other.student_id,
                "studentName": other.student_name,
                "answer": other.answer,
            }))
            .collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::check_payload;
    use crate::core::time::primitive_now_utc;
    use crate::db::models::Submission;

    fn submission(student_id: &str, answer: &str) -> Submission {
        let now = primitive_now_utc();
        Submission {
            id: format!("sub-{student_id}"),
            student_id: student_id.to_string(),
            student_name: format!("Student {student_id}"),
            assignment_id: "assignment-1".to_string(),
            course_id: "course-1".to_string(),
            question_id: "question-1".to_string(),
            question_num: 1,
            question_info: "Reverse a string".to_string(),
            language_name: "python".to_string(),
            test_case_summary: "1/1".to_string(),
            answer: answer.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn payload_carries_submission_and_comparison_set() {
        let new = submission("alice", "print(s[::-1])");
        let others = vec![submission("bob", "print(reversed(s))")];

        let payload = check_payload(&new, &others);

        assert_eq!(payload["studentID"], "alice");
        assert_eq!(payload["languageName"], "python");
        assert_eq!(payload["otherSubmissions"].as_array().map(Vec::len), Some(1));
        assert_eq!(payload["otherSubmissions"][0]["studentID"], "bob");
    }
}
