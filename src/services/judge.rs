use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;

use crate::core::config::Settings;
use crate::db::models::TestCaseSpec;

const STATUS_IN_QUEUE: i64 = 1;
const STATUS_PROCESSING: i64 = 2;

#[derive(Debug, Error)]
pub(crate) enum JudgeError {
    #[error("judge submit failed: {0}")]
    Submit(String),
    #[error("judge request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("judge returned malformed payload: {0}")]
    Malformed(String),
    #[error("judge polling timed out for token {token} after {attempts} attempts")]
    Timeout { token: String, attempts: u32 },
}

#[derive(Debug, Clone)]
pub(crate) struct JudgedCase {
    pub(crate) observed_output: String,
}

/// Client for the external code-execution service. Submissions hand back a
/// token; the result is fetched by polling that token at a fixed interval
/// until the status leaves the queued/processing states.
#[derive(Debug, Clone)]
pub(crate) struct JudgeService {
    client: Client,
    base_url: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl JudgeService {
    pub(crate) fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(settings.judge().timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.judge().base_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_secs(settings.judge().poll_interval_seconds),
            max_poll_attempts: settings.judge().max_poll_attempts,
        })
    }

    /// Runs every test case for one question. Cases are submitted
    /// sequentially so a submit failure aborts the remaining dispatches;
    /// the poll loops then run concurrently and all of them are awaited
    /// before any result is assembled.
    pub(crate) async fn run_cases(
        &self,
        language_id: i64,
        source_code: &str,
        cases: &[TestCaseSpec],
    ) -> Result<Vec<JudgedCase>, JudgeError> {
        let mut tokens = Vec::with_capacity(cases.len());
        for case in cases {
            let token = self.submit_case(language_id, source_code, case).await?;
            tokens.push(token);
        }

        let mut polls = tokio::task::JoinSet::new();
        for (index, token) in tokens.into_iter().enumerate() {
            let judge = self.clone();
            polls.spawn(async move { (index, judge.poll_case(&token).await) });
        }

        let mut results: Vec<Option<JudgedCase>> = vec![None; cases.len()];
        while let Some(joined) = polls.join_next().await {
            let (index, result) = joined
                .map_err(|err| JudgeError::Malformed(format!("poll task aborted: {err}")))?;
            results[index] = Some(result?);
        }

        Ok(results.into_iter().flatten().collect())
    }

    async fn submit_case(
        &self,
        language_id: i64,
        source_code: &str,
        case: &TestCaseSpec,
    ) -> Result<String, JudgeError> {
        let endpoint = format!("{}/submissions/", self.base_url);
        let body = json!({
            "language_id": language_id,
            "source_code": source_code,
            "stdin": case.input_case,
            "expected_output": case.expected_output,
        });

        let response = self.client.post(&endpoint).json(&body).send().await?;
        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|err| JudgeError::Malformed(format!("submit response not JSON: {err}")))?;

        if !status.is_success() {
            return Err(JudgeError::Submit(format!(
                "status {status}: {}",
                extract_error_message(&payload)
            )));
        }

        payload
            .get("token")
            .and_then(Value::as_str)
            .map(|token| token.to_string())
            .ok_or_else(|| JudgeError::Malformed("submit response missing token".to_string()))
    }

    async fn poll_case(&self, token: &str) -> Result<JudgedCase, JudgeError> {
        let endpoint = format!("{}/submissions/{}", self.base_url, token);

        for attempt in 0..self.max_poll_attempts {
            let response = self.client.get(&endpoint).send().await?;
            let status = response.status();
            let payload: Value = response
                .json()
                .await
                .map_err(|err| JudgeError::Malformed(format!("poll response not JSON: {err}")))?;

            if !status.is_success() {
                return Err(JudgeError::Malformed(format!(
                    "poll failed (status {status}): {}",
                    extract_error_message(&payload)
                )));
            }

            metrics::counter!("judge_poll_attempts_total").increment(1);

            let status_id = payload
                .get("status")
                .and_then(|status| status.get("id"))
                .and_then(Value::as_i64)
                .ok_or_else(|| JudgeError::Malformed("poll response missing status.id".to_string()))?;

            if status_id != STATUS_IN_QUEUE && status_id != STATUS_PROCESSING {
                return Ok(JudgedCase { observed_output: observed_output(&payload) });
            }

            if attempt + 1 >= self.max_poll_attempts {
                break;
            }

            tokio::time::sleep(self.poll_interval).await;
        }

        Err(JudgeError::Timeout { token: token.to_string(), attempts: self.max_poll_attempts })
    }
}

/// First non-empty of stdout, compile output, stderr. A compile or runtime
/// error is not a judge fault: its diagnostic becomes the observed output
/// and simply fails the comparison against the expected output.
pub(crate) fn observed_output(payload: &Value) -> String {
    for field in ["stdout", "compile_output", "stderr"] {
        if let Some(text) = payload.get(field).and_then(Value::as_str) {
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }

    "Pending...".to_string()
}

fn extract_error_message(payload: &Value) -> String {
    payload
        .get("error")
        .and_then(Value::as_str)
        .or_else(|| payload.get("message").and_then(Value::as_str))
        .unwrap_or("unknown_error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::observed_output;
    use serde_json::json;

    #[test]
    fn observed_output_prefers_stdout() {
        let payload = json!({
            "stdout": "42\n",
            "compile_output": "warning: unused variable",
            "stderr": "noise"
        });
        assert_eq!(observed_output(&payload), "42\n");
    }

    #[test]
    fn observed_output_falls_back_to_compile_output() {
        let payload = json!({
            "stdout": null,
            "compile_output": "error: expected ';'",
            "stderr": null
        });
        assert_eq!(observed_output(&payload), "error: expected ';'");
    }

    #[test]
    fn observed_output_falls_back_to_stderr() {
        let payload = json!({
            "stdout": "",
            "compile_output": "",
            "stderr": "segmentation fault"
        });
        assert_eq!(observed_output(&payload), "segmentation fault");
    }

    #[test]
    fn observed_output_defaults_to_pending() {
        let payload = json!({"stdout": null});
        assert_eq!(observed_output(&payload), "Pending...");
    }
}
