use std::collections::HashSet;

use serde_json::Value;

use crate::db::models::{TestQuestion, TestResponse};
use crate::db::types::ResponseType;

/// Marks for a single answer against its question. All-or-nothing: a
/// `multiple` answer earns full marks only on exact set equality, and a
/// malformed answer of any shape earns zero.
pub(crate) fn compute_marks(question: &TestQuestion, answer: &Value) -> i32 {
    match question.response_type {
        ResponseType::Subjective => 0,
        ResponseType::Single => {
            let Some(answer) = answer.as_str() else {
                return 0;
            };
            let matched = question
                .options
                .iter()
                .any(|option| option.is_correct && option.value == answer);
            if matched {
                question.marks
            } else {
                0
            }
        }
        ResponseType::Multiple => {
            let Some(items) = answer.as_array() else {
                return 0;
            };
            let mut selected = HashSet::new();
            for item in items {
                let Some(value) = item.as_str() else {
                    return 0;
                };
                selected.insert(value);
            }
            let correct: HashSet<&str> = question
                .options
                .iter()
                .filter(|option| option.is_correct)
                .map(|option| option.value.as_str())
                .collect();
            if !correct.is_empty() && selected == correct {
                question.marks
            } else {
                0
            }
        }
    }
}

/// Grades a raw answer sheet against the question set. Answers to unknown
/// question numbers score zero but are still recorded.
pub(crate) fn score_responses(
    questions: &[TestQuestion],
    answers: &[(i32, Value)],
) -> (Vec<TestResponse>, i32) {
    let mut responses = Vec::with_capacity(answers.len());
    let mut total = 0;

    for (question_num, answer) in answers {
        let question = questions.iter().find(|q| q.question_num == *question_num);
        let (marks, response_type) = match question {
            Some(question) => (compute_marks(question, answer), question.response_type),
            None => (0, ResponseType::Subjective),
        };

        total += marks;
        responses.push(TestResponse {
            question_num: *question_num,
            response_type,
            answer: answer.clone(),
            marks_awarded: marks,
        });
    }

    (responses, total)
}
