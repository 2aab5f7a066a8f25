use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;

/// Scores at or above this count as a passed quiz.
pub const PASSING_SCORE: f64 = 70.0;

/// Points awarded per correct answer.
pub const POINTS_PER_CORRECT_ANSWER: u32 = 10;

/// Caller-supplied data for one completed quiz attempt.
///
/// Ranges are taken as given. Only non-finite numbers are refused, since
/// JSON cannot hold them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmissionDraft {
    pub quiz_id: String,
    pub quiz_title: String,
    pub score: f64,
    pub correct_answers: u32,
    pub total_questions: u32,
    /// Seconds.
    pub time_spent: f64,
    pub answers: Value,
}

impl SubmissionDraft {
    #[must_use]
    pub fn new(quiz_id: impl Into<String>, quiz_title: impl Into<String>, score: f64) -> Self {
        Self {
            quiz_id: quiz_id.into(),
            quiz_title: quiz_title.into(),
            score,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_answers(mut self, correct_answers: u32, total_questions: u32) -> Self {
        self.correct_answers = correct_answers;
        self.total_questions = total_questions;
        self
    }

    #[must_use]
    pub fn with_time_spent(mut self, seconds: f64) -> Self {
        self.time_spent = seconds;
        self
    }

    #[must_use]
    pub fn with_answer_payload(mut self, answers: Value) -> Self {
        self.answers = answers;
        self
    }

    /// Reject NaN or infinite `score` / `time_spent`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::NonFinite` naming the first offending field.
    pub fn check_finite(&self) -> Result<(), ModelError> {
        for (field, value) in [("score", self.score), ("timeSpent", self.time_spent)] {
            if !value.is_finite() {
                return Err(ModelError::NonFinite { field });
            }
        }
        Ok(())
    }
}

/// One recorded quiz attempt as persisted in the submissions list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: i64,
    pub quiz_id: String,
    pub quiz_title: String,
    pub score: f64,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub time_spent: f64,
    #[serde(default)]
    pub answers: Value,
    pub timestamp: DateTime<Utc>,
    pub is_correct: bool,
}

impl Submission {
    /// Stamp a draft with its id and insertion time.
    #[must_use]
    pub fn from_draft(draft: SubmissionDraft, id: i64, timestamp: DateTime<Utc>) -> Self {
        let is_correct = draft.score >= PASSING_SCORE;
        Self {
            id,
            quiz_id: draft.quiz_id,
            quiz_title: draft.quiz_title,
            score: draft.score,
            correct_answers: draft.correct_answers,
            total_questions: draft.total_questions,
            time_spent: draft.time_spent,
            answers: draft.answers,
            timestamp,
            is_correct,
        }
    }

    /// Points this attempt contributes to the running total.
    #[must_use]
    pub fn points(&self) -> u32 {
        self.correct_answers
            .saturating_mul(POINTS_PER_CORRECT_ANSWER)
    }
}
