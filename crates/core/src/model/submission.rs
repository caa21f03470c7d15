use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{AnswerMap, TestId, UserId};

/// What caused a session to be submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionReason {
    UserConfirmed,
    TimerExpired,
    ViolationThreshold,
    NavigatedAway,
}

impl fmt::Display for SubmissionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubmissionReason::UserConfirmed => "user_confirmed",
            SubmissionReason::TimerExpired => "timer_expired",
            SubmissionReason::ViolationThreshold => "violation_threshold",
            SubmissionReason::NavigatedAway => "navigated_away",
        };
        f.write_str(label)
    }
}

/// Payload posted to the scoring endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub test_id: TestId,
    pub user_id: UserId,
    pub answers: AnswerMap,
    #[serde(skip)]
    pub reason: SubmissionReason,
}

/// Scoring outcome returned once per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    #[serde(default)]
    pub test_id: Option<TestId>,
    pub score: f64,
    pub passed: bool,
    pub total_questions: u32,
    pub correct_answers: u32,
    #[serde(default)]
    pub attempted: Option<u32>,
    #[serde(default)]
    pub passing_score: Option<f64>,
}

impl SubmissionResult {
    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.total_questions.saturating_sub(self.correct_answers)
    }
}
