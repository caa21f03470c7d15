use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{QuestionId, TestId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestPaperError {
    #[error("test has no questions")]
    NoQuestions,

    #[error("question {0} appears more than once")]
    DuplicateQuestion(QuestionId),

    #[error("question {0} has no options")]
    NoOptions(QuestionId),

    #[error("question {0} has an empty prompt")]
    EmptyPrompt(QuestionId),
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    time_limit_secs: Option<u32>,
}

impl Question {
    #[must_use]
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        time_limit_secs: Option<u32>,
    ) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            options,
            time_limit_secs,
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> Option<u32> {
        self.time_limit_secs
    }

    #[must_use]
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|option| option == value)
    }
}

/// An immutable, validated test as loaned to a session.
///
/// Construction rejects malformed data up front so a session never renders
/// a question it cannot score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPaper {
    id: TestId,
    title: String,
    questions: Vec<Question>,
    duration_secs: Option<u32>,
}

impl TestPaper {
    /// Validate and build a test paper.
    ///
    /// # Errors
    ///
    /// Returns `TestPaperError` when there are no questions, a question id is
    /// repeated, or a question has no prompt or no options.
    pub fn new(
        id: TestId,
        title: impl Into<String>,
        questions: Vec<Question>,
        duration_secs: Option<u32>,
    ) -> Result<Self, TestPaperError> {
        if questions.is_empty() {
            return Err(TestPaperError::NoQuestions);
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(TestPaperError::DuplicateQuestion(question.id().clone()));
            }
            if question.prompt().trim().is_empty() {
                return Err(TestPaperError::EmptyPrompt(question.id().clone()));
            }
            if question.options().is_empty() {
                return Err(TestPaperError::NoOptions(question.id().clone()));
            }
        }

        Ok(Self {
            id,
            title: title.into(),
            questions,
            duration_secs,
        })
    }

    #[must_use]
    pub fn id(&self) -> &TestId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn duration_secs(&self) -> Option<u32> {
        self.duration_secs
    }

    /// Whole-exam time budget in seconds.
    ///
    /// A fixed duration wins; otherwise per-question allotments are summed,
    /// using `default_question_secs` where a question carries none.
    #[must_use]
    pub fn time_budget_secs(&self, fixed_override: Option<u32>, default_question_secs: u32) -> u32 {
        if let Some(fixed) = fixed_override.or(self.duration_secs) {
            return fixed;
        }
        self.questions
            .iter()
            .map(|q| q.time_limit_secs().unwrap_or(default_question_secs))
            .fold(0_u32, u32::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, limit: Option<u32>) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Prompt {id}"),
            vec!["A".into(), "B".into()],
            limit,
        )
    }

    #[test]
    fn empty_test_is_rejected() {
        let err = TestPaper::new(TestId::new("t"), "T", Vec::new(), None).unwrap_err();
        assert_eq!(err, TestPaperError::NoQuestions);
    }

    #[test]
    fn duplicate_question_is_rejected() {
        let err = TestPaper::new(
            TestId::new("t"),
            "T",
            vec![question("q1", None), question("q1", None)],
            None,
        )
        .unwrap_err();
        assert_eq!(err, TestPaperError::DuplicateQuestion(QuestionId::new("q1")));
    }

    #[test]
    fn question_without_options_is_rejected() {
        let bare = Question::new(QuestionId::new("q1"), "Prompt", Vec::new(), None);
        let err = TestPaper::new(TestId::new("t"), "T", vec![bare], None).unwrap_err();
        assert_eq!(err, TestPaperError::NoOptions(QuestionId::new("q1")));
    }

    #[test]
    fn budget_sums_allotments_with_default() {
        let paper = TestPaper::new(
            TestId::new("t"),
            "T",
            vec![question("q1", Some(30)), question("q2", None)],
            None,
        )
        .unwrap();
        assert_eq!(paper.time_budget_secs(None, 60), 90);
    }

    #[test]
    fn fixed_duration_overrides_allotments() {
        let paper = TestPaper::new(
            TestId::new("t"),
            "T",
            vec![question("q1", Some(30))],
            Some(600),
        )
        .unwrap();
        assert_eq!(paper.time_budget_secs(None, 60), 600);
        assert_eq!(paper.time_budget_secs(Some(120), 60), 120);
    }
}
