use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use proctor_core::model::{
    QuestionId, SubmissionRequest, SubmissionResult, TestId, TestPaper, UserId,
};

use crate::error::{EnvironmentError, ExamApiError};

use super::{Fullscreen, IdentityProvider, ScoringEndpoint, TestCatalog};

const DEFAULT_PASSING_SCORE: f64 = 60.0;

#[derive(Default)]
struct BackendState {
    tests: HashMap<TestId, TestPaper>,
    keys: HashMap<TestId, HashMap<QuestionId, String>>,
    users: HashMap<String, UserId>,
    submissions: Vec<SubmissionRequest>,
    failures_pending: u32,
}

/// In-process exam backend with an answer key, for tests and offline use.
#[derive(Clone)]
pub struct InMemoryExamBackend {
    state: Arc<Mutex<BackendState>>,
    passing_score: f64,
}

impl InMemoryExamBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BackendState::default())),
            passing_score: DEFAULT_PASSING_SCORE,
        }
    }

    #[must_use]
    pub fn with_passing_score(mut self, passing_score: f64) -> Self {
        self.passing_score = passing_score;
        self
    }

    /// Register a test with its correct option per question.
    ///
    /// # Errors
    ///
    /// Returns `ExamApiError::Malformed` if the backend state is poisoned.
    pub fn insert_test(
        &self,
        paper: TestPaper,
        key: impl IntoIterator<Item = (QuestionId, String)>,
    ) -> Result<(), ExamApiError> {
        let mut guard = self.lock()?;
        guard.keys.insert(paper.id().clone(), key.into_iter().collect());
        guard.tests.insert(paper.id().clone(), paper);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ExamApiError::Malformed` if the backend state is poisoned.
    pub fn insert_user(&self, credential: impl Into<String>, user: UserId) -> Result<(), ExamApiError> {
        self.lock()?.users.insert(credential.into(), user);
        Ok(())
    }

    /// Make the next `count` submissions fail with a server error.
    ///
    /// # Errors
    ///
    /// Returns `ExamApiError::Malformed` if the backend state is poisoned.
    pub fn fail_next_submissions(&self, count: u32) -> Result<(), ExamApiError> {
        self.lock()?.failures_pending = count;
        Ok(())
    }

    /// Every submission received, including failed ones.
    ///
    /// # Errors
    ///
    /// Returns `ExamApiError::Malformed` if the backend state is poisoned.
    pub fn submissions(&self) -> Result<Vec<SubmissionRequest>, ExamApiError> {
        Ok(self.lock()?.submissions.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BackendState>, ExamApiError> {
        self.state
            .lock()
            .map_err(|e| ExamApiError::Malformed(e.to_string()))
    }
}

impl Default for InMemoryExamBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TestCatalog for InMemoryExamBackend {
    async fn fetch_test(&self, id: &TestId) -> Result<TestPaper, ExamApiError> {
        self.lock()?
            .tests
            .get(id)
            .cloned()
            .ok_or_else(|| ExamApiError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for InMemoryExamBackend {
    async fn current_user(&self, credential: &str) -> Result<UserId, ExamApiError> {
        self.lock()?
            .users
            .get(credential)
            .cloned()
            .ok_or(ExamApiError::Unauthenticated)
    }
}

#[async_trait]
impl ScoringEndpoint for InMemoryExamBackend {
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionResult, ExamApiError> {
        let mut guard = self.lock()?;
        guard.submissions.push(request.clone());
        if guard.failures_pending > 0 {
            guard.failures_pending -= 1;
            return Err(ExamApiError::HttpStatus(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }

        let total = guard
            .tests
            .get(&request.test_id)
            .map(TestPaper::len)
            .ok_or_else(|| ExamApiError::NotFound(request.test_id.to_string()))?;
        let key = guard.keys.get(&request.test_id);
        let correct = request
            .answers
            .iter()
            .filter(|(question, value)| {
                key.and_then(|k| k.get(*question))
                    .is_some_and(|expected| expected == value)
            })
            .count();

        #[allow(clippy::cast_precision_loss)]
        let score = if total == 0 {
            0.0
        } else {
            ((correct as f64 / total as f64) * 10_000.0).round() / 100.0
        };

        Ok(SubmissionResult {
            test_id: Some(request.test_id.clone()),
            score,
            passed: score >= self.passing_score,
            total_questions: u32::try_from(total).unwrap_or(u32::MAX),
            correct_answers: u32::try_from(correct).unwrap_or(u32::MAX),
            attempted: u32::try_from(request.answers.len()).ok(),
            passing_score: Some(self.passing_score),
        })
    }
}

/// Fullscreen capability for hosts without one. Requests are always denied.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessFullscreen;

#[async_trait]
impl Fullscreen for HeadlessFullscreen {
    async fn request(&self) -> Result<(), EnvironmentError> {
        Err(EnvironmentError::Unsupported)
    }

    async fn exit(&self) -> Result<(), EnvironmentError> {
        Ok(())
    }
}
