use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use proctor_core::model::{
    Question, QuestionId, SubmissionRequest, SubmissionResult, TestId, TestPaper, UserId,
};

use crate::config::ExamApiConfig;
use crate::error::ExamApiError;

use super::{IdentityProvider, ScoringEndpoint, TestCatalog};

/// REST client for the exam backend.
#[derive(Clone)]
pub struct HttpExamApi {
    client: Client,
    config: ExamApiConfig,
}

impl HttpExamApi {
    /// # Errors
    ///
    /// Returns `ExamApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: ExamApiConfig) -> Result<Self, ExamApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// # Errors
    ///
    /// Returns `ExamApiError::Http` if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, ExamApiError> {
        Self::new(ExamApiConfig::from_env())
    }

    #[must_use]
    pub fn config(&self) -> &ExamApiConfig {
        &self.config
    }
}

fn check_status(response: Response) -> Result<Response, ExamApiError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ExamApiError::Unauthenticated),
        status => Err(ExamApiError::HttpStatus(status)),
    }
}

#[async_trait]
impl TestCatalog for HttpExamApi {
    async fn fetch_test(&self, id: &TestId) -> Result<TestPaper, ExamApiError> {
        let url = self.config.endpoint(&format!("api/test/{id}"));
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ExamApiError::NotFound(id.to_string()));
        }
        let payload: TestPayload = check_status(response)?.json().await?;
        payload.into_paper()
    }
}

#[async_trait]
impl IdentityProvider for HttpExamApi {
    async fn current_user(&self, credential: &str) -> Result<UserId, ExamApiError> {
        let url = self.config.endpoint("api/auth/me");
        let response = self.client.get(url).bearer_auth(credential).send().await?;
        let payload: MePayload = check_status(response)?.json().await?;
        Ok(UserId::new(payload.user.id))
    }
}

#[async_trait]
impl ScoringEndpoint for HttpExamApi {
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionResult, ExamApiError> {
        let url = self.config.endpoint("api/test/submit");
        tracing::info!(test_id = %request.test_id, reason = %request.reason, "posting submission");
        let response = self.client.post(url).json(request).send().await?;
        let mut result: SubmissionResult = check_status(response)?.json().await?;
        if result.attempted.is_none() {
            result.attempted = u32::try_from(request.answers.len()).ok();
        }
        Ok(result)
    }
}

//
// ─── WIRE PAYLOADS ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(crate) struct TestPayload {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default, alias = "name")]
    title: Option<String>,
    /// Whole-exam duration in minutes.
    #[serde(default)]
    duration: Option<u32>,
    #[serde(default)]
    questions: Vec<QuestionPayload>,
}

#[derive(Debug, Deserialize)]
struct QuestionPayload {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    question: Option<PromptPayload>,
    #[serde(default, rename = "questionText")]
    question_text: Option<String>,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default, rename = "timeLimit")]
    time_limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct PromptPayload {
    text: String,
}

#[derive(Debug, Deserialize)]
struct MePayload {
    user: UserPayload,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    #[serde(rename = "_id")]
    id: String,
}

impl TestPayload {
    pub(crate) fn into_paper(self) -> Result<TestPaper, ExamApiError> {
        let mut questions = Vec::with_capacity(self.questions.len());
        for payload in self.questions {
            let prompt = payload
                .question
                .map(|p| p.text)
                .or(payload.question_text)
                .ok_or_else(|| {
                    ExamApiError::Malformed(format!("question {} has no prompt", payload.id))
                })?;
            questions.push(Question::new(
                QuestionId::new(payload.id),
                prompt,
                payload.options,
                payload.time_limit,
            ));
        }

        let duration_secs = match self.duration {
            Some(minutes) => Some(minutes.checked_mul(60).ok_or_else(|| {
                ExamApiError::Malformed(format!("duration {minutes} minutes is out of range"))
            })?),
            None => None,
        };

        TestPaper::new(
            TestId::new(self.id),
            self.title.unwrap_or_default(),
            questions,
            duration_secs,
        )
        .map_err(|err| ExamApiError::Malformed(err.to_string()))
    }
}
