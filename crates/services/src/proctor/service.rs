use std::sync::Arc;

use proctor_core::model::TestId;
use proctor_core::{ProctorPolicy, SessionController};

use crate::backend::{Fullscreen, HttpExamApi, IdentityProvider, ScoringEndpoint, TestCatalog};
use crate::config::{ExamApiConfig, SessionContext};
use crate::error::{ExamApiError, ExamSessionError};

use super::ExamSession;

/// Builds exam sessions from the backend collaborators.
#[derive(Clone)]
pub struct ExamSessionService {
    catalog: Arc<dyn TestCatalog>,
    identity: Arc<dyn IdentityProvider>,
    scoring: Arc<dyn ScoringEndpoint>,
    fullscreen: Arc<dyn Fullscreen>,
    context: SessionContext,
    policy: ProctorPolicy,
}

impl ExamSessionService {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn TestCatalog>,
        identity: Arc<dyn IdentityProvider>,
        scoring: Arc<dyn ScoringEndpoint>,
        fullscreen: Arc<dyn Fullscreen>,
        context: SessionContext,
    ) -> Self {
        Self {
            catalog,
            identity,
            scoring,
            fullscreen,
            context,
            policy: ProctorPolicy::default(),
        }
    }

    /// Wire every backend collaborator to one REST client.
    ///
    /// # Errors
    ///
    /// Returns `ExamApiError` if the HTTP client cannot be built.
    pub fn over_http(
        config: ExamApiConfig,
        fullscreen: Arc<dyn Fullscreen>,
        context: SessionContext,
    ) -> Result<Self, ExamApiError> {
        let api = Arc::new(HttpExamApi::new(config)?);
        Ok(Self::new(
            api.clone(),
            api.clone(),
            api,
            fullscreen,
            context,
        ))
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ProctorPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> &ProctorPolicy {
        &self.policy
    }

    /// Fetch the test and the current user, then build a session on the
    /// instructions screen.
    ///
    /// # Errors
    ///
    /// Returns `ExamSessionError::DataUnavailable` if either fetch fails or no
    /// credential is available. No session is built in that case.
    pub async fn load(&self, test_id: &TestId) -> Result<ExamSession, ExamSessionError> {
        let credential = self
            .context
            .credential()
            .ok_or(ExamSessionError::DataUnavailable(ExamApiError::Unauthenticated))?;

        let (paper, user_id) = tokio::try_join!(
            self.catalog.fetch_test(test_id),
            self.identity.current_user(credential),
        )
        .map_err(|err| {
            tracing::warn!(test_id = %test_id, error = %err, "exam data unavailable");
            ExamSessionError::DataUnavailable(err)
        })?;

        tracing::info!(test_id = %test_id, user_id = %user_id, "exam loaded");
        let controller = SessionController::new(Arc::new(paper), user_id, self.policy);
        Ok(ExamSession::new(
            controller,
            Arc::clone(&self.fullscreen),
            Arc::clone(&self.scoring),
        ))
    }
}
