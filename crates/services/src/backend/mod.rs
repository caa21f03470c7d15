//! Contracts for the exam backend and the host environment.

mod http;
mod memory;

use async_trait::async_trait;

use proctor_core::model::{SubmissionRequest, SubmissionResult, TestId, TestPaper, UserId};

use crate::error::{EnvironmentError, ExamApiError};

pub use http::HttpExamApi;
pub use memory::{HeadlessFullscreen, InMemoryExamBackend};

/// Source of test content.
#[async_trait]
pub trait TestCatalog: Send + Sync {
    /// Fetch a validated test by id.
    ///
    /// # Errors
    ///
    /// Returns `ExamApiError` if the test is missing, unreachable or malformed.
    async fn fetch_test(&self, id: &TestId) -> Result<TestPaper, ExamApiError>;
}

/// Resolves a bearer credential to a user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `ExamApiError::Unauthenticated` for an unknown credential.
    async fn current_user(&self, credential: &str) -> Result<UserId, ExamApiError>;
}

/// Scores a submitted answer set.
#[async_trait]
pub trait ScoringEndpoint: Send + Sync {
    /// # Errors
    ///
    /// Returns `ExamApiError` if the submission could not be scored.
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionResult, ExamApiError>;
}

/// Host fullscreen capability.
#[async_trait]
pub trait Fullscreen: Send + Sync {
    /// # Errors
    ///
    /// Returns `EnvironmentError` when the host refuses fullscreen.
    async fn request(&self) -> Result<(), EnvironmentError>;

    /// # Errors
    ///
    /// Returns `EnvironmentError` when the host cannot leave fullscreen.
    async fn exit(&self) -> Result<(), EnvironmentError>;
}
