//! Shared error types for the services crate.

use thiserror::Error;

use proctor_core::{DrillError, SessionError};

/// Errors emitted by the exam backend collaborators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamApiError {
    #[error("user authentication required")]
    Unauthenticated,
    #[error("exam backend request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("malformed exam payload: {0}")]
    Malformed(String),
    #[error("test {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors reported by the host's fullscreen capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EnvironmentError {
    #[error("fullscreen is not supported by this host")]
    Unsupported,
    #[error("fullscreen request rejected: {0}")]
    Rejected(String),
}

/// Errors emitted by the exam session driver.
///
/// Submission failures are not errors here; they surface as a retryable
/// `Notice::SubmissionFailed`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamSessionError {
    #[error("exam data unavailable: {0}")]
    DataUnavailable(#[source] ExamApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Errors emitted by `TypingDrillService`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DrillServiceError {
    #[error("drill duration must be between 1 and 5 minutes, got {0}")]
    InvalidDuration(u32),
    #[error(transparent)]
    Drill(#[from] DrillError),
}
