use thiserror::Error;

use crate::model::{QuestionId, TestPaperError};
use crate::session::SessionPhase;
use crate::typing::DrillPhase;

/// Errors emitted by the session controller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Paper(#[from] TestPaperError),

    #[error("session is {actual:?}, operation requires {expected:?}")]
    WrongPhase {
        expected: SessionPhase,
        actual: SessionPhase,
    },

    #[error("question index {index} is out of range for {len} questions")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("option {option:?} is not offered by question {question}")]
    UnknownOption { question: QuestionId, option: String },

    #[error("a violation warning must be acknowledged first")]
    AwaitingAcknowledgement,

    #[error("no violation warning is pending")]
    NoPendingWarning,

    #[error("no failed submission to retry")]
    NothingToRetry,
}

/// Errors emitted by the typing drill.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DrillError {
    #[error("drill passage is empty")]
    EmptyPassage,

    #[error("drill is {actual:?}")]
    WrongPhase { actual: DrillPhase },
}
