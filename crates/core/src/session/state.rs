use serde::Serialize;

use crate::model::{AnswerMap, SubmissionReason, SubmissionRequest, SubmissionResult, TestPaper};
use crate::status::{StatusCounts, StatusTracker};
use crate::violation::ViolationEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SessionPhase {
    Instructions,
    InProgress,
    Submitting,
    Submitted,
}

impl SessionPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::Submitted
    }
}

/// A non-fatal violation the user has to acknowledge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ViolationWarning {
    pub event: ViolationEvent,
    pub count: u32,
    pub warnings_left: u32,
}

/// Side effect requested by the controller. The host executes these in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Enter fullscreen at the start of the attempt. A refusal is reported
    /// back through `fullscreen_denied`.
    RequestFullscreen,
    /// Re-enter fullscreen after an acknowledged exit. A refusal changes
    /// nothing; further exits still count as violations.
    ResumeFullscreen,
    ExitFullscreen,
    StartClock { total_secs: u32 },
    StopClock,
    ActivateMonitor,
    DeactivateMonitor,
    ShowWarning(ViolationWarning),
    ConfirmSubmission(StatusCounts),
    Submit(SubmissionRequest),
    ShowResult(SubmissionResult),
    SubmissionFailed {
        reason: SubmissionReason,
        attempts: u32,
        message: String,
    },
}

/// Mutable state of one attempt. Only the controller writes to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) phase: SessionPhase,
    pub(crate) current: usize,
    pub(crate) answers: AnswerMap,
    pub(crate) statuses: StatusTracker,
    pub(crate) remaining_secs: u32,
    pub(crate) violations: u32,
}

impl SessionState {
    pub(crate) fn new(paper: &TestPaper) -> Self {
        Self {
            phase: SessionPhase::Instructions,
            current: 0,
            answers: AnswerMap::new(),
            statuses: StatusTracker::new(paper.questions().iter().map(|q| q.id())),
            remaining_secs: 0,
            violations: 0,
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn statuses(&self) -> &StatusTracker {
        &self.statuses
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn violations(&self) -> u32 {
        self.violations
    }
}
