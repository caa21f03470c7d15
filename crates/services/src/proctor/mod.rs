mod clock;
mod service;
mod session;

use proctor_core::model::{SubmissionReason, SubmissionResult};
use proctor_core::session::ViolationWarning;
use proctor_core::{ClockEvent, StatusCounts, ViolationEvent};

pub use clock::TickerClock;
pub use service::ExamSessionService;
pub use session::ExamSession;

/// Asynchronous input to a running session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Clock { generation: u64, event: ClockEvent },
    Violation(ViolationEvent),
}

/// Something the user should see as a result of an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Warning(ViolationWarning),
    ConfirmSubmission(StatusCounts),
    Submitted(SubmissionResult),
    SubmissionFailed {
        reason: SubmissionReason,
        attempts: u32,
        message: String,
    },
}
