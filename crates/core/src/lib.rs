#![forbid(unsafe_code)]
//! Domain core for proctored assessments: question status tracking, the
//! countdown kernel, violation classification, the submission gate, the
//! session state machine and the typing drill.

pub mod error;
pub mod gate;
pub mod model;
pub mod session;
pub mod status;
pub mod time;
pub mod typing;
pub mod violation;

pub use error::{DrillError, SessionError};
pub use gate::SubmissionGate;
pub use session::{Effect, ProctorPolicy, SessionController, SessionPhase, SessionState};
pub use status::{QuestionStatus, StatusCounts, StatusTracker};
pub use time::{Clock, ClockEvent, Countdown};
pub use violation::{EnvSignal, SignalDisposition, ViolationEvent, ViolationMonitor};
