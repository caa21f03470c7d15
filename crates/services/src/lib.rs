#![forbid(unsafe_code)]
//! Async services around the proctoring core: backend clients, the exam
//! session driver and the typing drill.

pub mod backend;
pub mod config;
pub mod drill_service;
pub mod error;
pub mod proctor;

pub use proctor_core::Clock;

pub use backend::{
    Fullscreen, HeadlessFullscreen, HttpExamApi, IdentityProvider, InMemoryExamBackend,
    ScoringEndpoint, TestCatalog,
};
pub use config::{ExamApiConfig, SessionContext};
pub use drill_service::{Difficulty, DrillSettings, Language, TypingDrillService};
pub use error::{DrillServiceError, EnvironmentError, ExamApiError, ExamSessionError};
pub use proctor::{ExamSession, ExamSessionService, Notice, SessionEvent, TickerClock};
