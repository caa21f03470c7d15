use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use proctor_core::{
    Effect, EnvSignal, SessionController, SessionPhase, SignalDisposition, ViolationMonitor,
};

use crate::backend::{Fullscreen, ScoringEndpoint};
use crate::error::ExamSessionError;

use super::{Notice, SessionEvent, TickerClock};

/// A live exam attempt: the controller plus the clock, monitor and
/// collaborators that carry out its effects.
///
/// All input, whether from the user, the clock or the monitor, is applied on
/// the caller's task one event at a time.
pub struct ExamSession {
    controller: SessionController,
    clock: TickerClock,
    monitor: ViolationMonitor,
    fullscreen: Arc<dyn Fullscreen>,
    scoring: Arc<dyn ScoringEndpoint>,
    events_tx: UnboundedSender<SessionEvent>,
    events_rx: UnboundedReceiver<SessionEvent>,
}

impl ExamSession {
    #[must_use]
    pub fn new(
        controller: SessionController,
        fullscreen: Arc<dyn Fullscreen>,
        scoring: Arc<dyn ScoringEndpoint>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            clock: TickerClock::new(),
            monitor: ViolationMonitor::new(),
            fullscreen,
            scoring,
            events_tx,
            events_rx,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: TickerClock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.controller.phase()
    }

    #[must_use]
    pub fn is_clock_running(&self) -> bool {
        self.clock.is_running()
    }

    #[must_use]
    pub fn is_monitor_active(&self) -> bool {
        self.monitor.is_active()
    }

    /// Report a raw environment signal. Violations are queued for the event loop.
    pub fn observe(&self, signal: &EnvSignal) -> SignalDisposition {
        self.monitor.observe(signal)
    }

    //
    // ─── USER OPERATIONS ───────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `ExamSessionError::Session` if the session was already started.
    pub async fn begin(&mut self) -> Result<Vec<Notice>, ExamSessionError> {
        let effects = self.controller.begin()?;
        self.apply(effects).await
    }

    /// # Errors
    ///
    /// Returns `ExamSessionError::Session` when input is not accepted.
    pub async fn next(&mut self) -> Result<Vec<Notice>, ExamSessionError> {
        let effects = self.controller.next()?;
        self.apply(effects).await
    }

    /// # Errors
    ///
    /// Returns `ExamSessionError::Session` when input is not accepted.
    pub async fn previous(&mut self) -> Result<Vec<Notice>, ExamSessionError> {
        let effects = self.controller.previous()?;
        self.apply(effects).await
    }

    /// # Errors
    ///
    /// Returns `ExamSessionError::Session` for an out-of-range index or when
    /// input is not accepted.
    pub async fn jump_to(&mut self, index: usize) -> Result<Vec<Notice>, ExamSessionError> {
        let effects = self.controller.jump_to(index)?;
        self.apply(effects).await
    }

    /// # Errors
    ///
    /// Returns `ExamSessionError::Session` for an unknown option or when input
    /// is not accepted.
    pub async fn select(&mut self, option: &str) -> Result<Vec<Notice>, ExamSessionError> {
        let effects = self.controller.select(option)?;
        self.apply(effects).await
    }

    /// # Errors
    ///
    /// Returns `ExamSessionError::Session` when input is not accepted.
    pub async fn clear_response(&mut self) -> Result<Vec<Notice>, ExamSessionError> {
        let effects = self.controller.clear_response()?;
        self.apply(effects).await
    }

    /// # Errors
    ///
    /// Returns `ExamSessionError::Session` when input is not accepted.
    pub async fn mark_for_review(&mut self) -> Result<Vec<Notice>, ExamSessionError> {
        let effects = self.controller.mark_for_review()?;
        self.apply(effects).await
    }

    /// # Errors
    ///
    /// Returns `ExamSessionError::Session` when input is not accepted.
    pub async fn toggle_review_mark(&mut self) -> Result<Vec<Notice>, ExamSessionError> {
        let effects = self.controller.toggle_review_mark()?;
        self.apply(effects).await
    }

    /// # Errors
    ///
    /// Returns `ExamSessionError::Session` when input is not accepted.
    pub async fn request_submit(&mut self) -> Result<Vec<Notice>, ExamSessionError> {
        let effects = self.controller.request_submit()?;
        self.apply(effects).await
    }

    /// # Errors
    ///
    /// Returns `ExamSessionError::Session` when input is not accepted.
    pub async fn confirm_submit(&mut self) -> Result<Vec<Notice>, ExamSessionError> {
        let effects = self.controller.confirm_submit()?;
        self.apply(effects).await
    }

    /// # Errors
    ///
    /// Returns `ExamSessionError::Session` when no warning is pending.
    pub async fn acknowledge_warning(&mut self) -> Result<Vec<Notice>, ExamSessionError> {
        let effects = self.controller.acknowledge_warning()?;
        self.apply(effects).await
    }

    /// # Errors
    ///
    /// Returns `ExamSessionError::Session` if the last submission did not fail.
    pub async fn retry_submission(&mut self) -> Result<Vec<Notice>, ExamSessionError> {
        let effects = self.controller.retry_submission()?;
        self.apply(effects).await
    }

    /// # Errors
    ///
    /// Returns `ExamSessionError::Session` if the controller rejects a follow-up.
    pub async fn navigate_away(&mut self) -> Result<Vec<Notice>, ExamSessionError> {
        let effects = self.controller.navigate_away();
        self.apply(effects).await
    }

    //
    // ─── EVENT LOOP ────────────────────────────────────────────────────────────
    //

    /// Wait for the next clock or monitor event and apply it.
    ///
    /// Returns immediately outside `InProgress`, where no source is left to
    /// produce an event.
    ///
    /// # Errors
    ///
    /// Returns `ExamSessionError::Session` if the controller rejects a follow-up.
    pub async fn process_next_event(&mut self) -> Result<Vec<Notice>, ExamSessionError> {
        if self.controller.phase() != SessionPhase::InProgress {
            return self.process_pending_events().await;
        }
        match self.events_rx.recv().await {
            Some(event) => self.handle(event).await,
            None => Ok(Vec::new()),
        }
    }

    /// Apply every event already queued, without waiting.
    ///
    /// # Errors
    ///
    /// Returns `ExamSessionError::Session` if the controller rejects a follow-up.
    pub async fn process_pending_events(&mut self) -> Result<Vec<Notice>, ExamSessionError> {
        let mut notices = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            notices.extend(self.handle(event).await?);
        }
        Ok(notices)
    }

    /// Drive events until the session leaves `InProgress`.
    ///
    /// Returns as soon as a submission settles (success or failure). Warnings
    /// raised along the way are included in the returned notices.
    ///
    /// # Errors
    ///
    /// Returns `ExamSessionError::Session` if the controller rejects a follow-up.
    pub async fn run_until_settled(&mut self) -> Result<Vec<Notice>, ExamSessionError> {
        let mut notices = Vec::new();
        while self.controller.phase() == SessionPhase::InProgress {
            notices.extend(self.process_next_event().await?);
        }
        Ok(notices)
    }

    async fn handle(&mut self, event: SessionEvent) -> Result<Vec<Notice>, ExamSessionError> {
        let effects = match event {
            SessionEvent::Clock { generation, event } => {
                if generation != self.clock.generation() {
                    tracing::debug!(?event, generation, "stale clock event dropped");
                    return Ok(Vec::new());
                }
                self.controller.on_clock(event)
            }
            SessionEvent::Violation(violation) => self.controller.on_violation(violation),
        };
        self.apply(effects).await
    }

    async fn apply(&mut self, effects: Vec<Effect>) -> Result<Vec<Notice>, ExamSessionError> {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut notices = Vec::new();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::RequestFullscreen => {
                    if let Err(err) = self.fullscreen.request().await {
                        tracing::warn!(error = %err, "fullscreen unavailable");
                        self.controller.fullscreen_denied();
                    }
                }
                Effect::ResumeFullscreen => {
                    if let Err(err) = self.fullscreen.request().await {
                        tracing::warn!(error = %err, "fullscreen re-entry refused");
                    }
                }
                Effect::ExitFullscreen => {
                    if let Err(err) = self.fullscreen.exit().await {
                        tracing::debug!(error = %err, "fullscreen exit failed");
                    }
                }
                Effect::StartClock { total_secs } => {
                    self.clock.start(total_secs, self.events_tx.clone());
                }
                Effect::StopClock => self.clock.stop(),
                Effect::ActivateMonitor => {
                    let sink = self.events_tx.clone();
                    self.monitor.activate(Box::new(move |violation| {
                        let _ = sink.send(SessionEvent::Violation(violation));
                    }));
                }
                Effect::DeactivateMonitor => self.monitor.deactivate(),
                Effect::Submit(request) => {
                    let follow_up = match self.scoring.submit(&request).await {
                        Ok(result) => self.controller.submission_succeeded(result)?,
                        Err(err) => self.controller.submission_failed(&err.to_string())?,
                    };
                    queue.extend(follow_up);
                }
                Effect::ShowWarning(warning) => notices.push(Notice::Warning(warning)),
                Effect::ConfirmSubmission(counts) => {
                    notices.push(Notice::ConfirmSubmission(counts));
                }
                Effect::ShowResult(result) => notices.push(Notice::Submitted(result)),
                Effect::SubmissionFailed {
                    reason,
                    attempts,
                    message,
                } => notices.push(Notice::SubmissionFailed {
                    reason,
                    attempts,
                    message,
                }),
            }
        }
        Ok(notices)
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("controller", &self.controller)
            .field("clock", &self.clock)
            .field("monitor", &self.monitor)
            .finish_non_exhaustive()
    }
}
