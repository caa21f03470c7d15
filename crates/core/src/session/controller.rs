use std::fmt;
use std::sync::Arc;

use crate::error::SessionError;
use crate::gate::SubmissionGate;
use crate::model::{
    AnswerMap, Question, SubmissionReason, SubmissionRequest, SubmissionResult, TestPaper, UserId,
};
use crate::status::{QuestionStatus, StatusCounts, StatusTracker};
use crate::time::ClockEvent;
use crate::violation::ViolationEvent;

use super::policy::ProctorPolicy;
use super::state::{Effect, SessionPhase, SessionState, ViolationWarning};

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// State machine for one proctored attempt.
///
/// The controller performs no I/O. Every operation returns the effects the
/// host must carry out (start the clock, post the submission, ...). Events
/// that arrive once the session has left `InProgress` are ignored, so a late
/// tick or violation can never touch the answers.
pub struct SessionController {
    paper: Arc<TestPaper>,
    user_id: UserId,
    policy: ProctorPolicy,
    state: SessionState,
    gate: SubmissionGate,
    pending_warning: Option<ViolationWarning>,
    fullscreen_enforced: bool,
    result: Option<SubmissionResult>,
}

impl SessionController {
    #[must_use]
    pub fn new(paper: Arc<TestPaper>, user_id: UserId, policy: ProctorPolicy) -> Self {
        let state = SessionState::new(&paper);
        Self {
            paper,
            user_id,
            policy,
            state,
            gate: SubmissionGate::new(),
            pending_warning: None,
            fullscreen_enforced: policy.enforce_fullscreen,
            result: None,
        }
    }

    #[must_use]
    pub fn paper(&self) -> &TestPaper {
        &self.paper
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn policy(&self) -> &ProctorPolicy {
        &self.policy
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.state.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.paper.question(self.state.current)
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.state.answers
    }

    #[must_use]
    pub fn statuses(&self) -> &StatusTracker {
        &self.state.statuses
    }

    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        self.state.statuses.counts()
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.state.remaining_secs
    }

    #[must_use]
    pub fn violations(&self) -> u32 {
        self.state.violations
    }

    #[must_use]
    pub fn pending_warning(&self) -> Option<ViolationWarning> {
        self.pending_warning
    }

    #[must_use]
    pub fn fullscreen_enforced(&self) -> bool {
        self.fullscreen_enforced
    }

    #[must_use]
    pub fn submission_reason(&self) -> Option<SubmissionReason> {
        self.gate.reason()
    }

    #[must_use]
    pub fn submission_attempts(&self) -> u32 {
        self.gate.attempts()
    }

    #[must_use]
    pub fn result(&self) -> Option<&SubmissionResult> {
        self.result.as_ref()
    }

    //
    // ─── LIFECYCLE ─────────────────────────────────────────────────────────────
    //

    /// Leave the instructions screen and start the attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongPhase` unless the session is in `Instructions`.
    pub fn begin(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.expect_phase(SessionPhase::Instructions)?;

        let total_secs = self.paper.time_budget_secs(
            self.policy.exam_duration_secs,
            self.policy.default_question_secs,
        );
        self.state.remaining_secs = total_secs;
        self.state.phase = SessionPhase::InProgress;
        self.move_to(0);

        tracing::info!(
            test_id = %self.paper.id(),
            questions = self.paper.len(),
            total_secs,
            "session started"
        );

        let mut effects = Vec::with_capacity(3);
        if self.fullscreen_enforced {
            effects.push(Effect::RequestFullscreen);
        }
        effects.push(Effect::StartClock { total_secs });
        effects.push(Effect::ActivateMonitor);
        Ok(effects)
    }

    /// The host could not enter fullscreen. The attempt continues without
    /// fullscreen enforcement.
    pub fn fullscreen_denied(&mut self) {
        if self.fullscreen_enforced {
            tracing::warn!("fullscreen request denied; continuing without enforcement");
        }
        self.fullscreen_enforced = false;
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// Advance one question. On the last question this requests submission.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when input is not currently accepted.
    pub fn next(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.ensure_input()?;
        let next = self.state.current + 1;
        if next >= self.paper.len() {
            return self.request_submit();
        }
        self.move_to(next);
        Ok(Vec::new())
    }

    /// Step back one question, staying on the first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when input is not currently accepted.
    pub fn previous(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.ensure_input()?;
        let previous = self.state.current.saturating_sub(1);
        self.move_to(previous);
        Ok(Vec::new())
    }

    /// # Errors
    ///
    /// Returns `SessionError::IndexOutOfRange` for an index past the last question,
    /// or another `SessionError` when input is not currently accepted.
    pub fn jump_to(&mut self, index: usize) -> Result<Vec<Effect>, SessionError> {
        self.ensure_input()?;
        if index >= self.paper.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.paper.len(),
            });
        }
        self.move_to(index);
        Ok(Vec::new())
    }

    //
    // ─── ANSWERS ───────────────────────────────────────────────────────────────
    //

    /// Select an option on the current question, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownOption` if the question does not offer `option`.
    pub fn select(&mut self, option: &str) -> Result<Vec<Effect>, SessionError> {
        self.ensure_input()?;
        let question = self.current_question_owned()?;
        if !question.has_option(option) {
            return Err(SessionError::UnknownOption {
                question: question.id().clone(),
                option: option.to_string(),
            });
        }

        let id = question.id();
        let marked = self.status_of(&question).is_marked();
        self.state.answers.record(id.clone(), option);
        self.state.statuses.select(id, marked);
        Ok(Vec::new())
    }

    /// # Errors
    ///
    /// Returns `SessionError` when input is not currently accepted.
    pub fn clear_response(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.ensure_input()?;
        let question = self.current_question_owned()?;
        let marked = self.status_of(&question).is_marked();
        self.state.answers.remove(question.id());
        self.state.statuses.clear(question.id(), marked);
        Ok(Vec::new())
    }

    /// # Errors
    ///
    /// Returns `SessionError` when input is not currently accepted.
    pub fn mark_for_review(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.ensure_input()?;
        let question = self.current_question_owned()?;
        let answered = self.state.answers.contains(question.id());
        self.state.statuses.mark(question.id(), answered);
        Ok(Vec::new())
    }

    /// Flip the review mark on the current question. The answer is untouched.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when input is not currently accepted.
    pub fn toggle_review_mark(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.ensure_input()?;
        let question = self.current_question_owned()?;
        let answered = self.state.answers.contains(question.id());
        if self.status_of(&question).is_marked() {
            self.state.statuses.unmark(question.id(), answered);
        } else {
            self.state.statuses.mark(question.id(), answered);
        }
        Ok(Vec::new())
    }

    //
    // ─── SUBMISSION ────────────────────────────────────────────────────────────
    //

    /// Ask the user to confirm submission, showing the status tally.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when input is not currently accepted.
    pub fn request_submit(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.ensure_input()?;
        Ok(vec![Effect::ConfirmSubmission(self.counts())])
    }

    /// # Errors
    ///
    /// Returns `SessionError` when input is not currently accepted.
    pub fn confirm_submit(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.ensure_input()?;
        Ok(self.trigger(SubmissionReason::UserConfirmed))
    }

    /// The user is leaving the session screen. Submits what was answered.
    pub fn navigate_away(&mut self) -> Vec<Effect> {
        if self.state.phase != SessionPhase::InProgress {
            return Vec::new();
        }
        self.trigger(SubmissionReason::NavigatedAway)
    }

    /// # Errors
    ///
    /// Returns `SessionError::WrongPhase` unless a submission is in flight.
    pub fn submission_succeeded(
        &mut self,
        result: SubmissionResult,
    ) -> Result<Vec<Effect>, SessionError> {
        self.expect_phase(SessionPhase::Submitting)?;
        self.state.phase = SessionPhase::Submitted;
        tracing::info!(
            test_id = %self.paper.id(),
            score = result.score,
            passed = result.passed,
            "session submitted"
        );

        let mut effects = Vec::with_capacity(2);
        if self.fullscreen_enforced {
            effects.push(Effect::ExitFullscreen);
        }
        self.result = Some(result.clone());
        effects.push(Effect::ShowResult(result));
        Ok(effects)
    }

    /// Record a failed submission. The latch stays closed until the user retries.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongPhase` unless a submission is in flight.
    pub fn submission_failed(&mut self, message: &str) -> Result<Vec<Effect>, SessionError> {
        self.expect_phase(SessionPhase::Submitting)?;
        self.gate.record_failure();
        let reason = self
            .gate
            .reason()
            .unwrap_or(SubmissionReason::UserConfirmed);
        tracing::warn!(
            test_id = %self.paper.id(),
            attempts = self.gate.attempts(),
            %reason,
            error = message,
            "submission failed"
        );
        Ok(vec![Effect::SubmissionFailed {
            reason,
            attempts: self.gate.attempts(),
            message: message.to_string(),
        }])
    }

    /// Explicit user retry after a failed submission.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NothingToRetry` if the last attempt did not fail.
    pub fn retry_submission(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.expect_phase(SessionPhase::Submitting)?;
        if !self.gate.rearm() {
            return Err(SessionError::NothingToRetry);
        }
        let reason = self
            .gate
            .reason()
            .unwrap_or(SubmissionReason::UserConfirmed);
        Ok(self
            .gate
            .try_latch(reason)
            .map(|reason| vec![Effect::Submit(self.build_request(reason))])
            .unwrap_or_default())
    }

    //
    // ─── PROCTORING EVENTS ─────────────────────────────────────────────────────
    //

    pub fn on_clock(&mut self, event: ClockEvent) -> Vec<Effect> {
        if self.state.phase != SessionPhase::InProgress {
            tracing::debug!(?event, phase = ?self.state.phase, "clock event ignored");
            return Vec::new();
        }
        match event {
            ClockEvent::Tick { remaining } => {
                self.state.remaining_secs = remaining;
                Vec::new()
            }
            ClockEvent::Expired => {
                self.state.remaining_secs = 0;
                self.trigger(SubmissionReason::TimerExpired)
            }
        }
    }

    /// Apply the escalation policy: warn up to `max_warnings` times, then submit.
    pub fn on_violation(&mut self, event: ViolationEvent) -> Vec<Effect> {
        if self.state.phase != SessionPhase::InProgress {
            tracing::debug!(%event, phase = ?self.state.phase, "violation ignored");
            return Vec::new();
        }
        if event == ViolationEvent::FullscreenExited && !self.fullscreen_enforced {
            return Vec::new();
        }

        self.state.violations = self.state.violations.saturating_add(1);
        let count = self.state.violations;
        tracing::warn!(test_id = %self.paper.id(), %event, count, "proctoring violation");

        if count > self.policy.max_warnings {
            return self.trigger(SubmissionReason::ViolationThreshold);
        }

        let warning = ViolationWarning {
            event,
            count,
            warnings_left: self.policy.max_warnings - count,
        };
        self.pending_warning = Some(warning);
        vec![Effect::ShowWarning(warning)]
    }

    /// Dismiss the pending warning so input resumes.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoPendingWarning` when nothing awaits acknowledgement.
    pub fn acknowledge_warning(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.expect_phase(SessionPhase::InProgress)?;
        let warning = self
            .pending_warning
            .take()
            .ok_or(SessionError::NoPendingWarning)?;
        if warning.event == ViolationEvent::FullscreenExited && self.fullscreen_enforced {
            return Ok(vec![Effect::ResumeFullscreen]);
        }
        Ok(Vec::new())
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    fn trigger(&mut self, reason: SubmissionReason) -> Vec<Effect> {
        let Some(reason) = self.gate.try_latch(reason) else {
            tracing::debug!(%reason, "submission already latched");
            return Vec::new();
        };

        self.state.phase = SessionPhase::Submitting;
        self.pending_warning = None;
        tracing::info!(
            test_id = %self.paper.id(),
            %reason,
            answered = self.state.answers.len(),
            "submitting session"
        );

        vec![
            Effect::StopClock,
            Effect::DeactivateMonitor,
            Effect::Submit(self.build_request(reason)),
        ]
    }

    fn build_request(&self, reason: SubmissionReason) -> SubmissionRequest {
        SubmissionRequest {
            test_id: self.paper.id().clone(),
            user_id: self.user_id.clone(),
            answers: self.state.answers.clone(),
            reason,
        }
    }

    fn move_to(&mut self, index: usize) {
        self.state.current = index;
        if let Some(question) = self.paper.question(index) {
            self.state.statuses.visit(question.id());
        }
    }

    fn current_question_owned(&self) -> Result<Question, SessionError> {
        self.current_question()
            .cloned()
            .ok_or(SessionError::IndexOutOfRange {
                index: self.state.current,
                len: self.paper.len(),
            })
    }

    fn status_of(&self, question: &Question) -> QuestionStatus {
        self.state
            .statuses
            .status(question.id())
            .unwrap_or(QuestionStatus::NotVisited)
    }

    fn ensure_input(&self) -> Result<(), SessionError> {
        self.expect_phase(SessionPhase::InProgress)?;
        if self.pending_warning.is_some() {
            return Err(SessionError::AwaitingAcknowledgement);
        }
        Ok(())
    }

    fn expect_phase(&self, expected: SessionPhase) -> Result<(), SessionError> {
        if self.state.phase == expected {
            Ok(())
        } else {
            Err(SessionError::WrongPhase {
                expected,
                actual: self.state.phase,
            })
        }
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("test_id", self.paper.id())
            .field("phase", &self.state.phase)
            .field("current", &self.state.current)
            .field("answered", &self.state.answers.len())
            .field("remaining_secs", &self.state.remaining_secs)
            .field("violations", &self.state.violations)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionId, TestId};

    fn build_paper(n: usize) -> Arc<TestPaper> {
        let questions = (0..n)
            .map(|i| {
                Question::new(
                    QuestionId::new(format!("q{i}")),
                    format!("Question {i}"),
                    vec!["A".into(), "B".into(), "C".into()],
                    None,
                )
            })
            .collect();
        Arc::new(TestPaper::new(TestId::new("t1"), "Mock", questions, None).unwrap())
    }

    fn started(n: usize) -> SessionController {
        let mut controller = SessionController::new(
            build_paper(n),
            UserId::new("u1"),
            ProctorPolicy::default(),
        );
        controller.begin().unwrap();
        controller
    }

    fn result() -> SubmissionResult {
        SubmissionResult {
            test_id: Some(TestId::new("t1")),
            score: 50.0,
            passed: false,
            total_questions: 2,
            correct_answers: 1,
            attempted: Some(1),
            passing_score: Some(60.0),
        }
    }

    fn submit_reason(effects: &[Effect]) -> Option<SubmissionReason> {
        effects.iter().find_map(|effect| match effect {
            Effect::Submit(request) => Some(request.reason),
            _ => None,
        })
    }

    #[test]
    fn begin_starts_clock_monitor_and_visits_first_question() {
        let mut controller =
            SessionController::new(build_paper(3), UserId::new("u1"), ProctorPolicy::default());
        let effects = controller.begin().unwrap();

        assert_eq!(
            effects,
            vec![
                Effect::RequestFullscreen,
                Effect::StartClock { total_secs: 180 },
                Effect::ActivateMonitor,
            ]
        );
        assert_eq!(controller.phase(), SessionPhase::InProgress);
        assert_eq!(
            controller.statuses().status(&QuestionId::new("q0")),
            Some(QuestionStatus::NotAnswered)
        );
        assert_eq!(controller.counts().not_visited, 2);
        assert!(matches!(
            controller.begin(),
            Err(SessionError::WrongPhase { .. })
        ));
    }

    #[test]
    fn two_question_scenario() {
        let mut controller = started(2);
        controller.select("B").unwrap();
        controller.next().unwrap();

        let effects = controller.next().unwrap();
        let expected_counts = StatusCounts {
            not_visited: 0,
            not_answered: 1,
            answered: 1,
            marked_review: 0,
            answered_marked: 0,
        };
        assert_eq!(effects, vec![Effect::ConfirmSubmission(expected_counts)]);

        let effects = controller.confirm_submit().unwrap();
        assert_eq!(submit_reason(&effects), Some(SubmissionReason::UserConfirmed));
        assert_eq!(controller.answers().get(&QuestionId::new("q0")), Some("B"));
        assert_eq!(controller.answers().len(), 1);
        assert_eq!(
            controller.statuses().status(&QuestionId::new("q1")),
            Some(QuestionStatus::NotAnswered)
        );
        assert_eq!(controller.counts(), expected_counts);
    }

    #[test]
    fn mark_bit_survives_select_and_clear() {
        let mut controller = started(1);
        let q0 = QuestionId::new("q0");
        controller.mark_for_review().unwrap();
        controller.select("A").unwrap();
        assert_eq!(
            controller.statuses().status(&q0),
            Some(QuestionStatus::AnsweredAndMarked)
        );
        controller.clear_response().unwrap();
        assert_eq!(
            controller.statuses().status(&q0),
            Some(QuestionStatus::MarkedForReview)
        );
        assert!(controller.answers().is_empty());
    }

    #[test]
    fn toggling_mark_keeps_answer() {
        let mut controller = started(1);
        controller.select("C").unwrap();
        controller.toggle_review_mark().unwrap();
        controller.toggle_review_mark().unwrap();
        assert_eq!(
            controller.statuses().status(&QuestionId::new("q0")),
            Some(QuestionStatus::Answered)
        );
    }

    #[test]
    fn reanswering_overwrites() {
        let mut controller = started(1);
        controller.select("A").unwrap();
        controller.select("C").unwrap();
        assert_eq!(controller.answers().get(&QuestionId::new("q0")), Some("C"));
        assert_eq!(controller.answers().len(), 1);
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut controller = started(1);
        assert!(matches!(
            controller.select("Z"),
            Err(SessionError::UnknownOption { .. })
        ));
        assert!(controller.answers().is_empty());
    }

    #[test]
    fn jump_to_visits_any_question() {
        let mut controller = started(4);
        controller.jump_to(3).unwrap();
        controller.previous().unwrap();
        assert_eq!(controller.current_index(), 2);
        assert_eq!(controller.counts().not_visited, 1);
        assert!(matches!(
            controller.jump_to(4),
            Err(SessionError::IndexOutOfRange { index: 4, len: 4 })
        ));
    }

    #[test]
    fn previous_clamps_at_first_question() {
        let mut controller = started(2);
        controller.previous().unwrap();
        assert_eq!(controller.current_index(), 0);
    }

    #[test]
    fn timer_expiry_submits_empty_answers() {
        let mut controller = started(1);
        for remaining in (1..5).rev() {
            assert!(controller.on_clock(ClockEvent::Tick { remaining }).is_empty());
        }
        let effects = controller.on_clock(ClockEvent::Expired);
        assert_eq!(submit_reason(&effects), Some(SubmissionReason::TimerExpired));
        assert!(effects.contains(&Effect::StopClock));
        assert!(effects.contains(&Effect::DeactivateMonitor));

        controller.submission_succeeded(result()).unwrap();
        assert_eq!(controller.phase(), SessionPhase::Submitted);
        assert_eq!(controller.submission_reason(), Some(SubmissionReason::TimerExpired));
        assert!(controller.answers().is_empty());
    }

    #[test]
    fn third_violation_is_fatal_regardless_of_type() {
        let mut controller = started(2);

        let effects = controller.on_violation(ViolationEvent::FullscreenExited);
        assert!(matches!(effects.as_slice(), [Effect::ShowWarning(w)] if w.warnings_left == 1));
        assert_eq!(
            controller.acknowledge_warning().unwrap(),
            vec![Effect::ResumeFullscreen]
        );

        controller.on_violation(ViolationEvent::FullscreenExited);
        controller.acknowledge_warning().unwrap();

        let effects = controller.on_violation(ViolationEvent::TabHidden);
        assert_eq!(
            submit_reason(&effects),
            Some(SubmissionReason::ViolationThreshold)
        );
        assert_eq!(controller.phase(), SessionPhase::Submitting);
    }

    #[test]
    fn warning_blocks_input_until_acknowledged() {
        let mut controller = started(2);
        controller.on_violation(ViolationEvent::TabHidden);
        assert_eq!(
            controller.select("A"),
            Err(SessionError::AwaitingAcknowledgement)
        );
        assert_eq!(controller.acknowledge_warning().unwrap(), Vec::new());
        controller.select("A").unwrap();
        assert_eq!(
            controller.acknowledge_warning(),
            Err(SessionError::NoPendingWarning)
        );
    }

    #[test]
    fn threshold_is_configurable() {
        let mut controller = SessionController::new(
            build_paper(1),
            UserId::new("u1"),
            ProctorPolicy::default().with_max_warnings(0),
        );
        controller.begin().unwrap();
        let effects = controller.on_violation(ViolationEvent::ClipboardAttempt);
        assert_eq!(
            submit_reason(&effects),
            Some(SubmissionReason::ViolationThreshold)
        );
    }

    #[test]
    fn fullscreen_exit_ignored_once_denied() {
        let mut controller = started(1);
        controller.fullscreen_denied();
        assert!(controller.on_violation(ViolationEvent::FullscreenExited).is_empty());
        assert_eq!(controller.violations(), 0);
    }

    #[test]
    fn acknowledged_exit_resumes_without_relaxing_enforcement() {
        let mut controller = started(1);
        controller.on_violation(ViolationEvent::FullscreenExited);
        assert_eq!(
            controller.acknowledge_warning().unwrap(),
            vec![Effect::ResumeFullscreen]
        );
        assert!(controller.fullscreen_enforced());

        controller.on_violation(ViolationEvent::FullscreenExited);
        controller.acknowledge_warning().unwrap();
        let effects = controller.on_violation(ViolationEvent::FullscreenExited);

        assert_eq!(controller.violations(), 3);
        assert_eq!(
            submit_reason(&effects),
            Some(SubmissionReason::ViolationThreshold)
        );
    }

    #[test]
    fn fatal_violation_before_expiry_submits_once() {
        let mut controller = started(1);
        controller.on_violation(ViolationEvent::TabHidden);
        controller.acknowledge_warning().unwrap();
        controller.on_violation(ViolationEvent::TabHidden);
        controller.acknowledge_warning().unwrap();

        let first = controller.on_violation(ViolationEvent::TabHidden);
        let second = controller.on_clock(ClockEvent::Expired);

        assert_eq!(
            submit_reason(&first),
            Some(SubmissionReason::ViolationThreshold)
        );
        assert!(second.is_empty());
        assert_eq!(controller.submission_attempts(), 1);
        assert_eq!(
            controller.submission_reason(),
            Some(SubmissionReason::ViolationThreshold)
        );
    }

    #[test]
    fn same_tick_triggers_submit_once() {
        let mut controller = started(1);
        controller.on_violation(ViolationEvent::TabHidden);
        controller.acknowledge_warning().unwrap();
        controller.on_violation(ViolationEvent::TabHidden);
        controller.acknowledge_warning().unwrap();

        let first = controller.on_clock(ClockEvent::Expired);
        let second = controller.on_violation(ViolationEvent::TabHidden);
        let third = controller.navigate_away();

        assert_eq!(submit_reason(&first), Some(SubmissionReason::TimerExpired));
        assert!(second.is_empty());
        assert!(third.is_empty());
        assert_eq!(controller.submission_attempts(), 1);
    }

    #[test]
    fn events_after_submission_do_not_mutate_state() {
        let mut controller = started(2);
        controller.select("B").unwrap();
        controller.confirm_submit().unwrap();
        controller.submission_succeeded(result()).unwrap();
        let before = controller.state().clone();

        assert!(controller.on_clock(ClockEvent::Tick { remaining: 3 }).is_empty());
        assert!(controller.on_clock(ClockEvent::Expired).is_empty());
        assert!(controller.on_violation(ViolationEvent::TabHidden).is_empty());
        assert!(controller.select("A").is_err());
        assert_eq!(controller.state(), &before);
    }

    #[test]
    fn failed_submission_needs_explicit_retry() {
        let mut controller = started(1);
        controller.confirm_submit().unwrap();
        let effects = controller.submission_failed("connection reset").unwrap();
        assert!(matches!(
            effects.as_slice(),
            [Effect::SubmissionFailed { attempts: 1, .. }]
        ));

        assert!(controller.on_clock(ClockEvent::Expired).is_empty());
        let retry = controller.retry_submission().unwrap();
        assert_eq!(submit_reason(&retry), Some(SubmissionReason::UserConfirmed));
        assert_eq!(controller.submission_attempts(), 2);
        assert_eq!(
            controller.retry_submission(),
            Err(SessionError::NothingToRetry)
        );
    }

    #[test]
    fn exit_fullscreen_on_completion() {
        let mut controller = started(1);
        controller.confirm_submit().unwrap();
        let effects = controller.submission_succeeded(result()).unwrap();
        assert_eq!(effects[0], Effect::ExitFullscreen);
        assert!(matches!(effects[1], Effect::ShowResult(_)));
        assert!(controller.result().is_some());
    }
}
