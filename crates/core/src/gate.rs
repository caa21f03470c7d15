use crate::model::SubmissionReason;

/// At-most-once latch in front of the scoring endpoint.
///
/// The first trigger wins and fixes the reason. A failed attempt keeps the
/// latch closed; only an explicit [`SubmissionGate::rearm`] opens it again,
/// and only for a single further attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubmissionGate {
    reason: Option<SubmissionReason>,
    latched: bool,
    failed: bool,
    attempts: u32,
}

impl SubmissionGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim the gate. Returns the reason the attempt should carry,
    /// or `None` when another trigger already holds it.
    pub fn try_latch(&mut self, reason: SubmissionReason) -> Option<SubmissionReason> {
        if self.latched {
            return None;
        }
        self.latched = true;
        self.failed = false;
        self.attempts = self.attempts.saturating_add(1);
        Some(*self.reason.get_or_insert(reason))
    }

    pub fn record_failure(&mut self) {
        if self.latched {
            self.failed = true;
        }
    }

    /// Re-open the latch after a failed attempt. Returns `false` when there
    /// is no failure to retry.
    pub fn rearm(&mut self) -> bool {
        if !self.failed {
            return false;
        }
        self.latched = false;
        self.failed = false;
        true
    }

    #[must_use]
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    #[must_use]
    pub fn reason(&self) -> Option<SubmissionReason> {
        self.reason
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
