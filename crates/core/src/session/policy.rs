use serde::{Deserialize, Serialize};

/// Tunable proctoring policy for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProctorPolicy {
    /// Violations answered with a warning. The next one submits the session.
    pub max_warnings: u32,
    /// Allotment for questions that carry none.
    pub default_question_secs: u32,
    /// Fixed whole-exam budget; overrides the per-question sum.
    pub exam_duration_secs: Option<u32>,
    pub enforce_fullscreen: bool,
}

impl ProctorPolicy {
    #[must_use]
    pub fn with_max_warnings(mut self, max_warnings: u32) -> Self {
        self.max_warnings = max_warnings;
        self
    }

    #[must_use]
    pub fn with_exam_duration_secs(mut self, secs: u32) -> Self {
        self.exam_duration_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn without_fullscreen(mut self) -> Self {
        self.enforce_fullscreen = false;
        self
    }
}

impl Default for ProctorPolicy {
    fn default() -> Self {
        Self {
            max_warnings: 2,
            default_question_secs: 60,
            exam_duration_secs: None,
            enforce_fullscreen: true,
        }
    }
}
