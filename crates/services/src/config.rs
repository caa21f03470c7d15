use std::env;
use std::fmt;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the exam backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExamApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ExamApiConfig {
    /// Read `EXAM_API_BASE_URL` and `EXAM_API_TIMEOUT_SECS`, with defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("EXAM_API_BASE_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let timeout_secs = lookup("EXAM_API_TIMEOUT_SECS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ExamApiConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Who is taking the exam. Passed in explicitly; never read from ambient storage.
#[derive(Clone, Default)]
pub struct SessionContext {
    credential: Option<String>,
}

impl SessionContext {
    #[must_use]
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            credential: Some(credential.into()),
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref().filter(|c| !c.trim().is_empty())
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.credential().is_some())
            .finish()
    }
}
