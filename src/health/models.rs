use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    /// Reachable and functioning
    Up,
    /// Reachable infrastructure, but the service is not running
    Down,
    /// The probe itself could not be completed
    Error,
}

impl ServiceState {
    pub fn is_up(self) -> bool {
        self == Self::Up
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Outcome of one probe. Immutable once built.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CheckResult {
    service: String,
    state: ServiceState,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause_detail: Option<String>,
}

impl CheckResult {
    pub fn up(service: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(service, ServiceState::Up, detail)
    }

    pub fn down(service: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(service, ServiceState::Down, detail)
    }

    pub fn error(service: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(service, ServiceState::Error, detail)
    }

    fn new(service: impl Into<String>, state: ServiceState, detail: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            state,
            detail: detail.into(),
            cause_detail: None,
        }
    }

    /// Attach the underlying failure text.
    pub fn with_cause(mut self, cause: impl fmt::Display) -> Self {
        self.cause_detail = Some(cause.to_string());
        self
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn cause_detail(&self) -> Option<&str> {
        self.cause_detail.as_deref()
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ExitCode {
    Success,
    Critical,
}

impl ExitCode {
    /// Process exit status.
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Critical => 1,
        }
    }

    /// Escalate to `Critical` on any non-UP state. Never de-escalates.
    pub fn escalate(self, state: ServiceState) -> Self {
        match state {
            ServiceState::Up => self,
            ServiceState::Down | ServiceState::Error => Self::Critical,
        }
    }
}

impl Default for ExitCode {
    fn default() -> Self {
        Self::Success
    }
}

/// Everything a run emitted, in emission order.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub timestamp: DateTime<Utc>,
    /// The profile line. UP on success, ERROR when resolution failed.
    pub profile: CheckResult,
    /// One entry per probe actually executed.
    pub checks: Vec<CheckResult>,
    pub exit_code: ExitCode,
}

impl RunOutcome {
    pub(crate) fn resolved(profile: CheckResult) -> Self {
        Self {
            timestamp: Utc::now(),
            profile,
            checks: Vec::new(),
            exit_code: ExitCode::Success,
        }
    }

    pub(crate) fn fatal(profile: CheckResult) -> Self {
        Self {
            timestamp: Utc::now(),
            profile,
            checks: Vec::new(),
            exit_code: ExitCode::Critical,
        }
    }

    pub(crate) fn record(&mut self, result: CheckResult) {
        self.exit_code = self.exit_code.escalate(result.state());
        self.checks.push(result);
    }

    /// Every emitted line: the profile line followed by the probe results.
    pub fn lines(&self) -> impl Iterator<Item = &CheckResult> {
        std::iter::once(&self.profile).chain(self.checks.iter())
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == ExitCode::Success
    }
}
