//! Error taxonomy for the orchestration core.

use thiserror::Error;

/// Errors that may occur while planning or executing atom jobs.
///
/// Everything except [`ActuatorError::Execution`] is raised before any job
/// has started running, so callers can rely on no side effects having
/// happened yet.
#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to decode payload: {0}")]
    Decode(String),

    #[error("atom job not found: {0}")]
    JobNotFound(String),

    #[error("invalid parameters for atom job {job}: {detail}")]
    Validation { job: String, detail: String },

    #[error("atom job {job} failed: {detail}")]
    Execution { job: String, detail: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ActuatorError {
    /// Shorthand for a validation failure named to the offending job.
    pub fn validation(job: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Validation {
            job: job.into(),
            detail: detail.into(),
        }
    }

    /// Shorthand for an execution failure named to the offending job.
    pub fn execution(job: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Execution {
            job: job.into(),
            detail: detail.into(),
        }
    }

    /// True when this error was raised before any job began executing.
    pub fn is_pre_execution(&self) -> bool {
        !matches!(self, Self::Execution { .. })
    }
}
