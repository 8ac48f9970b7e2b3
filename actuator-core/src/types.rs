//! Manager lifecycle and per-job run records.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle of the manager across one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Created,
    Loaded,
    Running,
    Succeeded,
    Failed,
}

impl ManagerState {
    /// Returns true if this state is terminal.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for ManagerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Loaded => "loaded",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        })
    }
}

/// Status of one job within a run.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        })
    }
}

/// Record of one job's execution within the sequence.
///
/// Purely observational; the manager updates these as execution proceeds
/// so the outcome of a partial run can be reported.
#[derive(Debug, Clone, Serialize)]
pub struct JobRun {
    pub job_name: String,
    pub status: JobStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl JobRun {
    /// Create a new pending record.
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            status: JobStatus::Pending,
            started_at: None,
            finished_at: None,
            error_message: None,
        }
    }

    /// Mark the job as running.
    pub fn start(&mut self) {
        self.status = JobStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Mark the job as completed.
    pub fn complete(&mut self) {
        self.status = JobStatus::Completed;
        self.finished_at = Some(Utc::now());
    }

    /// Mark the job as failed with an error message.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.finished_at = Some(Utc::now());
        self.error_message = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(ManagerState::Succeeded.is_terminal());
        assert!(ManagerState::Failed.is_terminal());
        assert!(!ManagerState::Created.is_terminal());
        assert!(!ManagerState::Loaded.is_terminal());
        assert!(!ManagerState::Running.is_terminal());
    }

    #[test]
    fn job_run_transitions() {
        let mut run = JobRun::new("install");
        assert_eq!(run.status, JobStatus::Pending);
        assert!(run.started_at.is_none());

        run.start();
        assert_eq!(run.status, JobStatus::Running);
        assert!(run.started_at.is_some());

        run.fail("disk full");
        assert_eq!(run.status, JobStatus::Failed);
        assert!(run.finished_at.is_some());
        assert_eq!(run.error_message.as_deref(), Some("disk full"));
    }
}
