//! The job manager: decode, resolve, bind, then run in order.

use serde_json::Value;
use tracing::{debug, error, info};

use crate::context::ExecutionContext;
use crate::error::ActuatorError;
use crate::job::AtomJob;
use crate::payload::{PayloadFormat, RequestPayload};
use crate::registry::JobRegistry;
use crate::types::{JobRun, ManagerState};

/// Orchestrates one invocation: payload decode, registry resolution,
/// parameter binding, and strictly ordered fail-fast execution.
///
/// The state machine is `Created -> Loaded -> Running -> Succeeded|Failed`.
/// Loading is atomic: either every name in the execution list resolves and
/// binds, or the manager stays in `Created` with no bound instances.
pub struct JobManager {
    ctx: ExecutionContext,
    registry: JobRegistry,
    payload: RequestPayload,
    explicit_list: Option<Vec<String>>,
    jobs: Vec<(String, Box<dyn AtomJob>)>,
    runs: Vec<JobRun>,
    state: ManagerState,
}

impl std::fmt::Debug for JobManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobManager")
            .field("state", &self.state)
            .field("jobs", &self.job_name_list())
            .finish()
    }
}

impl JobManager {
    /// Build a manager for one request.
    ///
    /// The payload is decoded here, so an unsupported format or malformed
    /// blob fails before any registry lookup. `atom_job_list` is the
    /// optional explicit comma-separated execution list; when absent the
    /// list is derived from the payload keys at load time.
    pub fn new(
        ctx: ExecutionContext,
        registry: JobRegistry,
        raw_payload: &str,
        format: PayloadFormat,
        atom_job_list: Option<&str>,
    ) -> Result<Self, ActuatorError> {
        let payload = RequestPayload::decode(raw_payload, format)?;
        let explicit_list = atom_job_list.and_then(parse_job_list);
        Ok(Self {
            ctx,
            registry,
            payload,
            explicit_list,
            jobs: Vec::new(),
            runs: Vec::new(),
            state: ManagerState::Created,
        })
    }

    /// Resolve and bind every job in the execution list.
    ///
    /// The execution list is the explicit list when one was given,
    /// otherwise the registry-resolvable payload keys in payload order.
    /// Any unresolvable name or invalid parameter set aborts the whole
    /// load and leaves the manager in `Created`.
    pub fn load_atom_jobs(&mut self) -> Result<(), ActuatorError> {
        if self.state != ManagerState::Created {
            return Err(ActuatorError::Config(format!(
                "load_atom_jobs is only valid once, from state created (currently {})",
                self.state
            )));
        }

        let names = self.execution_list()?;

        let mut jobs: Vec<(String, Box<dyn AtomJob>)> = Vec::with_capacity(names.len());
        for name in &names {
            let mut job = self.registry.resolve(name)?;
            let raw = self.payload.get(name).ok_or_else(|| {
                ActuatorError::validation(name.clone(), "no parameters present in payload")
            })?;
            job.bind(raw)?;
            debug!(job = %name, "atom job bound");
            jobs.push((name.clone(), job));
        }

        // Every job bound; the plan becomes visible atomically.
        self.runs = names.iter().map(JobRun::new).collect();
        self.jobs = jobs;
        self.state = ManagerState::Loaded;
        info!(jobs = ?names, "atom jobs loaded");
        Ok(())
    }

    /// Execute the loaded jobs strictly in order, stopping at the first
    /// failure. Jobs after a failed one are never started; completed jobs
    /// are not rolled back.
    pub async fn run_atom_jobs(&mut self) -> Result<(), ActuatorError> {
        if self.state != ManagerState::Loaded {
            return Err(ActuatorError::Config(format!(
                "run_atom_jobs requires state loaded (currently {})",
                self.state
            )));
        }
        self.state = ManagerState::Running;

        for index in 0..self.jobs.len() {
            let (name, job) = &mut self.jobs[index];
            self.runs[index].start();
            info!(
                job = %name,
                position = index,
                request_id = %self.ctx.request_id(),
                root_id = %self.ctx.root_id(),
                node_id = %self.ctx.node_id(),
                "starting atom job"
            );
            match job.run(&self.ctx).await {
                Ok(()) => {
                    self.runs[index].complete();
                    info!(job = %name, "atom job completed");
                }
                Err(e) => {
                    self.runs[index].fail(e.to_string());
                    self.state = ManagerState::Failed;
                    error!(job = %name, error = %e, "atom job failed, aborting remaining jobs");
                    return Err(e);
                }
            }
        }

        self.state = ManagerState::Succeeded;
        info!(jobs = self.jobs.len(), "all atom jobs completed");
        Ok(())
    }

    /// The planned execution order. Empty before a successful load.
    pub fn job_name_list(&self) -> Vec<&str> {
        self.jobs.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// The bound instance for `name` from the execution list (not the
    /// full registry).
    pub fn atom_job_instance(&self, name: &str) -> Result<&dyn AtomJob, ActuatorError> {
        self.jobs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, job)| job.as_ref())
            .ok_or_else(|| ActuatorError::JobNotFound(name.to_owned()))
    }

    /// Bound parameters for `name`, for introspection.
    pub fn job_params(&self, name: &str) -> Result<Value, ActuatorError> {
        Ok(self.atom_job_instance(name)?.params())
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    /// Per-job run records, in execution order.
    pub fn run_report(&self) -> &[JobRun] {
        &self.runs
    }

    fn execution_list(&self) -> Result<Vec<String>, ActuatorError> {
        let names: Vec<String> = match &self.explicit_list {
            Some(list) => {
                for name in list {
                    if !self.registry.contains(name) {
                        return Err(ActuatorError::JobNotFound(name.clone()));
                    }
                }
                list.clone()
            }
            None => self
                .payload
                .names()
                .filter(|name| self.registry.contains(name))
                .map(str::to_owned)
                .collect(),
        };
        if names.is_empty() {
            return Err(ActuatorError::Config(
                "no atom jobs to run: execution list is empty".to_owned(),
            ));
        }
        Ok(names)
    }
}

fn parse_job_list(raw: &str) -> Option<Vec<String>> {
    let names: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::types::JobStatus;

    /// Instrumented job type recording every invocation into a shared log.
    struct RecordingJob {
        name: String,
        fail: bool,
        params: Value,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl AtomJob for RecordingJob {
        fn name(&self) -> &str {
            &self.name
        }

        fn default_params(&self) -> Value {
            json!({})
        }

        fn bind(&mut self, raw: &Value) -> Result<(), ActuatorError> {
            if raw.get("invalid").is_some() {
                return Err(ActuatorError::validation(self.name.clone(), "invalid flag set"));
            }
            self.params = raw.clone();
            Ok(())
        }

        fn params(&self) -> Value {
            self.params.clone()
        }

        async fn run(&mut self, _ctx: &ExecutionContext) -> Result<(), ActuatorError> {
            self.log.lock().unwrap().push(self.name.clone());
            if self.fail {
                return Err(ActuatorError::execution(self.name.clone(), "instrumented failure"));
            }
            Ok(())
        }
    }

    fn registry_with(names: &[(&str, bool)], log: &Arc<Mutex<Vec<String>>>) -> JobRegistry {
        let mut registry = JobRegistry::new();
        for (name, fail) in names {
            let name = name.to_string();
            let fail = *fail;
            let log = log.clone();
            registry
                .register(&name.clone(), move || {
                    Box::new(RecordingJob {
                        name: name.clone(),
                        fail,
                        params: json!({}),
                        log: log.clone(),
                    })
                })
                .unwrap();
        }
        registry
    }

    fn ctx() -> ExecutionContext {
        ExecutionContext::new("u", "r", "n", "v", "/tmp", "/tmp/data", "/tmp/backup")
    }

    fn manager(
        names: &[(&str, bool)],
        payload: Value,
        list: Option<&str>,
        log: &Arc<Mutex<Vec<String>>>,
    ) -> JobManager {
        let registry = registry_with(names, log);
        JobManager::new(
            ctx(),
            registry,
            &payload.to_string(),
            PayloadFormat::Raw,
            list,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn runs_jobs_in_explicit_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let payload = json!({"job_a": {"x": 1}, "job_b": {"y": 2}});
        let mut m = manager(
            &[("job_a", false), ("job_b", false)],
            payload,
            Some("job_a,job_b"),
            &log,
        );

        m.load_atom_jobs().unwrap();
        assert_eq!(m.state(), ManagerState::Loaded);
        assert_eq!(m.job_name_list(), vec!["job_a", "job_b"]);

        m.run_atom_jobs().await.unwrap();
        assert_eq!(m.state(), ManagerState::Succeeded);
        assert_eq!(*log.lock().unwrap(), vec!["job_a", "job_b"]);
    }

    #[tokio::test]
    async fn explicit_list_overrides_payload_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let payload = json!({"job_a": {}, "job_b": {}});
        let mut m = manager(
            &[("job_a", false), ("job_b", false)],
            payload,
            Some("job_b,job_a"),
            &log,
        );
        m.load_atom_jobs().unwrap();
        m.run_atom_jobs().await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["job_b", "job_a"]);
    }

    #[tokio::test]
    async fn implicit_list_follows_payload_insertion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let payload = json!({"job_b": {}, "job_a": {}, "unregistered": {}});
        let mut m = manager(&[("job_a", false), ("job_b", false)], payload, None, &log);
        m.load_atom_jobs().unwrap();
        assert_eq!(m.job_name_list(), vec!["job_b", "job_a"]);
    }

    #[tokio::test]
    async fn unregistered_explicit_name_fails_load() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let payload = json!({"job_a": {"x": 1}, "job_b": {"y": 2}});
        let mut m = manager(
            &[("job_a", false), ("job_b", false)],
            payload,
            Some("job_a,job_c"),
            &log,
        );

        let err = m.load_atom_jobs().unwrap_err();
        assert!(matches!(err, ActuatorError::JobNotFound(name) if name == "job_c"));
        assert_eq!(m.state(), ManagerState::Created);
        assert!(m.job_name_list().is_empty());
        // run must be rejected, nothing ever executed
        assert!(m.run_atom_jobs().await.is_err());
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn validation_failure_leaves_no_jobs_loaded() {
        let log = Arc::new(Mutex::new(Vec::new()));
        // job_a binds fine, job_b rejects its parameters; neither may stay loaded
        let payload = json!({"job_a": {}, "job_b": {"invalid": true}});
        let mut m = manager(
            &[("job_a", false), ("job_b", false)],
            payload,
            Some("job_a,job_b"),
            &log,
        );
        let err = m.load_atom_jobs().unwrap_err();
        assert!(matches!(err, ActuatorError::Validation { ref job, .. } if job == "job_b"));
        assert_eq!(m.state(), ManagerState::Created);
        assert!(m.job_name_list().is_empty());
    }

    #[tokio::test]
    async fn fail_fast_skips_remaining_jobs() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let payload = json!({"job_a": {}, "job_b": {}, "job_c": {}});
        let mut m = manager(
            &[("job_a", false), ("job_b", true), ("job_c", false)],
            payload,
            Some("job_a,job_b,job_c"),
            &log,
        );
        m.load_atom_jobs().unwrap();

        let err = m.run_atom_jobs().await.unwrap_err();
        assert!(matches!(err, ActuatorError::Execution { ref job, .. } if job == "job_b"));
        assert_eq!(m.state(), ManagerState::Failed);
        assert_eq!(*log.lock().unwrap(), vec!["job_a", "job_b"]);

        let report = m.run_report();
        assert_eq!(report[0].status, JobStatus::Completed);
        assert_eq!(report[1].status, JobStatus::Failed);
        assert_eq!(report[2].status, JobStatus::Pending);
        assert!(report[1].error_message.as_deref().unwrap().contains("job_b"));
    }

    #[tokio::test]
    async fn run_is_rejected_after_terminal_state() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let payload = json!({"job_a": {}});
        let mut m = manager(&[("job_a", false)], payload, None, &log);
        m.load_atom_jobs().unwrap();
        m.run_atom_jobs().await.unwrap();
        assert_eq!(m.state(), ManagerState::Succeeded);

        let err = m.run_atom_jobs().await.unwrap_err();
        assert!(matches!(err, ActuatorError::Config(_)));
        // no second invocation happened
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn load_is_rejected_twice() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let payload = json!({"job_a": {}});
        let mut m = manager(&[("job_a", false)], payload, None, &log);
        m.load_atom_jobs().unwrap();
        assert!(matches!(
            m.load_atom_jobs().unwrap_err(),
            ActuatorError::Config(_)
        ));
    }

    #[tokio::test]
    async fn load_never_runs_anything() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let payload = json!({"job_a": {}, "job_b": {}});
        let mut m = manager(&[("job_a", false), ("job_b", false)], payload, None, &log);
        m.load_atom_jobs().unwrap();
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bound_params_are_introspectable() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let payload = json!({"job_a": {"x": 1}});
        let mut m = manager(&[("job_a", false)], payload, None, &log);
        m.load_atom_jobs().unwrap();

        assert_eq!(m.job_params("job_a").unwrap(), json!({"x": 1}));
        let err = m.atom_job_instance("job_b").err().unwrap();
        assert!(matches!(err, ActuatorError::JobNotFound(_)));
    }

    #[tokio::test]
    async fn explicit_name_missing_from_payload_is_a_validation_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let payload = json!({"job_a": {}});
        let mut m = manager(
            &[("job_a", false), ("job_b", false)],
            payload,
            Some("job_a,job_b"),
            &log,
        );
        let err = m.load_atom_jobs().unwrap_err();
        assert!(matches!(err, ActuatorError::Validation { ref job, .. } if job == "job_b"));
    }

    #[tokio::test]
    async fn empty_execution_list_is_a_config_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let payload = json!({"unknown_job": {}});
        let mut m = manager(&[("job_a", false)], payload, None, &log);
        let err = m.load_atom_jobs().unwrap_err();
        assert!(matches!(err, ActuatorError::Config(_)));
    }

    #[test]
    fn unsupported_format_fails_before_any_lookup() {
        let err = "xml".parse::<PayloadFormat>().unwrap_err();
        assert!(matches!(err, ActuatorError::Decode(_)));
    }
}
