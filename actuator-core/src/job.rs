//! The atom job trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::error::ActuatorError;

/// The capability set every atomic job implements.
///
/// A job instance goes through at most one `bind` and at most one `run`.
/// `bind` must leave the instance untouched on failure; `run` is only
/// invoked by the manager after the whole execution list bound
/// successfully.
#[async_trait]
pub trait AtomJob: Send {
    /// The registry name of this job type.
    fn name(&self) -> &str;

    /// Parameter representation in its default, unbound state.
    ///
    /// Used for introspection and documentation; must not require a
    /// request to exist.
    fn default_params(&self) -> Value;

    /// Parse `raw` into the job's typed parameters and validate them.
    ///
    /// Validation checks every structural constraint it can (required
    /// fields, enumerations, numeric ranges, cross-field consistency) and
    /// reports the single most actionable violation as
    /// [`ActuatorError::Validation`].
    fn bind(&mut self, raw: &Value) -> Result<(), ActuatorError>;

    /// Current parameter values. After a successful `bind` the returned
    /// value feeds back through `bind` on a fresh instance to equal bound
    /// parameters.
    fn params(&self) -> Value;

    /// Perform the operation. Safe to call exactly once.
    async fn run(&mut self, ctx: &ExecutionContext) -> Result<(), ActuatorError>;
}

/// Factory producing a fresh, unbound job instance.
pub type JobFactory = Box<dyn Fn() -> Box<dyn AtomJob> + Send + Sync>;

/// A job that accepts any parameters and does nothing when run.
///
/// Useful as a placeholder while a real implementation is not wired in,
/// and in tests.
#[derive(Debug, Default)]
pub struct NoopJob {
    name: String,
    params: Value,
}

impl NoopJob {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Value::Object(Default::default()),
        }
    }
}

#[async_trait]
impl AtomJob for NoopJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_params(&self) -> Value {
        Value::Object(Default::default())
    }

    fn bind(&mut self, raw: &Value) -> Result<(), ActuatorError> {
        self.params = raw.clone();
        Ok(())
    }

    fn params(&self) -> Value {
        self.params.clone()
    }

    async fn run(&mut self, _ctx: &ExecutionContext) -> Result<(), ActuatorError> {
        Ok(())
    }
}
