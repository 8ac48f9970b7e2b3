//! The atom job registry.

use std::collections::HashMap;

use crate::error::ActuatorError;
use crate::job::{AtomJob, JobFactory};

/// Process-wide table mapping atom job names to factories.
///
/// Built once at startup by an explicit registration pass and handed to
/// the manager read-only. Registration order is kept so name listings are
/// deterministic.
#[derive(Default)]
pub struct JobRegistry {
    /// Registration order of names.
    order: Vec<String>,
    /// Map from name to factory for O(1) lookup.
    factories: HashMap<String, JobFactory>,
}

impl std::fmt::Debug for JobRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRegistry")
            .field("names", &self.order)
            .finish()
    }
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `name`.
    ///
    /// Registering the same name twice is a configuration error; it means
    /// two job types compete for one name and is surfaced at startup, not
    /// per request.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<(), ActuatorError>
    where
        F: Fn() -> Box<dyn AtomJob> + Send + Sync + 'static,
    {
        if self.factories.contains_key(name) {
            return Err(ActuatorError::Config(format!(
                "atom job {name} registered twice"
            )));
        }
        self.order.push(name.to_owned());
        self.factories.insert(name.to_owned(), Box::new(factory));
        Ok(())
    }

    /// Produce a fresh, unbound instance for `name`.
    pub fn resolve(&self, name: &str) -> Result<Box<dyn AtomJob>, ActuatorError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ActuatorError::JobNotFound(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// All registered names, in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
