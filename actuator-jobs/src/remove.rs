//! Remove job: tear down an instance directory.

use actuator_core::{async_trait, ActuatorError, AtomJob, ExecutionContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::common::{parse_params, port_in_range, reject_violations, to_params_value};
use crate::job_names;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoveParams {
    /// Port of the instance to remove.
    #[serde(default)]
    pub port: u16,
    /// Remove even when the instance directory still holds data files.
    #[serde(default)]
    pub force: bool,
}

impl RemoveParams {
    fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if !port_in_range(self.port) {
            violations.push(format!("port {} must be greater than 1024", self.port));
        }
        violations
    }
}

#[derive(Debug, Default)]
pub struct RemoveJob {
    params: Option<RemoveParams>,
}

#[async_trait]
impl AtomJob for RemoveJob {
    fn name(&self) -> &str {
        job_names::REMOVE
    }

    fn default_params(&self) -> Value {
        to_params_value(&RemoveParams::default())
    }

    fn bind(&mut self, raw: &Value) -> Result<(), ActuatorError> {
        let params: RemoveParams = parse_params(self.name(), raw)?;
        reject_violations(self.name(), params.validate())?;
        self.params = Some(params);
        Ok(())
    }

    fn params(&self) -> Value {
        match &self.params {
            Some(params) => to_params_value(params),
            None => self.default_params(),
        }
    }

    async fn run(&mut self, ctx: &ExecutionContext) -> Result<(), ActuatorError> {
        let params = self.params.take().ok_or_else(|| {
            ActuatorError::execution(self.name(), "run invoked without bound parameters")
        })?;

        let instance_dir = ctx.data_dir().join(params.port.to_string());
        if !instance_dir.exists() {
            warn!(port = params.port, "nothing to remove, instance directory absent");
            return Ok(());
        }

        if !params.force {
            let mut entries = tokio::fs::read_dir(instance_dir.join("db")).await.ok();
            let has_data = match entries.as_mut() {
                Some(entries) => entries.next_entry().await?.is_some(),
                None => false,
            };
            if has_data {
                return Err(ActuatorError::execution(
                    self.name(),
                    format!(
                        "instance on port {} still holds data files, pass force to remove",
                        params.port
                    ),
                ));
            }
        }

        tokio::fs::remove_dir_all(&instance_dir).await?;
        info!(
            port = params.port,
            force = params.force,
            instance_dir = %instance_dir.display(),
            "instance removed"
        );
        Ok(())
    }
}
