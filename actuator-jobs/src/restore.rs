//! Restore job: put archived files back into an instance directory.

use std::path::Path;

use actuator_core::{async_trait, ActuatorError, AtomJob, ExecutionContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::common::{parse_params, port_in_range, reject_violations, to_params_value};
use crate::job_names;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestoreParams {
    /// Port of the instance to restore into.
    #[serde(default)]
    pub port: u16,
    /// Backup directory or file to restore from. Must exist at run time;
    /// load-time validation is structural only.
    #[serde(default)]
    pub source: String,
}

impl RestoreParams {
    fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if !port_in_range(self.port) {
            violations.push(format!("port {} must be greater than 1024", self.port));
        }
        if self.source.is_empty() {
            violations.push("source is required".to_owned());
        }
        violations
    }
}

#[derive(Debug, Default)]
pub struct RestoreJob {
    params: Option<RestoreParams>,
}

#[async_trait]
impl AtomJob for RestoreJob {
    fn name(&self) -> &str {
        job_names::RESTORE
    }

    fn default_params(&self) -> Value {
        to_params_value(&RestoreParams::default())
    }

    fn bind(&mut self, raw: &Value) -> Result<(), ActuatorError> {
        let params: RestoreParams = parse_params(self.name(), raw)?;
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

        let source = Path::new(&params.source);
        if !source.exists() {
            return Err(ActuatorError::execution(
                self.name(),
                format!("backup source {} does not exist", source.display()),
            ));
        }

        let instance_dir = ctx.data_dir().join(params.port.to_string());
        tokio::fs::create_dir_all(&instance_dir).await?;

        let mut files = 0usize;
        if source.is_dir() {
            let mut entries = tokio::fs::read_dir(source).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.is_file() {
                    tokio::fs::copy(&path, instance_dir.join(entry.file_name())).await?;
                    files += 1;
                }
            }
        } else {
            let name = source
                .file_name()
                .map(|n| n.to_owned())
                .unwrap_or_else(|| "restored.dump".into());
            tokio::fs::copy(source, instance_dir.join(name)).await?;
            files = 1;
        }

        info!(
            port = params.port,
            source = %source.display(),
            files,
            "restore completed"
        );
        Ok(())
    }
}
