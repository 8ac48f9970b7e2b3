//! OS initialization job: prepare the directory layout.

use std::path::Path;

use actuator_core::{async_trait, ActuatorError, AtomJob, ExecutionContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::common::{parse_params, reject_violations, to_params_value};
use crate::job_names;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OsInitParams {
    /// Extra directories to create under the data dir, relative paths only.
    #[serde(default)]
    pub extra_dirs: Vec<String>,
}

impl OsInitParams {
    fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();
        for dir in &self.extra_dirs {
            if dir.is_empty() {
                violations.push("extra_dirs entries must not be empty".to_owned());
            } else if Path::new(dir).is_absolute() {
                violations.push(format!("extra_dirs entry {dir:?} must be relative"));
            } else if dir.split('/').any(|part| part == "..") {
                violations.push(format!("extra_dirs entry {dir:?} must not contain \"..\""));
            }
        }
        violations
    }
}

/// Creates the data and backup directories plus any requested extras.
#[derive(Debug, Default)]
pub struct OsInitJob {
    params: Option<OsInitParams>,
}

#[async_trait]
impl AtomJob for OsInitJob {
    fn name(&self) -> &str {
        job_names::OS_INIT
    }

    fn default_params(&self) -> Value {
        to_params_value(&OsInitParams::default())
    }

    fn bind(&mut self, raw: &Value) -> Result<(), ActuatorError> {
        let params: OsInitParams = parse_params(self.name(), raw)?;
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
        let params = self.params.take().unwrap_or_default();

        tokio::fs::create_dir_all(ctx.data_dir()).await?;
        tokio::fs::create_dir_all(ctx.backup_dir()).await?;
        for dir in &params.extra_dirs {
            tokio::fs::create_dir_all(ctx.data_dir().join(dir)).await?;
        }

        info!(
            data_dir = %ctx.data_dir().display(),
            backup_dir = %ctx.backup_dir().display(),
            extra_dirs = params.extra_dirs.len(),
            "directory layout prepared"
        );
        Ok(())
    }
}
