//! Backup job: archive an instance via the selected strategy.

use std::path::PathBuf;

use actuator_core::{async_trait, ActuatorError, AtomJob, ExecutionContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::common::{parse_params, port_in_range, reject_violations, to_params_value};
use crate::job_names;
use crate::strategy::backup_executor;

fn default_kind() -> String {
    "logical".to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupParams {
    /// Port of the instance to back up.
    #[serde(default)]
    pub port: u16,
    /// Backup kind: "logical" or "physical".
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Use the system dump tool for logical backups.
    #[serde(default)]
    pub use_system_tool: bool,
    /// Target directory; the context backup dir when absent.
    #[serde(default)]
    pub target: Option<String>,
}

impl Default for BackupParams {
    fn default() -> Self {
        Self {
            port: 0,
            kind: default_kind(),
            use_system_tool: false,
            target: None,
        }
    }
}

impl BackupParams {
    fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if !port_in_range(self.port) {
            violations.push(format!("port {} must be greater than 1024", self.port));
        }
        match self.kind.to_ascii_lowercase().as_str() {
            "logical" => {}
            "physical" => {
                if self.use_system_tool {
                    violations
                        .push("use_system_tool only applies to logical backups".to_owned());
                }
            }
            other => violations.push(format!(
                "kind {other:?} must be \"logical\" or \"physical\""
            )),
        }
        violations
    }
}

/// Archives one instance directory into the backup dir.
#[derive(Debug, Default)]
pub struct BackupJob {
    params: Option<BackupParams>,
}

#[async_trait]
impl AtomJob for BackupJob {
    fn name(&self) -> &str {
        job_names::BACKUP
    }

    fn default_params(&self) -> Value {
        to_params_value(&BackupParams::default())
    }

    fn bind(&mut self, raw: &Value) -> Result<(), ActuatorError> {
        let params: BackupParams = parse_params(self.name(), raw)?;
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

        let source = ctx.data_dir().join(params.port.to_string());
        if !source.is_dir() {
            return Err(ActuatorError::execution(
                self.name(),
                format!("no instance installed on port {}", params.port),
            ));
        }
        let target_root = params
            .target
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| ctx.backup_dir().to_path_buf());

        let executor = backup_executor(&params.kind, params.use_system_tool)?;
        let report = executor.execute(&source, &target_root).await?;

        info!(
            port = params.port,
            method = report.method,
            files = report.files,
            bytes = report.bytes,
            target = %report.target.display(),
            "backup completed"
        );
        Ok(())
    }
}
