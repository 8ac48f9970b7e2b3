//! Install job: lay down an instance directory and render its config.

use actuator_core::{async_trait, ActuatorError, AtomJob, ExecutionContext};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::common::{parse_params, port_in_range, reject_violations, to_params_value};
use crate::job_names;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallParams {
    /// Software version to install, digits and dots (e.g. "4.2.1").
    #[serde(default)]
    pub version: String,
    /// Instance port; doubles as the instance directory name.
    #[serde(default)]
    pub port: u16,
    /// Replica set this instance will join, if any.
    #[serde(default)]
    pub set_name: Option<String>,
    /// Extra key/value pairs rendered into the instance config.
    #[serde(default)]
    pub conf: Map<String, Value>,
}

impl InstallParams {
    fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if self.version.is_empty() {
            violations.push("version is required".to_owned());
        } else if !self
            .version
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.')
        {
            violations.push(format!(
                "version {:?} must contain only digits and dots",
                self.version
            ));
        }
        if !port_in_range(self.port) {
            violations.push(format!("port {} must be greater than 1024", self.port));
        }
        if let Some(set_name) = &self.set_name {
            if set_name.is_empty() {
                violations.push("set_name must not be empty when given".to_owned());
            }
        }
        if self.conf.keys().any(|k| k.is_empty()) {
            violations.push("conf keys must not be empty".to_owned());
        }
        violations
    }
}

/// Creates the instance directory under the data dir and renders
/// `instance.conf`. Installing over an existing instance fails.
#[derive(Debug, Default)]
pub struct InstallJob {
    params: Option<InstallParams>,
}

#[async_trait]
impl AtomJob for InstallJob {
    fn name(&self) -> &str {
        job_names::INSTALL
    }

    fn default_params(&self) -> Value {
        to_params_value(&InstallParams::default())
    }

    fn bind(&mut self, raw: &Value) -> Result<(), ActuatorError> {
        let params: InstallParams = parse_params(self.name(), raw)?;
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
        let conf_path = instance_dir.join("instance.conf");
        if conf_path.exists() {
            return Err(ActuatorError::execution(
                self.name(),
                format!("instance on port {} is already installed", params.port),
            ));
        }

        tokio::fs::create_dir_all(instance_dir.join("db")).await?;
        tokio::fs::create_dir_all(instance_dir.join("log")).await?;

        let mut conf = String::new();
        conf.push_str(&format!("port={}\n", params.port));
        conf.push_str(&format!("version={}\n", params.version));
        if let Some(set_name) = &params.set_name {
            conf.push_str(&format!("set_name={set_name}\n"));
        }
        for (key, value) in &params.conf {
            conf.push_str(&format!("{key}={value}\n"));
        }
        tokio::fs::write(&conf_path, conf).await?;

        info!(
            port = params.port,
            version = %params.version,
            instance_dir = %instance_dir.display(),
            "instance installed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use serde_json::json;

    fn ctx(root: &Path) -> ExecutionContext {
        ExecutionContext::new(
            "u",
            "r",
            "n",
            "v",
            root,
            root.join("data"),
            root.join("backup"),
        )
    }

    #[tokio::test]
    async fn installs_instance() {
        let tmp = tempfile::tempdir().unwrap();
        let mut job = InstallJob::default();
        job.bind(&json!({
            "version": "4.2.1",
            "port": 27017,
            "set_name": "rs0",
            "conf": {"oplog_size_mb": 1024}
        }))
        .unwrap();
        job.run(&ctx(tmp.path())).await.unwrap();

        let conf =
            std::fs::read_to_string(tmp.path().join("data/27017/instance.conf")).unwrap();
        assert!(conf.contains("port=27017"));
        assert!(conf.contains("version=4.2.1"));
        assert!(conf.contains("set_name=rs0"));
        assert!(conf.contains("oplog_size_mb=1024"));
        assert!(tmp.path().join("data/27017/db").is_dir());
    }

    #[tokio::test]
    async fn reinstall_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let params = json!({"version": "4.2.1", "port": 27017});

        let mut first = InstallJob::default();
        first.bind(&params).unwrap();
        first.run(&ctx(tmp.path())).await.unwrap();

        let mut second = InstallJob::default();
        second.bind(&params).unwrap();
        let err = second.run(&ctx(tmp.path())).await.unwrap_err();
        assert!(matches!(err, ActuatorError::Execution { .. }));
        assert!(err.to_string().contains("already installed"));
    }

    #[test]
    fn validation_reports_most_actionable_error_first() {
        let mut job = InstallJob::default();
        // both version and port are wrong; version is reported, the rest counted
        let err = job.bind(&json!({"port": 80})).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("version is required"), "got: {msg}");
        assert!(msg.contains("more issue(s)"), "got: {msg}");
    }

    #[test]
    fn rejects_non_numeric_version() {
        let mut job = InstallJob::default();
        let err = job
            .bind(&json!({"version": "v4.2-beta", "port": 27017}))
            .unwrap_err();
        assert!(matches!(err, ActuatorError::Validation { .. }));
    }

    #[test]
    fn params_round_trip() {
        let raw = json!({"version": "4.2.1", "port": 27017, "conf": {"a": 1}});
        let mut job = InstallJob::default();
        job.bind(&raw).unwrap();

        let mut fresh = InstallJob::default();
        fresh.bind(&job.params()).unwrap();
        assert_eq!(fresh.params(), job.params());
    }
}
