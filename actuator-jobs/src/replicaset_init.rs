//! Replica set initialization job.

use actuator_core::{async_trait, ActuatorError, AtomJob, ExecutionContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::common::{parse_params, port_in_range, reject_violations, to_params_value};
use crate::job_names;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_priority")]
    pub priority: u32,
    #[serde(default)]
    pub arbiter: bool,
}

fn default_priority() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplicaSetInitParams {
    #[serde(default)]
    pub set_name: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl ReplicaSetInitParams {
    fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if self.set_name.is_empty() {
            violations.push("set_name is required".to_owned());
        }
        if self.members.is_empty() {
            violations.push("members must not be empty".to_owned());
        }
        let mut arbiters = 0usize;
        let mut electable = 0usize;
        for (i, member) in self.members.iter().enumerate() {
            if member.host.is_empty() {
                violations.push(format!("members[{i}].host is required"));
            }
            if !port_in_range(member.port) {
                violations.push(format!(
                    "members[{i}].port {} must be greater than 1024",
                    member.port
                ));
            }
            if member.arbiter {
                arbiters += 1;
            } else if member.priority > 0 {
                electable += 1;
            }
        }
        if arbiters > 1 {
            violations.push(format!("at most one arbiter is allowed, got {arbiters}"));
        }
        if !self.members.is_empty() && electable == 0 {
            violations.push("at least one non-arbiter member needs priority > 0".to_owned());
        }
        violations
    }
}

/// Writes the replica set manifest under the data dir. Initializing a set
/// that already has a manifest fails.
#[derive(Debug, Default)]
pub struct ReplicaSetInitJob {
    params: Option<ReplicaSetInitParams>,
}

#[async_trait]
impl AtomJob for ReplicaSetInitJob {
    fn name(&self) -> &str {
        job_names::REPLICASET_INIT
    }

    fn default_params(&self) -> Value {
        to_params_value(&ReplicaSetInitParams::default())
    }

    fn bind(&mut self, raw: &Value) -> Result<(), ActuatorError> {
        let params: ReplicaSetInitParams = parse_params(self.name(), raw)?;
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

        let manifest_path = ctx
            .data_dir()
            .join(format!("{}.replset.json", params.set_name));
        if manifest_path.exists() {
            return Err(ActuatorError::execution(
                self.name(),
                format!("replica set {} is already initialized", params.set_name),
            ));
        }

        tokio::fs::create_dir_all(ctx.data_dir()).await?;
        let manifest = serde_json::to_string_pretty(&params)
            .map_err(|e| ActuatorError::execution(self.name(), format!("manifest: {e}")))?;
        tokio::fs::write(&manifest_path, manifest).await?;

        info!(
            set_name = %params.set_name,
            members = params.members.len(),
            manifest = %manifest_path.display(),
            "replica set initialized"
        );
        Ok(())
    }
}
