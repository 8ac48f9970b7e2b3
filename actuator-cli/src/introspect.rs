//! Introspection front-end: list and describe, never execute.

use actuator_core::{
    ActuatorError, ExecutionContext, JobManager, JobRegistry, PayloadFormat,
};

use crate::cli::DebugAction;

/// Run one introspection action against the registry.
///
/// List mode prints every registered name. Describe mode prints one job's
/// parameter representation: bound values when a payload scoped to that
/// job loads successfully, defaults when no payload was given. Neither
/// mode invokes any job's run.
pub fn run(
    action: &DebugAction,
    registry: JobRegistry,
    ctx: ExecutionContext,
    payload: Option<&str>,
    format: PayloadFormat,
) -> Result<(), ActuatorError> {
    match action {
        DebugAction::List => {
            for name in registry.names() {
                println!("{name}");
            }
            Ok(())
        }
        DebugAction::Param { job } => {
            let params = match payload {
                Some(raw) => {
                    // load restricted to this single job, then read back its
                    // bound parameters
                    let mut manager =
                        JobManager::new(ctx, registry, raw, format, Some(job))?;
                    manager.load_atom_jobs()?;
                    manager.job_params(job)?
                }
                None => registry.resolve(job)?.default_params(),
            };
            let rendered = serde_json::to_string_pretty(&params)
                .map_err(|e| ActuatorError::Config(format!("cannot render parameters: {e}")))?;
            println!("{rendered}");
            Ok(())
        }
    }
}
