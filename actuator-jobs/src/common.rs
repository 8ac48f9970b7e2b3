//! Shared helpers for job parameter handling.

use actuator_core::ActuatorError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize raw parameters into a typed struct, naming the job on
/// failure.
pub(crate) fn parse_params<T: DeserializeOwned>(job: &str, raw: &Value) -> Result<T, ActuatorError> {
    serde_json::from_value(raw.clone())
        .map_err(|e| ActuatorError::validation(job, format!("malformed parameters: {e}")))
}

/// Turn a gathered violation list into the single most actionable error.
///
/// The first violation (field declaration order) is reported; the count of
/// further issues is appended so the operator knows one fix may not be
/// enough.
pub(crate) fn reject_violations(job: &str, violations: Vec<String>) -> Result<(), ActuatorError> {
    match violations.split_first() {
        None => Ok(()),
        Some((first, [])) => Err(ActuatorError::validation(job, first.clone())),
        Some((first, rest)) => Err(ActuatorError::validation(
            job,
            format!("{first} ({} more issue(s) found)", rest.len()),
        )),
    }
}

/// Serialize typed parameters back into the bind representation.
pub(crate) fn to_params_value<T: serde::Serialize>(params: &T) -> Value {
    serde_json::to_value(params).unwrap_or(Value::Null)
}

pub(crate) fn port_in_range(port: u16) -> bool {
    port > 1024
}
