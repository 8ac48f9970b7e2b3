//! Request payload decoding.
//!
//! A payload is a JSON object mapping atom job names to their raw parameter
//! objects, transported either base64-encoded or as raw JSON text. Decoding
//! is a pure function of its inputs and preserves the key order of the
//! incoming object, so an implicit execution list follows the payload.

use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Value};

use crate::error::ActuatorError;

/// Transport encoding of the request payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadFormat {
    #[default]
    Base64,
    Raw,
}

impl FromStr for PayloadFormat {
    type Err = ActuatorError;

    // The empty string selects the default encoding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "base64" => Ok(Self::Base64),
            "raw" => Ok(Self::Raw),
            other => Err(ActuatorError::Decode(format!(
                "unsupported payload format {other:?}, expected \"base64\" or \"raw\""
            ))),
        }
    }
}

impl std::fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Base64 => "base64",
            Self::Raw => "raw",
        })
    }
}

/// Decoded request payload: atom job name to raw parameter value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestPayload {
    entries: Map<String, Value>,
}

impl RequestPayload {
    /// Decode a payload blob.
    ///
    /// Fails with [`ActuatorError::Decode`] on a bad base64 wrapper,
    /// non-UTF-8 content, malformed JSON, or a top level that is not an
    /// object.
    pub fn decode(raw: &str, format: PayloadFormat) -> Result<Self, ActuatorError> {
        let text = match format {
            PayloadFormat::Base64 => {
                let bytes = STANDARD
                    .decode(raw.trim())
                    .map_err(|e| ActuatorError::Decode(format!("invalid base64: {e}")))?;
                String::from_utf8(bytes)
                    .map_err(|e| ActuatorError::Decode(format!("payload is not utf-8: {e}")))?
            }
            PayloadFormat::Raw => raw.to_owned(),
        };

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| ActuatorError::Decode(format!("malformed payload json: {e}")))?;
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(ActuatorError::Decode(format!(
                "payload top level must be an object mapping job names to parameters, got {}",
                type_name(&other)
            ))),
        }
    }

    /// Encode back into the base64 transport form.
    pub fn encode(&self) -> String {
        STANDARD.encode(Value::Object(self.entries.clone()).to_string())
    }

    /// Raw parameters for one job name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Job names in payload insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
