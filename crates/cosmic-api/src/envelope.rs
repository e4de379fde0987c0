//! Response envelope handling
//!
//! Every response body is wrapped in a single object keyed by the lowercased
//! command name (`{"createfirewallruleresponse": {...}}`). The unwrapped body
//! is either a terminal payload or carries a `jobid` for async completion.

use crate::error::{CosmicError, Result};
use serde_json::Value;

/// The unwrapped body of one API response
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    body: Value,
}

impl Envelope {
    /// Decode raw response bytes and strip the `<command>response` wrapper
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) if map.len() == 1 => {
                let body = map.into_iter().next().map(|(_, v)| v).unwrap_or_default();
                Ok(Self { body })
            }
            Value::Object(map) => Err(CosmicError::decode(format!(
                "expected a single response wrapper, found {} keys",
                map.len()
            ))),
            other => Err(CosmicError::decode(format!(
                "expected a response object, found {}",
                type_name(&other)
            ))),
        }
    }

    /// Job identifier, present while the command is still running server-side
    pub fn job_id(&self) -> Option<&str> {
        self.body
            .get("jobid")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_value(self) -> Value {
        self.body
    }
}

/// Strip a single-key object wrapper around an entity.
///
/// Job results arrive as `{"firewallrule": {...}}`; the inner object is the
/// payload. Anything else (multi-key objects, scalars, `{"success": true}`)
/// is returned as-is.
pub fn unwrap_entity(value: Value) -> Value {
    match value {
        Value::Object(map) if map.len() == 1 && map.values().all(Value::is_object) => map
            .into_iter()
            .next()
            .map(|(_, inner)| inner)
            .unwrap_or_default(),
        other => other,
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
