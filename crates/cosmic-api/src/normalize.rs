//! Backward-compatibility repair of response payloads
//!
//! Older API versions serialize some numeric fields as quoted strings
//! (`"startport": "80"`). A [`Normalizer`] rewrites those fields as numbers
//! before the payload is decoded into typed structs.

use crate::error::{CosmicError, Result};
use serde_json::{Map, Value};

/// The set of fields to repair for one family of commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    /// Key under which list responses carry their entities
    pub list_key: Option<&'static str>,

    /// Fields that must be integers
    pub fields: &'static [&'static str],
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::NONE
    }
}

impl Normalizer {
    /// Leaves every payload untouched
    pub const NONE: Normalizer = Normalizer {
        list_key: None,
        fields: &[],
    };

    pub const FIREWALL: Normalizer = Normalizer {
        list_key: Some("firewallrule"),
        fields: &["endport", "startport"],
    };

    pub const EGRESS_FIREWALL: Normalizer = Normalizer {
        list_key: Some("firewallrule"),
        fields: &["endport", "startport"],
    };

    pub const PORT_FORWARD: Normalizer = Normalizer {
        list_key: Some("portforwardingrule"),
        fields: &["privateport", "privateendport", "publicport", "publicendport"],
    };

    /// Job status responses
    pub const JOB: Normalizer = Normalizer {
        list_key: None,
        fields: &["jobstatus", "jobresultcode"],
    };

    pub const fn new(list_key: Option<&'static str>, fields: &'static [&'static str]) -> Self {
        Self { list_key, fields }
    }

    /// Repair raw JSON bytes
    pub fn normalize(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let value: Value = serde_json::from_slice(raw)?;
        let value = self.normalize_value(value)?;
        Ok(serde_json::to_vec(&value)?)
    }

    /// Repair an already decoded payload
    pub fn normalize_value(&self, mut value: Value) -> Result<Value> {
        if self.fields.is_empty() {
            return Ok(value);
        }

        let Some(object) = value.as_object_mut() else {
            return Ok(value);
        };

        let list_key = self
            .list_key
            .filter(|key| object.get(*key).is_some_and(Value::is_array));

        match list_key {
            Some(key) => {
                if let Some(Value::Array(items)) = object.get_mut(key) {
                    for item in items.iter_mut() {
                        if let Some(entity) = item.as_object_mut() {
                            self.repair_fields(entity)?;
                        }
                    }
                }
            }
            None => self.repair_fields(object)?,
        }

        Ok(value)
    }

    fn repair_fields(&self, object: &mut Map<String, Value>) -> Result<()> {
        for field in self.fields {
            let Some(Value::String(s)) = object.get(*field) else {
                continue;
            };
            let parsed: i64 = s.trim().parse().map_err(|_| {
                CosmicError::Decode(format!(
                    "field '{}' has non-integer value '{}'",
                    field, s
                ))
            })?;
            object.insert((*field).to_string(), Value::from(parsed));
        }
        Ok(())
    }
}
