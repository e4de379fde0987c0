//! Typed command parameters
//!
//! A [`Command`] is one named API operation with a validated, immutable
//! parameter set. Commands are assembled through [`CommandBuilder`] and
//! flattened into wire pairs by [`Command::to_query`].

use crate::error::{CosmicError, Result};
use crate::normalize::Normalizer;
use std::collections::BTreeMap;

/// Parameter names the transport adds itself
const RESERVED_PARAMS: &[&str] = &["command", "apikey", "signature", "response"];

/// A single typed parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<String>),
    Tags(BTreeMap<String, String>),
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl From<&String> for ParamValue {
    fn from(v: &String) -> Self {
        ParamValue::Str(v.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<u16> for ParamValue {
    fn from(v: u16) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        ParamValue::List(v)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(v: Vec<&str>) -> Self {
        ParamValue::List(v.into_iter().map(String::from).collect())
    }
}

impl From<BTreeMap<String, String>> for ParamValue {
    fn from(v: BTreeMap<String, String>) -> Self {
        ParamValue::Tags(v)
    }
}

impl ParamValue {
    /// Append the wire pairs for this value under `key`
    fn encode_into(&self, key: &str, out: &mut Vec<(String, String)>) {
        match self {
            ParamValue::Str(s) => out.push((key.to_string(), s.clone())),
            ParamValue::Int(i) => out.push((key.to_string(), i.to_string())),
            ParamValue::Bool(b) => out.push((key.to_string(), b.to_string())),
            ParamValue::List(items) => out.push((key.to_string(), items.join(","))),
            ParamValue::Tags(tags) => {
                for (i, (k, v)) in tags.iter().enumerate() {
                    out.push((format!("{}[{}].key", key, i), k.clone()));
                    out.push((format!("{}[{}].value", key, i), v.clone()));
                }
            }
        }
    }
}

/// One named API operation with its parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: String,
    params: BTreeMap<String, ParamValue>,
    normalizer: Normalizer,
}

impl Command {
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// Response fields this command's payloads need repaired
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Flatten into `(name, value)` wire pairs, in parameter-name order
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(self.params.len());
        for (key, value) in &self.params {
            value.encode_into(key, &mut out);
        }
        out
    }
}

/// Builder for [`Command`], validated on [`CommandBuilder::build`]
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    name: String,
    params: BTreeMap<String, ParamValue>,
    normalizer: Normalizer,
}

impl CommandBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
            normalizer: Normalizer::NONE,
        }
    }

    /// Set a parameter, replacing any previous value under the same name
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set a parameter only when a value is given
    pub fn param_opt<V: Into<ParamValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// Add all parameters of an existing map
    pub fn params(mut self, params: &BTreeMap<String, ParamValue>) -> Self {
        for (k, v) in params {
            self.params.insert(k.clone(), v.clone());
        }
        self
    }

    pub fn normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn build(self) -> Result<Command> {
        if self.name.trim().is_empty() {
            return Err(CosmicError::InvalidCommand(
                "command name must not be empty".to_string(),
            ));
        }
        if !self.name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CosmicError::InvalidCommand(format!(
                "command name '{}' must be alphanumeric",
                self.name
            )));
        }

        for key in self.params.keys() {
            validate_param_name(key)?;
        }

        Ok(Command {
            name: self.name,
            params: self.params,
            normalizer: self.normalizer,
        })
    }
}

fn validate_param_name(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CosmicError::InvalidCommand(
            "parameter name must not be empty".to_string(),
        ));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return Err(CosmicError::InvalidCommand(format!(
            "invalid parameter name '{}'",
            key
        )));
    }
    if RESERVED_PARAMS.contains(&key.to_ascii_lowercase().as_str()) {
        return Err(CosmicError::InvalidCommand(format!(
            "parameter name '{}' is reserved",
            key
        )));
    }
    Ok(())
}
