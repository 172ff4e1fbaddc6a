//! Task inputs and scalar values
//!
//! This module defines the declared inputs of a task, the closed set of
//! scalar values an input can hold, and the coercion rules between them.

use crate::error::{Result, StrataError};
use std::collections::BTreeMap;
use std::fmt;

/// A typed scalar value bound to an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
}

impl Value {
    /// Name of the runtime type, as used in input declarations
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Int(_) => "integer",
            Value::Bool(_) => "boolean",
        }
    }

}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Supported input types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    String,
    Integer,
    Boolean,
}

impl InputType {
    /// Look up a declared type name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(InputType::String),
            "integer" => Some(InputType::Integer),
            "boolean" => Some(InputType::Boolean),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InputType::String => "string",
            InputType::Integer => "integer",
            InputType::Boolean => "boolean",
        }
    }

    /// Whether a value already has this type
    pub fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (InputType::String, Value::String(_))
                | (InputType::Integer, Value::Int(_))
                | (InputType::Boolean, Value::Bool(_))
        )
    }
}

/// Convert a raw value to the declared type of `input`
///
/// Values that already have the declared type pass through untouched. Any
/// other value is rendered as text and parsed: integers as decimal, booleans
/// only from the exact literals `true` and `false`.
pub fn coerce(input: &str, raw: &Value, declared: &str) -> Result<Value> {
    let target = InputType::from_name(declared).ok_or_else(|| StrataError::UnsupportedInputType {
        input: input.to_string(),
        type_name: declared.to_string(),
    })?;

    if target.matches(raw) {
        return Ok(raw.clone());
    }

    let text = raw.to_string();
    let failed = || StrataError::TypeCoercion {
        input: input.to_string(),
        raw: text.clone(),
        target: target.name().to_string(),
    };

    match target {
        InputType::String => Ok(Value::String(text.clone())),
        InputType::Integer => text.parse::<i64>().map(Value::Int).map_err(|_| failed()),
        InputType::Boolean => match text.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(failed()),
        },
    }
}

/// A declared input of a task
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSpec {
    /// Input name; dots address a nested field
    pub name: String,

    /// Declared type name; `None` means string
    pub type_name: Option<String>,

    /// Index into the positional arguments
    pub argument_index: Option<usize>,

    pub default: Option<Value>,

    pub description: Option<String>,

    /// Additional schema properties (`enum`, `minimum`, `pattern`, ...)
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl InputSpec {
    pub fn new(name: impl Into<String>) -> Self {
        InputSpec {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_argument_index(mut self, index: usize) -> Self {
        self.argument_index = Some(index);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_yaml::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// An input is required exactly when it has no default
    pub fn required(&self) -> bool {
        self.default.is_none()
    }

    pub fn type_name(&self) -> &str {
        self.type_name.as_deref().unwrap_or("string")
    }

    /// The name as written in the task declaration
    pub fn short_name(&self) -> &str {
        &self.name
    }

    /// Path components of the (possibly nested) input name
    pub fn path(&self) -> Vec<String> {
        self.name.split('.').map(str::to_string).collect()
    }

    /// Coerce a raw value to this input's declared type
    pub fn coerce(&self, raw: &Value) -> Result<Value> {
        coerce(&self.name, raw, self.type_name())
    }
}

/// Command-line option for an input name: `db.host` becomes `db-host`
pub fn option_name(name: &str) -> String {
    name.replace('.', "-")
}
