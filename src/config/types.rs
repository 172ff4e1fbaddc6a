//! Core configuration types
//!
//! This module defines the data structures that represent a strata.yml task file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level task file structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Application name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Application usage description (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Top-level tasks
    #[serde(default)]
    pub tasks: BTreeMap<String, Task>,

    /// Interpreter used for scripts (e.g., ["sh", "-c"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,
}

/// A task definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Task {
    /// Usage description for help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Longer description for help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether this task is private (hidden from help)
    #[serde(default)]
    pub private: bool,

    /// Declared inputs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<Input>,

    /// Script to run; a list of lines is joined with newlines
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_script"
    )]
    pub script: Option<String>,

    /// Nested tasks, addressed as `<this task>.<name>`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tasks: BTreeMap<String, Task>,

    /// Include another file as task definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
}

/// An input declaration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Input {
    /// Input name; dots address a nested field
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Position in the task's positional arguments
    #[serde(
        rename = "argument-index",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub argument_index: Option<usize>,

    /// Declared type (string, integer, boolean); defaults to string
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,

    /// Default value; an input without one is required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_yaml::Value>,

    /// Any other keys become schema properties
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Custom deserializer for scripts that handles both a string and a list of lines
fn deserialize_script<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(Some(s)),
        Value::Sequence(seq) => {
            let mut lines = Vec::new();
            for item in seq {
                match item {
                    Value::String(line) => lines.push(line),
                    _ => return Err(D::Error::custom("script lines must be strings")),
                }
            }
            Ok(Some(lines.join("\n")))
        }
        Value::Null => Ok(None),
        _ => Err(D::Error::custom("script must be a string or array")),
    }
}
