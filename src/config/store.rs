//! Hierarchical configuration values
//!
//! The resolver reads configuration through the [`ConfigStore`] trait so the
//! store is passed explicitly rather than living in a global. Keys are dotted
//! strings such as `deploy.region`.

use crate::error::{ConfigError, ConfigResult, Result};
use crate::task::Value;
use serde_yaml::Value as Yaml;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read-only key/value source consulted during input resolution
pub trait ConfigStore {
    /// Scalar value for a dotted key, if present
    fn get(&self, key: &str) -> Option<Value>;
}

/// Convert a YAML scalar into a value
///
/// Integers and booleans keep their type, other numbers become text.
/// Null, sequences and mappings are not scalars.
pub fn scalar_from_yaml(yaml: &Yaml) -> Option<Value> {
    match yaml {
        Yaml::String(s) => Some(Value::String(s.clone())),
        Yaml::Bool(b) => Some(Value::Bool(*b)),
        Yaml::Number(n) => Some(match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::String(n.to_string()),
        }),
        Yaml::Tagged(tagged) => scalar_from_yaml(&tagged.value),
        Yaml::Null | Yaml::Sequence(_) | Yaml::Mapping(_) => None,
    }
}

/// Flat store, for programmatic use
#[derive(Debug, Clone, Default)]
pub struct MapConfigStore {
    values: BTreeMap<String, Value>,
}

impl MapConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }
}

impl ConfigStore for MapConfigStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }
}

/// YAML document layered under command-line overrides
#[derive(Debug, Clone, Default)]
pub struct YamlConfigStore {
    root: Yaml,
    flags: BTreeMap<String, String>,
}

impl YamlConfigStore {
    pub fn new() -> Self {
        YamlConfigStore {
            root: Yaml::Mapping(Default::default()),
            flags: BTreeMap::new(),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let root: Yaml = serde_yaml::from_str(yaml)?;
        Ok(YamlConfigStore {
            root,
            flags: BTreeMap::new(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Add an override that takes precedence over the document
    pub fn with_flag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.flags.insert(key.into(), value.into());
        self
    }

    /// Add a `KEY=VALUE` override
    pub fn with_override(self, assignment: &str) -> ConfigResult<Self> {
        let (key, value) = assignment
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| ConfigError::InvalidOverride(assignment.to_string()))?;
        Ok(self.with_flag(key, value))
    }

    /// The nested scope under a dotted key
    pub fn sub(&self, key: &str) -> Option<YamlConfigStore> {
        let node = self.node(key)?;
        node.is_mapping().then(|| YamlConfigStore {
            root: node.clone(),
            flags: BTreeMap::new(),
        })
    }

    fn node(&self, key: &str) -> Option<&Yaml> {
        key.split('.')
            .try_fold(&self.root, |node, segment| node.as_mapping()?.get(segment))
    }
}

impl ConfigStore for YamlConfigStore {
    fn get(&self, key: &str) -> Option<Value> {
        if let Some(flag) = self.flags.get(key) {
            if flag.is_empty() {
                return None;
            }
            debug!(key, value = %flag, "config value from flag");
            return Some(Value::String(flag.clone()));
        }

        let value = match key.rsplit_once('.') {
            Some((scope, leaf)) => {
                let scope = self.sub(scope)?;
                scope.root.as_mapping()?.get(leaf).and_then(scalar_from_yaml)
            }
            None => self.root.as_mapping()?.get(key).and_then(scalar_from_yaml),
        };

        if let Some(value) = &value {
            debug!(key, %value, "config value from document");
        }
        value
    }
}
