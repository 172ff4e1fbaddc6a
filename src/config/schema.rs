//! Task file validation
//!
//! Checks that can be made before anything runs: well-formed task names,
//! unique inputs, options and argument positions, supported types and
//! defaults that fit their declared type.

use crate::config::store::scalar_from_yaml;
use crate::config::types::{Config, Input, Task};
use crate::error::{ConfigError, ConfigResult};
use crate::task::{coerce, option_name, InputType};
use std::collections::HashSet;

/// Validate a complete task file
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    for (name, task) in &config.tasks {
        validate_segment(name, name)?;
        validate_task(name, task)?;
    }
    Ok(())
}

/// Task keys are single, non-empty name segments
fn validate_segment(path: &str, segment: &str) -> ConfigResult<()> {
    if segment.is_empty() || segment.contains('.') {
        return Err(ConfigError::InvalidTaskName(path.to_string()));
    }
    Ok(())
}

/// Validate a task and its nested tasks; `path` is the fully-qualified name
pub fn validate_task(path: &str, task: &Task) -> ConfigResult<()> {
    let mut names = HashSet::new();
    let mut indices = HashSet::new();
    let mut options = HashSet::new();
    for input in &task.inputs {
        if !names.insert(input.name.as_str()) {
            return Err(ConfigError::DuplicateInput {
                task: path.to_string(),
                input: input.name.clone(),
            });
        }
        let option = option_name(&input.name);
        if !options.insert(option.clone()) {
            return Err(ConfigError::DuplicateOption {
                task: path.to_string(),
                option,
            });
        }
        if let Some(index) = input.argument_index {
            if !indices.insert(index) {
                return Err(ConfigError::DuplicateArgumentIndex {
                    task: path.to_string(),
                    index,
                });
            }
        }
        validate_input(path, input)?;
    }

    for (child_name, child) in &task.tasks {
        let child_path = format!("{}.{}", path, child_name);
        validate_segment(&child_path, child_name)?;
        validate_task(&child_path, child)?;
    }

    Ok(())
}

/// Validate an input's name, type and default
fn validate_input(task: &str, input: &Input) -> ConfigResult<()> {
    if input.name.is_empty() || input.name.split('.').any(str::is_empty) {
        return Err(ConfigError::Invalid(format!(
            "Task '{}' declares an input with invalid name '{}'",
            task, input.name
        )));
    }

    let type_name = input.input_type.as_deref().unwrap_or("string");
    if InputType::from_name(type_name).is_none() {
        return Err(ConfigError::InvalidInputType {
            task: task.to_string(),
            input: input.name.clone(),
            type_name: type_name.to_string(),
        });
    }

    if let Some(default) = &input.default {
        let value = scalar_from_yaml(default).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "Default of input '{}' in task '{}' must be a scalar",
                input.name, task
            ))
        })?;
        coerce(&input.name, &value, type_name).map_err(|e| {
            ConfigError::Invalid(format!("Default of input '{}' in task '{}': {}", input.name, task, e))
        })?;
    }

    Ok(())
}
