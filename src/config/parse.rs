//! Task file parsing and discovery

use crate::config::store::scalar_from_yaml;
use crate::config::types::{Config, Input, Task};
use crate::error::{ConfigError, ConfigResult, StrataError};
use crate::task::{InputSpec, TaskDefinition, TaskName, TaskRegistry};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default task file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["strata.yml", "strata.yaml"];

/// Find the task file by searching current and parent directories
pub fn find_config_file() -> ConfigResult<PathBuf> {
    find_config_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the task file starting from a specific directory
pub fn find_config_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in CONFIG_FILE_NAMES {
            let config_path = current_dir.join(file_name);
            searched_paths.push(config_path.display().to_string());

            if config_path.is_file() {
                return Ok(config_path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse a task file from a path
pub fn parse_config_file(path: &Path) -> Result<Config, StrataError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    parse_config(&contents, Some(path))
}

/// Parse a task file from a string
pub fn parse_config(yaml: &str, config_path: Option<&Path>) -> Result<Config, StrataError> {
    let mut config: Config = serde_yaml::from_str(yaml)?;

    if let Some(path) = config_path {
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        for task in config.tasks.values_mut() {
            process_includes(task, base_dir)?;
        }
    }

    Ok(config)
}

/// Replace tasks that `include` another file with that file's content
fn process_includes(task: &mut Task, base_dir: &Path) -> Result<(), StrataError> {
    if let Some(include_path) = &task.include {
        let full_path = base_dir.join(include_path);
        *task = load_included_task(&full_path)?;
    }

    for child in task.tasks.values_mut() {
        process_includes(child, base_dir)?;
    }

    Ok(())
}

/// Load a task from an included file
fn load_included_task(path: &Path) -> Result<Task, StrataError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    let task: Task = serde_yaml::from_str(&contents).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    Ok(task)
}

/// Parse the task file with automatic discovery
pub fn parse_config_auto() -> Result<(Config, PathBuf), StrataError> {
    let config_path = find_config_file()?;
    let config = parse_config_file(&config_path)?;
    Ok((config, config_path))
}

/// Flatten the nested task tree into a registry of fully-qualified names
pub fn build_registry(config: &Config) -> ConfigResult<TaskRegistry> {
    let mut registry = TaskRegistry::new();
    for (name, task) in &config.tasks {
        register_task(&mut registry, TaskName::parse(name)?, task)?;
    }
    Ok(registry)
}

fn register_task(registry: &mut TaskRegistry, name: TaskName, task: &Task) -> ConfigResult<()> {
    let mut definition = TaskDefinition::new(name.clone());
    definition.usage = task.usage.clone();
    definition.description = task.description.clone();
    definition.private = task.private;
    definition.inputs = task.inputs.iter().map(input_spec).collect();
    if let Some(script) = &task.script {
        definition = definition.with_script(script.clone());
    }
    registry.insert(definition)?;

    for (child_name, child) in &task.tasks {
        register_task(registry, name.join(child_name)?, child)?;
    }
    Ok(())
}

fn input_spec(input: &Input) -> InputSpec {
    InputSpec {
        name: input.name.clone(),
        type_name: input.input_type.clone(),
        argument_index: input.argument_index,
        default: input.default.as_ref().and_then(scalar_from_yaml),
        description: input.description.clone(),
        extra: input.extra.clone(),
    }
}
