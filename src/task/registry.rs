//! Task definitions and the registry they are looked up in

use crate::error::{ConfigError, ConfigResult, Result, StrataError};
use crate::task::{InputSpec, TaskName};
use std::collections::BTreeMap;

/// What the executor runs for a task
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TaskBody {
    /// Namespace-only task; produces empty output
    #[default]
    Empty,

    /// Shell script run through the interpreter
    Script(String),
}

/// A registered task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDefinition {
    pub name: TaskName,
    pub usage: Option<String>,
    pub description: Option<String>,
    pub private: bool,
    pub inputs: Vec<InputSpec>,
    pub body: TaskBody,
}

impl TaskDefinition {
    pub fn new(name: TaskName) -> Self {
        TaskDefinition {
            name,
            usage: None,
            description: None,
            private: false,
            inputs: Vec::new(),
            body: TaskBody::Empty,
        }
    }

    pub fn with_input(mut self, input: InputSpec) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.body = TaskBody::Script(script.into());
        self
    }

    pub fn input(&self, name: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|i| i.name == name)
    }
}

/// Lookup table from fully-qualified name to definition
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskName, TaskDefinition>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition; each fully-qualified name may appear once
    pub fn insert(&mut self, task: TaskDefinition) -> ConfigResult<()> {
        if self.tasks.contains_key(&task.name) {
            return Err(ConfigError::DuplicateTask(task.name.to_string()));
        }
        self.tasks.insert(task.name.clone(), task);
        Ok(())
    }

    pub fn with_task(mut self, task: TaskDefinition) -> ConfigResult<Self> {
        self.insert(task)?;
        Ok(self)
    }

    pub fn find(&self, name: &TaskName) -> Result<&TaskDefinition> {
        self.tasks
            .get(name)
            .ok_or_else(|| StrataError::TaskNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &TaskName) -> bool {
        self.tasks.contains_key(name)
    }

    /// Direct children of `parent`, or top-level tasks when `parent` is `None`
    pub fn children<'a>(
        &'a self,
        parent: Option<&'a TaskName>,
    ) -> impl Iterator<Item = &'a TaskDefinition> + 'a {
        self.tasks
            .values()
            .filter(move |t| t.name.parent().as_ref() == parent)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
