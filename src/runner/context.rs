//! Per-run state
//!
//! A [`RunContext`] lives for exactly one top-level task invocation. It holds
//! the output cache shared by every sub-task resolved during that run and the
//! stack of tasks currently being invoked.

use crate::error::{Result, StrataError};
use crate::task::TaskName;
use std::collections::HashMap;

/// Sub-task outputs keyed by the input path they were computed for
///
/// Entries are write-once: a path that already holds an output is never
/// overwritten, so each dependency runs at most once per run.
#[derive(Debug, Clone, Default)]
pub struct OutputCache {
    outputs: HashMap<Vec<String>, String>,
}

impl OutputCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &[String]) -> Option<&str> {
        self.outputs.get(path).map(String::as_str)
    }

    /// Store an output; returns `false` if the path was already cached
    pub fn insert(&mut self, path: &[String], output: String) -> bool {
        if self.outputs.contains_key(path) {
            return false;
        }
        self.outputs.insert(path.to_vec(), output);
        true
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// State shared across one top-level run
#[derive(Debug, Default)]
pub struct RunContext {
    /// Outputs of sub-tasks run to satisfy inputs
    pub cache: OutputCache,

    /// Tasks being invoked, outermost first
    task_stack: Vec<TaskName>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a task onto the invocation stack, failing if it is already there
    pub fn push_task(&mut self, task: &TaskName) -> Result<()> {
        if self.is_task_in_stack(task) {
            let cycle: Vec<String> = self
                .task_stack
                .iter()
                .skip_while(|t| *t != task)
                .chain(std::iter::once(task))
                .map(ToString::to_string)
                .collect();
            return Err(StrataError::CircularDependency(cycle.join(" -> ")));
        }
        self.task_stack.push(task.clone());
        Ok(())
    }

    /// Pop a task from the invocation stack
    pub fn pop_task(&mut self) -> Option<TaskName> {
        self.task_stack.pop()
    }

    pub fn is_task_in_stack(&self, task: &TaskName) -> bool {
        self.task_stack.iter().any(|t| t == task)
    }

    pub fn depth(&self) -> usize {
        self.task_stack.len()
    }
}
