//! Input resolution
//!
//! Every declared input of a task is bound by trying its sources in order:
//!
//! 1. an explicit argument with the input's name
//! 2. the positional argument at the input's `argument-index`
//! 3. config scoped under the calling task: `<caller>.<input>`
//! 4. config scoped under the task itself: `<task>.<input>`
//! 5. config at the top level: `<input>`
//! 6. the declared default
//! 7. an empty string, for an input named `env`
//! 8. the output of the task that provides the input, cached per run
//!
//! Sources 1 to 6 are coerced to the input's declared type.

use crate::config::ConfigStore;
use crate::error::{Result, StrataError};
use crate::runner::RunContext;
use crate::task::{ArgumentSet, BoundInputs, InputSpec, TaskName, TaskRegistry, Value};
use std::fmt;
use tracing::debug;

/// Runs a task on behalf of an input that needs its output
pub trait SubtaskRunner {
    fn run_subtask(&self, ctx: &mut RunContext, task: &TaskName, caller: &TaskName)
        -> Result<String>;
}

/// Where a bound value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Argument,
    Positional,
    CallerConfig,
    TaskConfig,
    GlobalConfig,
    Default,
    Env,
    Cache,
    Subtask,
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputSource::Argument => "argument",
            InputSource::Positional => "positional",
            InputSource::CallerConfig => "caller-config",
            InputSource::TaskConfig => "task-config",
            InputSource::GlobalConfig => "global-config",
            InputSource::Default => "default",
            InputSource::Env => "env",
            InputSource::Cache => "cache",
            InputSource::Subtask => "subtask",
        };
        write!(f, "{}", name)
    }
}

/// Binds task inputs from arguments, configuration, defaults and sub-tasks
pub struct InputResolver<'a> {
    registry: &'a TaskRegistry,
    config: &'a dyn ConfigStore,
}

impl<'a> InputResolver<'a> {
    pub fn new(registry: &'a TaskRegistry, config: &'a dyn ConfigStore) -> Self {
        InputResolver { registry, config }
    }

    /// Bind the inputs declared by `task` itself
    pub fn resolve_direct(
        &self,
        ctx: &mut RunContext,
        runner: &dyn SubtaskRunner,
        task: &TaskName,
        positional: &[String],
        explicit: &ArgumentSet,
        caller: Option<&TaskName>,
    ) -> Result<BoundInputs> {
        self.resolve(ctx, runner, task, positional, explicit, caller, false)
    }

    /// Bind the inputs of `task` and of every registered ancestor
    ///
    /// Values resolved for the task itself take precedence; each ancestor
    /// only fills paths that nothing closer to the task has bound.
    pub fn resolve_inherited(
        &self,
        ctx: &mut RunContext,
        runner: &dyn SubtaskRunner,
        task: &TaskName,
        positional: &[String],
        explicit: &ArgumentSet,
        caller: Option<&TaskName>,
    ) -> Result<BoundInputs> {
        let mut values = self.resolve_direct(ctx, runner, task, positional, explicit, caller)?;

        for ancestor in task.ancestry().skip(1) {
            if !self.registry.contains(&ancestor) {
                debug!(task = %task, ancestor = %ancestor, "ancestor is not a registered task");
                continue;
            }
            let inherited = self
                .resolve(ctx, runner, &ancestor, &[], explicit, caller, true)
                .map_err(|e| e.in_task(ancestor.to_string()))?;
            values.merge_under(inherited);
        }

        Ok(values)
    }

    /// The registered task that provides `input` for `task`
    ///
    /// Candidates are tried from the task's own scope outwards:
    /// `task.input`, `parent.input`, ..., `input`.
    pub fn dependency_for(&self, task: &TaskName, input: &InputSpec) -> Option<TaskName> {
        task.ancestry()
            .filter_map(|scope| scope.join(&input.name).ok())
            .chain(TaskName::parse(&input.name).ok())
            .filter(|candidate| candidate != task)
            .find(|candidate| self.registry.contains(candidate))
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve(
        &self,
        ctx: &mut RunContext,
        runner: &dyn SubtaskRunner,
        task: &TaskName,
        positional: &[String],
        explicit: &ArgumentSet,
        caller: Option<&TaskName>,
        inherited: bool,
    ) -> Result<BoundInputs> {
        let definition = self.registry.find(task)?;
        let mut values = BoundInputs::new();

        debug!(task = %task, caller = ?caller.map(ToString::to_string), "collecting inputs");

        for input in &definition.inputs {
            let path = input.path();

            if let Some((source, value)) = self.lookup(task, input, positional, explicit, caller)? {
                debug!(task = %task, input = %input.name, %source, %value, "bound input");
                values.set(&path, value);
                continue;
            }

            if let Some(cached) = ctx.cache.get(&path) {
                debug!(task = %task, input = %input.name, source = %InputSource::Cache, "bound input");
                values.set(&path, Value::String(cached.to_string()));
                continue;
            }

            let dependency = self.dependency_for(task, input).ok_or_else(|| {
                StrataError::MissingRequiredInput {
                    task: task.to_string(),
                    input: input.name.clone(),
                }
            })?;

            if inherited && ctx.is_task_in_stack(&dependency) {
                debug!(
                    task = %task,
                    input = %input.name,
                    dependency = %dependency,
                    "inherited input is being computed, leaving it unbound"
                );
                continue;
            }

            let output = runner
                .run_subtask(ctx, &dependency, task)
                .map_err(|e| StrataError::SubtaskExecution {
                    input: input.name.clone(),
                    task: dependency.to_string(),
                    source: Box::new(e),
                })?;

            debug!(task = %task, input = %input.name, source = %InputSource::Subtask, dependency = %dependency, "bound input");
            ctx.cache.insert(&path, output.clone());
            values.set(&path, Value::String(output));
        }

        Ok(values)
    }

    /// Sources 1 to 7, in order
    fn lookup(
        &self,
        task: &TaskName,
        input: &InputSpec,
        positional: &[String],
        explicit: &ArgumentSet,
        caller: Option<&TaskName>,
    ) -> Result<Option<(InputSource, Value)>> {
        let short_name = input.short_name();

        if let Some(value) = explicit.get(&input.name) {
            return Ok(Some((InputSource::Argument, input.coerce(value)?)));
        }

        if let Some(arg) = input.argument_index.and_then(|i| positional.get(i)) {
            let value = input.coerce(&Value::String(arg.clone()))?;
            return Ok(Some((InputSource::Positional, value)));
        }

        if let Some(caller) = caller {
            if let Some(value) = self.config.get(&format!("{}.{}", caller, short_name)) {
                return Ok(Some((InputSource::CallerConfig, input.coerce(&value)?)));
            }
        }

        // Any input whose name contains the task's short name skips its task scope
        let self_scoped = short_name.contains(task.short_name());
        if !self_scoped {
            if let Some(value) = self.config.get(&format!("{}.{}", task, short_name)) {
                return Ok(Some((InputSource::TaskConfig, input.coerce(&value)?)));
            }
        }

        if let Some(value) = self.config.get(short_name) {
            return Ok(Some((InputSource::GlobalConfig, input.coerce(&value)?)));
        }

        if let Some(default) = &input.default {
            return Ok(Some((InputSource::Default, input.coerce(default)?)));
        }

        if input.name == "env" {
            return Ok(Some((InputSource::Env, Value::String(String::new()))));
        }

        Ok(None)
    }
}
