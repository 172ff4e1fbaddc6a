//! Task invocation
//!
//! An invocation moves through `ResolvingInputs -> Validating -> Executing ->
//! Completed`. An error in any state ends the invocation; it is annotated
//! with the task name and returned to the caller.

use crate::config::ConfigStore;
use crate::error::{Result, StrataError};
use crate::runner::{Executor, InputResolver, RunContext, SubtaskRunner};
use crate::task::{
    ArgumentSet, BoundInputs, FlatInputs, InputSchema, TaskName, TaskRegistry, Value,
};
use tracing::{debug, debug_span, info};

/// Run variable holding the positional arguments, space separated
pub const ARGS_VARIABLE: &str = "args";
/// Run variable holding the selected environment name
pub const ENV_VARIABLE: &str = "env";
/// Run variable holding the path the program was invoked as
pub const CMD_VARIABLE: &str = "cmd";

enum State {
    ResolvingInputs,
    Validating(BoundInputs),
    Executing(FlatInputs),
    Completed(String),
}

/// Resolves, validates and executes tasks
pub struct TaskInvoker<'a> {
    registry: &'a TaskRegistry,
    config: &'a dyn ConfigStore,
    executor: &'a dyn Executor,
    environment: String,
    command_path: String,
}

impl<'a> TaskInvoker<'a> {
    pub fn new(
        registry: &'a TaskRegistry,
        config: &'a dyn ConfigStore,
        executor: &'a dyn Executor,
    ) -> Self {
        TaskInvoker {
            registry,
            config,
            executor,
            environment: String::new(),
            command_path: String::new(),
        }
    }

    /// Environment name exposed to every task as `${env}`
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Program path exposed to every task as `${cmd}`
    pub fn with_command_path(mut self, command_path: impl Into<String>) -> Self {
        self.command_path = command_path.into();
        self
    }

    /// Variables every task sees in addition to its declared inputs
    fn run_variables(&self, positional: &[String]) -> FlatInputs {
        let mut vars = FlatInputs::new();
        vars.insert(ARGS_VARIABLE.to_string(), Value::String(positional.join(" ")));
        vars.insert(ENV_VARIABLE.to_string(), Value::String(self.environment.clone()));
        vars.insert(CMD_VARIABLE.to_string(), Value::String(self.command_path.clone()));
        vars
    }

    /// Run a task in a fresh run context
    ///
    /// Sub-tasks invoked to satisfy inputs share one output cache for the
    /// duration of this call and are run at most once each.
    pub fn run_task(
        &self,
        name: &TaskName,
        positional: &[String],
        explicit: &ArgumentSet,
        caller: Option<&TaskName>,
    ) -> Result<String> {
        let mut ctx = RunContext::new();
        self.invoke(&mut ctx, name, positional, explicit, caller)
    }

    /// Run a task within an existing run context
    pub fn invoke(
        &self,
        ctx: &mut RunContext,
        name: &TaskName,
        positional: &[String],
        explicit: &ArgumentSet,
        caller: Option<&TaskName>,
    ) -> Result<String> {
        let _span = debug_span!("task", name = %name).entered();

        if let Some(provided) = self.config.get(&name.to_string()) {
            info!(task = %name, value = %provided, "skipped task via provided value");
            return Ok(provided.to_string());
        }

        ctx.push_task(name).map_err(|e| e.in_task(name.to_string()))?;
        let result = self.run_states(ctx, name, positional, explicit, caller);
        ctx.pop_task();

        result.map_err(|e| e.in_task(name.to_string()))
    }

    fn run_states(
        &self,
        ctx: &mut RunContext,
        name: &TaskName,
        positional: &[String],
        explicit: &ArgumentSet,
        caller: Option<&TaskName>,
    ) -> Result<String> {
        let definition = self.registry.find(name)?;
        let resolver = InputResolver::new(self.registry, self.config);
        let mut state = State::ResolvingInputs;

        loop {
            state = match state {
                State::ResolvingInputs => {
                    debug!(task = %name, caller = ?caller.map(ToString::to_string), "resolving inputs");
                    let bound =
                        resolver.resolve_inherited(ctx, self, name, positional, explicit, caller)?;
                    State::Validating(bound)
                }
                State::Validating(bound) => {
                    // Declared inputs shadow run variables of the same name
                    let mut flat = self.run_variables(positional);
                    flat.extend(bound.flatten());
                    InputSchema::from_inputs(&definition.inputs)
                        .validate(&flat)
                        .map_err(StrataError::SchemaValidation)?;
                    debug!(task = %name, variables = ?flat, "bound variables");
                    State::Executing(flat)
                }
                State::Executing(flat) => {
                    let output = self.executor.run(definition, &flat)?;
                    debug!(task = %name, %output, "received output");
                    State::Completed(output)
                }
                State::Completed(output) => {
                    debug!(task = %name, "finished");
                    return Ok(output);
                }
            };
        }
    }
}

impl SubtaskRunner for TaskInvoker<'_> {
    fn run_subtask(
        &self,
        ctx: &mut RunContext,
        task: &TaskName,
        caller: &TaskName,
    ) -> Result<String> {
        self.invoke(ctx, task, &[], &ArgumentSet::new(), Some(caller))
    }
}
