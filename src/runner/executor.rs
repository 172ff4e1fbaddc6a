//! Task body execution
//!
//! The invoker never runs task bodies itself; it hands the validated inputs
//! to an [`Executor`]. [`ShellExecutor`] runs script bodies through a shell.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::interpolate;
use crate::task::{FlatInputs, TaskBody, TaskDefinition};
use std::env;
use std::path::PathBuf;
use std::process::{Command as StdCommand, Stdio};
use tracing::debug;

/// Runs a task body with its bound inputs and returns its textual output
pub trait Executor {
    fn run(&self, task: &TaskDefinition, inputs: &FlatInputs) -> ExecutionResult<String>;
}

/// Runs script bodies through an interpreter such as `sh -c`
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    /// Interpreter and its leading arguments
    pub interpreter: Vec<String>,

    /// Directory scripts run in
    pub working_dir: PathBuf,
}

impl ShellExecutor {
    pub fn new() -> Self {
        ShellExecutor {
            interpreter: vec!["sh".to_string(), "-c".to_string()],
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for ShellExecutor {
    fn run(&self, task: &TaskDefinition, inputs: &FlatInputs) -> ExecutionResult<String> {
        let script = match &task.body {
            TaskBody::Empty => return Ok(String::new()),
            TaskBody::Script(script) => script,
        };

        let exec_str = interpolate(script, inputs)?;

        let (program, args) = self
            .interpreter
            .split_first()
            .ok_or(ExecutionError::EmptyInterpreter)?;

        debug!(task = %task.name, script = %exec_str, "running script");

        let mut command = StdCommand::new(program);
        command.args(args);
        command.arg(&exec_str);
        command.current_dir(&self.working_dir);

        command.stdin(Stdio::inherit());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::inherit());

        for (key, value) in inputs {
            command.env(env_var_name(key), value.to_string());
        }

        let output = command.output().map_err(|e| ExecutionError::Spawn {
            program: program.clone(),
            error: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(ExecutionError::CommandFailed(output.status.code()));
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| ExecutionError::InvalidOutput)?;
        Ok(stdout.trim_end_matches(['\n', '\r']).to_string())
    }
}

/// Environment variable name for an input path: `db.host` becomes `DB_HOST`
pub fn env_var_name(path: &str) -> String {
    path.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskName, Value};

    fn task(script: &str) -> TaskDefinition {
        TaskDefinition::new(TaskName::parse("test").unwrap()).with_script(script)
    }

    #[test]
    fn test_run_captures_output() {
        let executor = ShellExecutor::new();
        let output = executor.run(&task("echo test"), &FlatInputs::new()).unwrap();
        assert_eq!(output, "test");
    }

    #[test]
    fn test_run_interpolates_inputs() {
        let mut inputs = FlatInputs::new();
        inputs.insert("name".to_string(), Value::from("world"));
        inputs.insert("db.port".to_string(), Value::Int(5432));

        let executor = ShellExecutor::new();
        let output = executor
            .run(&task("echo ${name} ${db.port}"), &inputs)
            .unwrap();
        assert_eq!(output, "world 5432");
    }

    #[test]
    fn test_run_exports_inputs() {
        let mut inputs = FlatInputs::new();
        inputs.insert("db.host".to_string(), Value::from("localhost"));

        let executor = ShellExecutor::new();
        let output = executor.run(&task("echo $DB_HOST"), &inputs).unwrap();
        assert_eq!(output, "localhost");
    }

    #[test]
    fn test_run_failing_command() {
        let executor = ShellExecutor::new();
        let result = executor.run(&task("exit 3"), &FlatInputs::new());
        assert!(matches!(result, Err(ExecutionError::CommandFailed(Some(3)))));
    }

    #[test]
    fn test_empty_body_produces_no_output() {
        let executor = ShellExecutor::new();
        let definition = TaskDefinition::new(TaskName::parse("group").unwrap());
        assert_eq!(executor.run(&definition, &FlatInputs::new()).unwrap(), "");
    }

    #[test]
    fn test_empty_interpreter() {
        let executor = ShellExecutor::new().with_interpreter(vec![]);
        let result = executor.run(&task("echo hi"), &FlatInputs::new());
        assert!(matches!(result, Err(ExecutionError::EmptyInterpreter)));
    }

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name("db.host"), "DB_HOST");
        assert_eq!(env_var_name("region"), "REGION");
        assert_eq!(env_var_name("my-input"), "MY_INPUT");
    }
}
