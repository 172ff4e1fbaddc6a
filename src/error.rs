//! Error types for Strata

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Strata operations
pub type Result<T> = std::result::Result<T, StrataError>;

/// Main error type for Strata
///
/// Errors raised while resolving inputs are wrapped in [`StrataError::Task`]
/// at every invocation they unwind through, so the top-level caller sees the
/// whole path from the failing input back to the task it asked for.
#[derive(Error, Debug)]
pub enum StrataError {
    #[error("Task '{0}' is not defined")]
    TaskNotFound(String),

    #[error("Missing value for input '{input}' of task '{task}'. Please provide an option, a positional argument, a config value or a task for it")]
    MissingRequiredInput { task: String, input: String },

    #[error("Input '{input}': {raw:?} can't be converted to {target}")]
    TypeCoercion {
        input: String,
        raw: String,
        target: String,
    },

    #[error("Input '{input}': unsupported input type `{type_name}`. The type should be one of: string, integer, boolean")]
    UnsupportedInputType { input: String, type_name: String },

    #[error("One or more inputs are not valid: {}", FieldErrors(.0))]
    SchemaValidation(Vec<FieldError>),

    #[error("Input '{input}' depends on task '{task}', which failed: {source}")]
    SubtaskExecution {
        input: String,
        task: String,
        source: Box<StrataError>,
    },

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    /// Annotation added by each task invocation an error unwinds through
    #[error("task '{task}': {source}")]
    Task {
        task: String,
        source: Box<StrataError>,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl StrataError {
    /// Annotate this error with the task it unwound through
    pub fn in_task(self, task: impl Into<String>) -> Self {
        StrataError::Task {
            task: task.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping task annotations and sub-task wrappers
    pub fn root_cause(&self) -> &StrataError {
        match self {
            StrataError::Task { source, .. } | StrataError::SubtaskExecution { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Task names this error was annotated with, outermost first
    pub fn task_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        loop {
            match current {
                StrataError::Task { task, source } => {
                    path.push(task.as_str());
                    current = source;
                }
                StrataError::SubtaskExecution { source, .. } => current = source,
                _ => return path,
            }
        }
    }
}

/// A single schema violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Flattened (dotted) input path
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

struct FieldErrors<'a>(&'a [FieldError]);

impl fmt::Display for FieldErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

/// Task file and configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find task file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Task '{0}' is defined more than once")]
    DuplicateTask(String),

    #[error("Input '{input}' is declared more than once in task '{task}'")]
    DuplicateInput { task: String, input: String },

    #[error("Argument index {index} is used by more than one input of task '{task}'")]
    DuplicateArgumentIndex { task: String, index: usize },

    #[error("Inputs of task '{task}' share the command-line option '--{option}'")]
    DuplicateOption { task: String, option: String },

    #[error("Input '{input}' of task '{task}' has invalid type '{type_name}'. Must be one of: string, integer, boolean")]
    InvalidInputType {
        task: String,
        input: String,
        type_name: String,
    },

    #[error("Invalid task name '{0}'")]
    InvalidTaskName(String),

    #[error("Invalid override '{0}', expected KEY=VALUE")]
    InvalidOverride(String),

    #[error("Failed to read '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command failed with exit code {0:?}")]
    CommandFailed(Option<i32>),

    #[error("Failed to spawn '{program}': {error}")]
    Spawn { program: String, error: String },

    #[error("Interpreter is empty")]
    EmptyInterpreter,

    #[error("Command output is not valid UTF-8")]
    InvalidOutput,

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Variable interpolation errors
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("Invalid interpolation syntax: {0}")]
    InvalidSyntax(String),

    #[error("Recursive interpolation detected")]
    RecursiveInterpolation,
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;
