//! Strata - a declarative task runner with layered task inputs
//!
//! Tasks are declared in a YAML file and organized in a dot-separated
//! hierarchy. Every input a task declares is resolved from command-line
//! values, configuration, defaults or the output of another task, then
//! validated before the task body runs.

pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod task;

pub use error::{Result, StrataError};

/// Current version of Strata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
