//! CLI interface and argument parsing
//!
//! Builds the command tree from the task file, sets up logging and runs the
//! selected task.

pub mod app;
pub mod logging;

pub use app::*;
pub use logging::*;
