//! Task invocation engine
//!
//! This module resolves task inputs, validates them and hands them to an
//! executor, recursing into other tasks when an input needs their output.

pub mod context;
pub mod executor;
pub mod interpolate;
pub mod invoker;
pub mod resolver;

// Re-export main types
pub use context::*;
pub use executor::*;
pub use interpolate::*;
pub use invoker::*;
pub use resolver::*;
