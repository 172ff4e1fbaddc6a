//! Task files and configuration values
//!
//! This module handles parsing of strata.yml task files, their validation,
//! and the hierarchical configuration store inputs are looked up in.

pub mod parse;
pub mod schema;
pub mod store;
pub mod types;

// Re-export main types
pub use parse::*;
pub use schema::*;
pub use store::*;
pub use types::*;
