//! Task data model
//!
//! Names, declared inputs, typed values, bound value trees, the registry of
//! task definitions and the schema inputs are validated against.

pub mod bound;
pub mod input;
pub mod name;
pub mod registry;
pub mod schema;

// Re-export main types
pub use bound::*;
pub use input::*;
pub use name::*;
pub use registry::*;
pub use schema::*;
