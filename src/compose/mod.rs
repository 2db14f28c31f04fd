//! Environment target selection and push/update task composition
//!
//! Turns a set of environment flags and an optional explicit target into the
//! ordered list of task names that ships a build to those environments.

pub mod environment;
pub mod pipeline;

// Re-export main types
pub use environment::*;
pub use pipeline::*;
