//! Task execution engine
//!
//! This module handles the execution of tasks, including command running,
//! conditional logic, and expansion of the push/update pipelines.

pub mod command;
pub mod context;
pub mod interpolate;
pub mod task;
pub mod timing;
pub mod when;

// Re-export main types
pub use command::*;
pub use context::*;
pub use interpolate::*;
pub use task::*;
pub use timing::*;
pub use when::*;
