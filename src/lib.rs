//! Stagehand - a YAML-based build and deploy task runner
//!
//! Tasks are declared in a `stagehand.yml` manifest and delegate their work to
//! external tools through shell commands. The built-in `push` and `update`
//! pipelines compose per-environment deploy steps from the development,
//! staging and production flags.

// Public modules
pub mod cli;
pub mod compose;
pub mod config;
pub mod error;
pub mod logging;
pub mod runner;

// Re-export commonly used types
pub use compose::{compose_push_tasks, compose_update_tasks, Environment, EnvironmentFlags};
pub use error::{ConfigurationError, Result, StagehandError};

/// Current version of Stagehand
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
