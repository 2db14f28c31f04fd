//! Manifest and project settings
//!
//! This module handles parsing of stagehand.yml manifests, validation of
//! the task graph, and loading the JSON project files next to them.

pub mod parse;
pub mod project;
pub mod schema;
pub mod types;

// Re-export main types
pub use parse::*;
pub use project::*;
pub use schema::*;
pub use types::*;
