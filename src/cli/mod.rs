//! CLI interface and argument parsing
//!
//! This module builds the command line from the manifest, resolves the
//! environment flags and hands the requested tasks to the runner.

pub mod app;

// Re-export main types
pub use app::*;
