//! Error types for Stagehand

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Stagehand operations
pub type Result<T> = std::result::Result<T, StagehandError>;

/// Main error type for Stagehand
#[derive(Error, Debug)]
pub enum StagehandError {
    /// Environment selection errors from the push/update composer
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Manifest and project settings errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Variable interpolation errors
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Environment resolution failures.
///
/// Raised when a push or update would otherwise deploy to nowhere.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("No environment specified to {command}. Pass a target or one of --development, --staging, --production")]
    NoEnvironment { command: String },

    #[error("Unknown environment '{0}' (expected development, staging or production)")]
    UnknownEnvironment(String),
}

/// Manifest parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Task '{0}' is not defined")]
    TaskNotFound(String),

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Task name '{0}' is reserved for the built-in environment pipeline")]
    ReservedTaskName(String),

    #[error("Failed to read project file '{path}': {error}")]
    Settings { path: PathBuf, error: String },
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command failed with exit code {0:?}")]
    CommandFailed(Option<i32>),

    #[error("Failed to start '{command}': {error}")]
    Spawn { command: String, error: String },

    #[error("Task '{0}' is already running (recursive invocation)")]
    RecursiveTask(String),

    #[error("Invalid variable '{name}': {error}")]
    InvalidVar { name: String, error: String },
}

/// Variable interpolation errors
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("Recursive interpolation detected")]
    RecursiveInterpolation,
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;

/// Specialized result type for the push/update composer
pub type ComposeResult<T> = std::result::Result<T, ConfigurationError>;
