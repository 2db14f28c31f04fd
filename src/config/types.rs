//! Core configuration types
//!
//! This module defines the data structures that represent a stagehand.yml manifest.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level manifest structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Application name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Application usage description (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Global interpreter to use for commands (e.g., ["sh", "-c"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,

    /// Where the project settings and dependency manifest live
    #[serde(default)]
    pub project: ProjectFiles,

    /// Global variables available to every task
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, String>,

    /// Tasks defined in the manifest
    #[serde(default)]
    pub tasks: BTreeMap<String, Task>,
}

/// Locations of the JSON project files, relative to the manifest
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectFiles {
    /// Project settings file
    #[serde(default = "default_settings_file")]
    pub settings: String,

    /// Dependency manifest holding the framework descriptor
    #[serde(default = "default_dependencies_file")]
    pub dependencies: String,

    /// Dependency whose version is exposed as `framework.version`
    #[serde(default = "default_framework")]
    pub framework: String,

    /// Index file used when the project does not declare its own
    #[serde(default = "default_index")]
    pub index: String,
}

impl Default for ProjectFiles {
    fn default() -> Self {
        ProjectFiles {
            settings: default_settings_file(),
            dependencies: default_dependencies_file(),
            framework: default_framework(),
            index: default_index(),
        }
    }
}

fn default_settings_file() -> String {
    "project.settings.json".to_string()
}

fn default_dependencies_file() -> String {
    "bower.json".to_string()
}

fn default_framework() -> String {
    "vivoom-chaps".to_string()
}

fn default_index() -> String {
    "bower_components/vivoom-chaps/app/index.html".to_string()
}

/// A task definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Task {
    /// Usage description for help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Longer description for help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether this task is private (hidden from help)
    #[serde(default)]
    pub private: bool,

    /// Whether this task should run quietly
    #[serde(default)]
    pub quiet: bool,

    /// Run items to execute
    #[serde(default, deserialize_with = "deserialize_run_items")]
    pub run: Vec<Run>,

    /// Finally block - always executes, even on error
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_run_items"
    )]
    pub finally: Vec<Run>,
}

/// A run item - can be a command, subtask, or environment setter
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Run {
    /// Simple string command
    SimpleCommand(String),

    /// Complex run item with conditionals and multiple actions
    Complex(RunItem),
}

/// A complex run item with conditions and actions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunItem {
    /// Conditions that must be met for this run item to execute
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub when: Vec<When>,

    /// Commands to execute
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_commands"
    )]
    pub command: Vec<Command>,

    /// Subtasks to execute, by name
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_subtasks"
    )]
    pub task: Vec<String>,

    /// Environment variables to set (null unsets)
    #[serde(
        rename = "set-environment",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub set_environment: BTreeMap<String, Option<String>>,
}

/// A command to execute
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Command {
    /// Simple string command
    Simple(String),

    /// Complex command with additional options
    Complex(CommandDetail),
}

/// Detailed command specification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandDetail {
    /// The command to execute
    pub exec: String,

    /// What to print when running (defaults to exec)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print: Option<String>,

    /// Whether to suppress the command echo
    #[serde(default)]
    pub quiet: bool,

    /// Working directory for the command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

/// A conditional expression
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct When {
    /// Check if values are equal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equal: Option<WhenComparison>,

    /// Check if values are not equal
    #[serde(rename = "not-equal", skip_serializing_if = "Option::is_none")]
    pub not_equal: Option<WhenComparison>,

    /// Check if a command succeeds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Check if a path exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exists: Option<String>,

    /// Check if a path does not exist
    #[serde(rename = "not-exists", skip_serializing_if = "Option::is_none")]
    pub not_exists: Option<String>,

    /// Check if environment variable is set
    #[serde(rename = "env-set", skip_serializing_if = "Option::is_none")]
    pub env_set: Option<String>,

    /// Check if environment variable is not set
    #[serde(rename = "env-not-set", skip_serializing_if = "Option::is_none")]
    pub env_not_set: Option<String>,
}

impl When {
    /// Whether no condition key is set
    pub fn is_empty(&self) -> bool {
        self.equal.is_none()
            && self.not_equal.is_none()
            && self.command.is_none()
            && self.exists.is_none()
            && self.not_exists.is_none()
            && self.env_set.is_none()
            && self.env_not_set.is_none()
    }
}

/// A comparison for when conditions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhenComparison {
    /// Left-hand side of comparison
    pub left: String,

    /// Right-hand side of comparison
    pub right: String,
}

/// Custom deserializer for run items that handles both single values and arrays
fn deserialize_run_items<'de, D>(deserializer: D) -> Result<Vec<Run>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(vec![Run::SimpleCommand(s)]),
        Value::Mapping(_) => {
            let run = Run::deserialize(value).map_err(D::Error::custom)?;
            Ok(vec![run])
        }
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|item| Run::deserialize(item).map_err(D::Error::custom))
            .collect(),
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("run must be a string, object, or array")),
    }
}

/// Custom deserializer for commands that handles both single values and arrays
fn deserialize_commands<'de, D>(deserializer: D) -> Result<Vec<Command>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(vec![Command::Simple(s)]),
        Value::Mapping(_) => {
            let cmd = Command::deserialize(value).map_err(D::Error::custom)?;
            Ok(vec![cmd])
        }
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|item| Command::deserialize(item).map_err(D::Error::custom))
            .collect(),
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("command must be a string, object, or array")),
    }
}

/// Custom deserializer for subtask names that handles both single values and arrays
fn deserialize_subtasks<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(vec![s]),
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                _ => Err(D::Error::custom("task names must be strings")),
            })
            .collect(),
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("task must be a string or array of strings")),
    }
}
