//! Manifest validation
//!
//! Checks task references and the shape of the task graph before anything runs.

use crate::compose::{
    push_shell_task, scoped_push_task, update_shell_task, Builtin, Environment, DEPLOY_TASK,
};
use crate::config::types::{Config, Run, Task, When};
use crate::error::{ConfigError, ConfigResult, StagehandError};
use std::collections::HashSet;

/// CLI subcommand that runs tasks by name, private ones included
pub const RUN_COMMAND: &str = "run";

/// CLI subcommand that prints shell completions
pub const COMPLETION_COMMAND: &str = "completion";

/// Validate a complete manifest
pub fn validate_config(config: &Config) -> Result<(), StagehandError> {
    if let Some(interpreter) = &config.interpreter {
        if interpreter.is_empty() {
            return Err(ConfigError::Invalid("interpreter must not be empty".to_string()).into());
        }
    }

    for (name, task) in &config.tasks {
        validate_task(config, name, task)?;
    }

    detect_circular_task_dependencies(config)?;

    Ok(())
}

/// Validate a single task
pub fn validate_task(config: &Config, name: &str, task: &Task) -> Result<(), StagehandError> {
    if Builtin::is_reserved(name) || name == RUN_COMMAND || name == COMPLETION_COMMAND {
        return Err(ConfigError::ReservedTaskName(name.to_string()).into());
    }

    let empty_when = task
        .run
        .iter()
        .chain(task.finally.iter())
        .any(|run| matches!(run, Run::Complex(item) if item.when.iter().any(When::is_empty)));
    if empty_when {
        return Err(ConfigError::Invalid(format!(
            "Task '{}' has a when condition with no keys",
            name
        ))
        .into());
    }

    for subtask in subtask_names(task) {
        // Built-ins are resolved at run time; only the environment is checked here
        if Builtin::parse(subtask)?.is_some() {
            continue;
        }
        if !config.tasks.contains_key(subtask) {
            return Err(ConfigError::TaskNotFound(subtask.to_string()).into());
        }
    }

    Ok(())
}

/// Names of every subtask referenced from a task's run and finally blocks
pub fn subtask_names(task: &Task) -> impl Iterator<Item = &str> {
    task.run
        .iter()
        .chain(task.finally.iter())
        .filter_map(|run| match run {
            Run::SimpleCommand(_) => None,
            Run::Complex(item) => Some(item.task.iter().map(String::as_str)),
        })
        .flatten()
}

/// Detect circular dependencies between manifest tasks.
///
/// Built-in composites are expanded to the tasks they can reach so that a
/// manifest task calling `push` from inside `deploy` is caught here.
fn detect_circular_task_dependencies(config: &Config) -> ConfigResult<()> {
    let mut visited = HashSet::new();
    for task_name in config.tasks.keys() {
        let mut stack = Vec::new();
        check_task_cycle(config, task_name, &mut visited, &mut stack)?;
    }
    Ok(())
}

/// Recursively check for cycles in task dependencies
fn check_task_cycle(
    config: &Config,
    task_name: &str,
    visited: &mut HashSet<String>,
    stack: &mut Vec<String>,
) -> ConfigResult<()> {
    if stack.iter().any(|t| t == task_name) {
        stack.push(task_name.to_string());
        return Err(ConfigError::CircularDependency(stack.join(" -> ")));
    }

    if visited.contains(task_name) {
        return Ok(());
    }

    stack.push(task_name.to_string());

    for next in reachable_from(config, task_name) {
        check_task_cycle(config, &next, visited, stack)?;
    }

    stack.pop();
    visited.insert(task_name.to_string());

    Ok(())
}

/// Tasks directly reachable from `task_name`, with built-ins expanded
fn reachable_from(config: &Config, task_name: &str) -> Vec<String> {
    match Builtin::parse(task_name) {
        Ok(Some(builtin)) => builtin_edges(config, builtin),
        // Unknown environments were rejected by validate_task
        Err(_) => Vec::new(),
        Ok(None) => config
            .tasks
            .get(task_name)
            .map(|task| subtask_names(task).map(str::to_string).collect())
            .unwrap_or_default(),
    }
}

/// Every task a built-in can expand to, regardless of which flags are set
fn builtin_edges(config: &Config, builtin: Builtin) -> Vec<String> {
    let targets: Vec<Environment> = match builtin {
        Builtin::Push(Some(env)) | Builtin::Update(Some(env)) => vec![env],
        Builtin::Push(None) | Builtin::Update(None) => Environment::ALL.to_vec(),
    };

    let mut edges = Vec::new();
    for env in targets {
        let names = match builtin {
            Builtin::Push(_) => vec![DEPLOY_TASK.to_string(), push_shell_task(env)],
            Builtin::Update(_) => vec![scoped_push_task(env), update_shell_task(env)],
        };
        edges.extend(names);
    }
    edges.retain(|name| Builtin::is_reserved(name) || config.tasks.contains_key(name));
    edges.dedup();
    edges
}
