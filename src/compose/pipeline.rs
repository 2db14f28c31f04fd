//! Push and update task composition

use crate::compose::{Environment, EnvironmentFlags};
use crate::error::{ComposeResult, ConfigurationError};

/// Ordered task names to execute in sequence
pub type TaskList = Vec<String>;

/// Task every push starts with
pub const DEPLOY_TASK: &str = "deploy";

/// Name of the built-in push composite
pub const PUSH_TASK: &str = "push";

/// Name of the built-in update composite
pub const UPDATE_TASK: &str = "update";

/// Shell task that pushes the build artifact to `env`'s remote builder
pub fn push_shell_task(env: Environment) -> String {
    format!("shell:push{}", env.task_suffix())
}

/// Shell task that triggers a remote update check on `env`
pub fn update_shell_task(env: Environment) -> String {
    format!("shell:update{}", env.task_suffix())
}

/// Push composite scoped to a single environment
pub fn scoped_push_task(env: Environment) -> String {
    format!("{}:{}", PUSH_TASK, env.name())
}

/// Compose the task list for `push`.
///
/// `["deploy"]` followed by one `shell:push<Env>` per active environment.
pub fn compose_push_tasks(
    flags: &EnvironmentFlags,
    target: Option<Environment>,
) -> ComposeResult<TaskList> {
    let active = flags.active(target);
    if active.is_empty() {
        return Err(ConfigurationError::NoEnvironment {
            command: PUSH_TASK.to_string(),
        });
    }

    let mut tasks = vec![DEPLOY_TASK.to_string()];
    tasks.extend(active.into_iter().map(push_shell_task));
    Ok(tasks)
}

/// Compose the task list for `update`.
///
/// For each active environment: a push scoped to it, then its update trigger.
pub fn compose_update_tasks(
    flags: &EnvironmentFlags,
    target: Option<Environment>,
) -> ComposeResult<TaskList> {
    let active = flags.active(target);
    if active.is_empty() {
        return Err(ConfigurationError::NoEnvironment {
            command: UPDATE_TASK.to_string(),
        });
    }

    Ok(active
        .into_iter()
        .flat_map(|env| [scoped_push_task(env), update_shell_task(env)])
        .collect())
}

/// A built-in composite task reference such as `push` or `update:staging`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Push(Option<Environment>),
    Update(Option<Environment>),
}

impl Builtin {
    /// Recognize a built-in task name.
    ///
    /// Returns `Ok(None)` for names that are not built-ins and an error for
    /// a built-in scoped to an unknown environment.
    pub fn parse(name: &str) -> ComposeResult<Option<Self>> {
        let (base, target) = match name.split_once(':') {
            Some((base, target)) => (base, Some(target)),
            None => (name, None),
        };

        let target = match base {
            PUSH_TASK | UPDATE_TASK => target.map(str::parse::<Environment>).transpose()?,
            _ => return Ok(None),
        };

        Ok(Some(if base == PUSH_TASK {
            Builtin::Push(target)
        } else {
            Builtin::Update(target)
        }))
    }

    /// Whether `name` is reserved for a built-in composite
    pub fn is_reserved(name: &str) -> bool {
        let base = name.split_once(':').map_or(name, |(base, _)| base);
        base == PUSH_TASK || base == UPDATE_TASK
    }

    /// Expand into the task list this built-in stands for
    pub fn compose(&self, flags: &EnvironmentFlags) -> ComposeResult<TaskList> {
        match *self {
            Builtin::Push(target) => compose_push_tasks(flags, target),
            Builtin::Update(target) => compose_update_tasks(flags, target),
        }
    }
}
