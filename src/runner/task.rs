//! Task execution types and logic
//!
//! This module contains the runtime representation of tasks and the runner
//! that resolves task names, including the built-in push/update pipelines.

use crate::compose::Builtin;
use crate::config;
use crate::error::{ConfigError, ExecutionError, Result};
use crate::runner::{evaluate_when_list, execute_command, Context};
use std::collections::BTreeMap;
use std::time::Instant;

/// Runtime task representation
#[derive(Debug, Clone)]
pub struct Task {
    /// Task name
    pub name: String,

    /// Usage description
    pub usage: Option<String>,

    /// Longer description
    pub description: Option<String>,

    /// Whether this task is private
    pub private: bool,

    /// Whether this task should run quietly
    pub quiet: bool,

    /// Run items to execute
    pub run: Vec<Run>,

    /// Finally block
    pub finally: Vec<Run>,
}

impl Task {
    /// Create a new task from configuration
    pub fn from_config(name: String, config: config::Task) -> Self {
        Task {
            name,
            usage: config.usage,
            description: config.description,
            private: config.private,
            quiet: config.quiet,
            run: config.run.into_iter().map(Run::from_config).collect(),
            finally: config.finally.into_iter().map(Run::from_config).collect(),
        }
    }

    /// Execute the task; subtasks are resolved through `runner`
    pub fn execute(&self, runner: &Runner, ctx: &mut Context) -> Result<()> {
        let result = self.execute_items(&self.run, runner, ctx);

        if !self.finally.is_empty() {
            tracing::debug!("Running finally block of '{}'", self.name);
            let finally = self.execute_items(&self.finally, runner, ctx);
            // A run failure wins over a finally failure
            if result.is_ok() {
                return finally;
            }
        }

        result
    }

    fn execute_items(&self, items: &[Run], runner: &Runner, ctx: &mut Context) -> Result<()> {
        for run in items {
            self.execute_run_item(run, runner, ctx)?;
        }
        Ok(())
    }

    /// Execute a single run item
    fn execute_run_item(&self, run: &Run, runner: &Runner, ctx: &mut Context) -> Result<()> {
        if !run.when.is_empty() && !evaluate_when_list(&run.when, ctx)? {
            tracing::debug!("Skipping run item in '{}': condition not met", self.name);
            return Ok(());
        }

        for cmd in &run.commands {
            execute_command(cmd, ctx, self.quiet)?;
        }

        for subtask in &run.subtasks {
            runner.run_task(subtask, ctx)?;
        }

        for (key, value) in &run.set_environment {
            match value {
                Some(val) => {
                    let interpolated = ctx.interpolate(val)?;
                    ctx.set_var(key.clone(), interpolated);
                }
                None => ctx.unset_var(key),
            }
        }

        Ok(())
    }
}

/// Resolves task names and runs them in order, failing fast
#[derive(Debug, Clone, Default)]
pub struct Runner {
    tasks: BTreeMap<String, Task>,
}

impl Runner {
    /// Build the runner from a validated manifest
    pub fn from_config(config: &config::Config) -> Self {
        Runner {
            tasks: config
                .tasks
                .iter()
                .map(|(name, task)| (name.clone(), Task::from_config(name.clone(), task.clone())))
                .collect(),
        }
    }

    /// Look up a manifest task
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// Whether `name` can be run (manifest task or built-in)
    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name) || matches!(Builtin::parse(name), Ok(Some(_)))
    }

    /// Run each task in sequence, stopping at the first failure
    pub fn run_all<S: AsRef<str>>(&self, names: &[S], ctx: &mut Context) -> Result<()> {
        for name in names {
            self.run_task(name.as_ref(), ctx)?;
        }
        Ok(())
    }

    /// Run a task by name
    pub fn run_task(&self, name: &str, ctx: &mut Context) -> Result<()> {
        if ctx.is_task_in_stack(name) {
            return Err(ExecutionError::RecursiveTask(name.to_string()).into());
        }

        // Resolve before touching the stack so lookup errors leave it clean
        let target = match Builtin::parse(name)? {
            Some(builtin) => Target::Composite(builtin.compose(&ctx.environments)?),
            None => Target::Manifest(
                self.tasks
                    .get(name)
                    .ok_or_else(|| ConfigError::TaskNotFound(name.to_string()))?,
            ),
        };

        tracing::info!("Running task: {}", name);
        let started = Instant::now();
        ctx.push_task(name.to_string());

        let result = match target {
            Target::Composite(tasks) => {
                tracing::debug!("{} expands to: {}", name, tasks.join(", "));
                self.run_all(&tasks, ctx)
            }
            Target::Manifest(task) => task.execute(self, ctx),
        };

        ctx.pop_task();
        match &result {
            Ok(()) => {
                ctx.timings.record(name, started.elapsed());
                tracing::debug!("Task completed: {}", name);
            }
            // Nested frames only log at debug; the outermost one reports
            Err(e) if ctx.task_stack.is_empty() => {
                tracing::error!("Task '{}' failed: {}", name, e)
            }
            Err(e) => tracing::debug!("Task '{}' failed: {}", name, e),
        }

        result
    }

    /// Manifest tasks that should appear in help, in name order
    pub fn public_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values().filter(|task| !task.private)
    }
}

enum Target<'a> {
    Composite(Vec<String>),
    Manifest(&'a Task),
}

/// Runtime representation of a run item
#[derive(Debug, Clone)]
pub struct Run {
    /// Conditions that must be met
    pub when: Vec<When>,

    /// Commands to execute
    pub commands: Vec<Command>,

    /// Subtasks to execute
    pub subtasks: Vec<String>,

    /// Variables to set (None unsets)
    pub set_environment: BTreeMap<String, Option<String>>,
}

impl Run {
    /// Create from config
    pub fn from_config(config: config::Run) -> Self {
        match config {
            config::Run::SimpleCommand(cmd) => Run {
                when: Vec::new(),
                commands: vec![Command::Simple(cmd)],
                subtasks: Vec::new(),
                set_environment: BTreeMap::new(),
            },
            config::Run::Complex(item) => Run {
                when: item.when.into_iter().flat_map(When::from_config).collect(),
                commands: item.command.into_iter().map(Command::from_config).collect(),
                subtasks: item.task,
                set_environment: item.set_environment,
            },
        }
    }
}

/// Runtime representation of a command
#[derive(Debug, Clone)]
pub enum Command {
    /// Simple command string
    Simple(String),

    /// Complex command with options
    Complex {
        exec: String,
        print: String,
        quiet: bool,
        dir: Option<String>,
    },
}

impl Command {
    /// Create from config
    pub fn from_config(config: config::Command) -> Self {
        match config {
            config::Command::Simple(cmd) => Command::Simple(cmd),
            config::Command::Complex(detail) => Command::Complex {
                print: detail.print.unwrap_or_else(|| detail.exec.clone()),
                exec: detail.exec,
                quiet: detail.quiet,
                dir: detail.dir,
            },
        }
    }

    /// Get the command to execute
    pub fn exec(&self) -> &str {
        match self {
            Command::Simple(cmd) => cmd,
            Command::Complex { exec, .. } => exec,
        }
    }

    /// Get what to print
    pub fn print(&self) -> &str {
        match self {
            Command::Simple(cmd) => cmd,
            Command::Complex { print, .. } => print,
        }
    }

    /// Check if this command is quiet
    pub fn is_quiet(&self) -> bool {
        match self {
            Command::Simple(_) => false,
            Command::Complex { quiet, .. } => *quiet,
        }
    }

    /// Get the working directory
    pub fn dir(&self) -> Option<&str> {
        match self {
            Command::Simple(_) => None,
            Command::Complex { dir, .. } => dir.as_deref(),
        }
    }
}

/// Runtime representation of a when condition
#[derive(Debug, Clone)]
pub struct When {
    pub condition: WhenCondition,
}

impl When {
    /// One condition per key set in the config map; all of them must hold
    pub fn from_config(config: config::When) -> Vec<When> {
        let mut conditions = Vec::new();

        if let Some(eq) = config.equal {
            conditions.push(WhenCondition::Equal {
                left: eq.left,
                right: eq.right,
            });
        }
        if let Some(ne) = config.not_equal {
            conditions.push(WhenCondition::NotEqual {
                left: ne.left,
                right: ne.right,
            });
        }
        if let Some(cmd) = config.command {
            conditions.push(WhenCondition::Command(cmd));
        }
        if let Some(path) = config.exists {
            conditions.push(WhenCondition::Exists(path));
        }
        if let Some(path) = config.not_exists {
            conditions.push(WhenCondition::NotExists(path));
        }
        if let Some(var) = config.env_set {
            conditions.push(WhenCondition::EnvSet(var));
        }
        if let Some(var) = config.env_not_set {
            conditions.push(WhenCondition::EnvNotSet(var));
        }

        conditions
            .into_iter()
            .map(|condition| When { condition })
            .collect()
    }
}

/// Types of when conditions
#[derive(Debug, Clone)]
pub enum WhenCondition {
    Equal { left: String, right: String },
    NotEqual { left: String, right: String },
    Command(String),
    Exists(String),
    NotExists(String),
    EnvSet(String),
    EnvNotSet(String),
}
