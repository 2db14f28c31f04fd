//! Execution context for task running
//!
//! The context tracks all the state needed during task execution.

use crate::compose::EnvironmentFlags;
use crate::error::InterpolationResult;
use crate::runner::{ensure_resolved, interpolate_with, Timings};
use std::collections::{HashMap, HashSet};
use std::env;
use std::path::PathBuf;

/// Execution context that tracks state during task execution
pub struct Context {
    /// Directory commands run in (the manifest's directory)
    pub working_dir: PathBuf,

    /// Manifest file path
    pub config_path: Option<PathBuf>,

    /// Variables (project settings, manifest vars, --var, set-environment)
    pub vars: HashMap<String, String>,

    /// Variables unset at run time; hidden from the process environment too
    pub unset_vars: HashSet<String>,

    /// Interpreter commands are handed to (e.g., ["bash", "-c"])
    pub interpreter: Vec<String>,

    /// Stack of tasks being executed (for detecting recursion)
    pub task_stack: Vec<String>,

    /// Verbosity level
    pub verbosity: Verbosity,

    /// Print commands instead of running them
    pub dry_run: bool,

    /// Resolved environment flags for push/update
    pub environments: EnvironmentFlags,

    /// Elapsed time per executed task
    pub timings: Timings,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Context {
    /// Create a new context with default settings
    pub fn new() -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_path: None,
            vars: HashMap::new(),
            unset_vars: HashSet::new(),
            interpreter: vec!["sh".to_string(), "-c".to_string()],
            task_stack: Vec::new(),
            verbosity: Verbosity::Normal,
            dry_run: false,
            environments: EnvironmentFlags::from_cli(false, false, false),
            timings: Timings::default(),
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the manifest path; commands run from its directory
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.working_dir = dir.to_path_buf();
        }
        self.config_path = Some(path);
        self
    }

    /// Add variables, overriding existing values
    pub fn with_vars<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            self.set_var(key, value);
        }
        self
    }

    /// Set a single variable
    pub fn set_var(&mut self, key: String, value: String) {
        self.unset_vars.remove(&key);
        self.vars.insert(key, value);
    }

    /// Unset a variable, masking any process environment value of the same name
    pub fn unset_var(&mut self, key: &str) {
        self.vars.remove(key);
        self.unset_vars.insert(key.to_string());
    }

    /// Get a variable value
    pub fn get_var(&self, key: &str) -> Option<&String> {
        self.vars.get(key)
    }

    /// Resolve a name: context variables, then the process environment
    pub fn lookup_var(&self, name: &str) -> Option<String> {
        if let Some(value) = self.vars.get(name) {
            return Some(value.clone());
        }
        if self.unset_vars.contains(name) {
            return None;
        }
        env::var(name).ok()
    }

    /// Whether `name` resolves to a value
    pub fn is_var_set(&self, name: &str) -> bool {
        self.vars.contains_key(name)
            || (!self.unset_vars.contains(name) && env::var_os(name).is_some())
    }

    /// Expand `${var}` references; unknown names stay as written
    pub fn interpolate(&self, s: &str) -> InterpolationResult<String> {
        interpolate_with(s, |name| self.lookup_var(name))
    }

    /// Expand `${var}` references, failing on unknown names
    pub fn interpolate_strict(&self, s: &str) -> InterpolationResult<String> {
        ensure_resolved(self.interpolate(s)?)
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Only print commands
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the environments push/update target when no explicit target is given
    pub fn with_environments(mut self, environments: EnvironmentFlags) -> Self {
        self.environments = environments;
        self
    }

    /// Push a task onto the execution stack
    pub fn push_task(&mut self, task_name: String) {
        self.task_stack.push(task_name);
    }

    /// Pop a task from the execution stack
    pub fn pop_task(&mut self) -> Option<String> {
        self.task_stack.pop()
    }

    /// Check if a task is in the execution stack (detect recursion)
    pub fn is_task_in_stack(&self, task_name: &str) -> bool {
        self.task_stack.iter().any(|t| t == task_name)
    }

    /// Get the current task name (top of stack)
    pub fn current_task(&self) -> Option<&String> {
        self.task_stack.last()
    }

    /// Whether command echo and progress output should be shown
    pub fn is_chatty(&self) -> bool {
        self.verbosity >= Verbosity::Normal
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
