//! Command execution
//!
//! This module hands shell commands to the configured interpreter.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{Command, Context};
use colored::Colorize;
use std::process::{Command as StdCommand, Stdio};

/// Execute a command in the given context.
///
/// `quiet` suppresses the command echo (the task or the command asked for it).
pub fn execute_command(cmd: &Command, ctx: &Context, quiet: bool) -> ExecutionResult<()> {
    let exec_str = ctx.interpolate(cmd.exec()).map_err(|e| ExecutionError::InvalidVar {
        name: "command".to_string(),
        error: e.to_string(),
    })?;

    if ctx.dry_run {
        if ctx.is_chatty() {
            eprintln!("{} {}", "[DRY]".yellow().bold(), exec_str);
        }
        return Ok(());
    }

    if !quiet && !cmd.is_quiet() && ctx.is_chatty() {
        let print_str = ctx
            .interpolate(cmd.print())
            .unwrap_or_else(|_| cmd.print().to_string());
        eprintln!("{} {}", "[RUN]".green().bold(), print_str);
    }

    let working_dir = match cmd.dir() {
        Some(dir) => {
            let dir = ctx.interpolate_strict(dir).map_err(|e| {
                ExecutionError::InvalidVar {
                    name: "dir".to_string(),
                    error: e.to_string(),
                }
            })?;
            ctx.working_dir.join(dir)
        }
        None => ctx.working_dir.clone(),
    };

    let mut command = shell_command(&exec_str, ctx)?;
    command.current_dir(&working_dir);
    command.stdin(Stdio::inherit());
    command.stdout(Stdio::inherit());
    command.stderr(Stdio::inherit());

    tracing::debug!("Executing in {}: {}", working_dir.display(), exec_str);

    let status = command.status().map_err(|e| ExecutionError::Spawn {
        command: exec_str.clone(),
        error: e.to_string(),
    })?;

    if !status.success() {
        tracing::debug!("Command exited with {:?}: {}", status.code(), exec_str);
        return Err(ExecutionError::CommandFailed(status.code()));
    }

    Ok(())
}

/// Check if a command succeeds (for when conditions)
pub fn check_command(cmd_str: &str, ctx: &Context) -> ExecutionResult<bool> {
    let exec_str = ctx.interpolate(cmd_str).map_err(|e| ExecutionError::InvalidVar {
        name: "command".to_string(),
        error: e.to_string(),
    })?;

    let mut command = shell_command(&exec_str, ctx)?;
    command.current_dir(&ctx.working_dir);
    command.stdout(Stdio::null());
    command.stderr(Stdio::null());

    let status = command.status().map_err(|e| ExecutionError::Spawn {
        command: exec_str.clone(),
        error: e.to_string(),
    })?;

    Ok(status.success())
}

/// Build an interpreter invocation for `exec_str` with context variables exported
fn shell_command(exec_str: &str, ctx: &Context) -> ExecutionResult<StdCommand> {
    let (program, args) = ctx
        .interpreter
        .split_first()
        .ok_or_else(|| ExecutionError::Spawn {
            command: exec_str.to_string(),
            error: "no interpreter configured".to_string(),
        })?;

    let mut command = StdCommand::new(program);
    command.args(args);
    command.arg(exec_str);

    // Dotted names like project.dist are interpolation-only
    for (key, value) in &ctx.vars {
        if is_env_name(key) {
            command.env(key, value);
        }
    }
    for key in &ctx.unset_vars {
        command.env_remove(key);
    }

    Ok(command)
}

fn is_env_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
