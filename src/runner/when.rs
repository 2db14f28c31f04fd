//! When condition evaluation
//!
//! This module handles evaluating conditional expressions for run items.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{check_command, Context, When, WhenCondition};

/// Evaluate a list of when conditions (all must be true - AND logic)
pub fn evaluate_when_list(when_list: &[When], ctx: &Context) -> ExecutionResult<bool> {
    for when in when_list {
        if !evaluate_when(when, ctx)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Evaluate a single when condition
pub fn evaluate_when(when: &When, ctx: &Context) -> ExecutionResult<bool> {
    let expand = |value: &str| {
        ctx.interpolate(value).map_err(|e| ExecutionError::InvalidVar {
            name: value.to_string(),
            error: e.to_string(),
        })
    };

    match &when.condition {
        WhenCondition::Equal { left, right } => Ok(expand(left)? == expand(right)?),

        WhenCondition::NotEqual { left, right } => Ok(expand(left)? != expand(right)?),

        WhenCondition::Command(cmd) => check_command(cmd, ctx),

        WhenCondition::Exists(path) => Ok(ctx.working_dir.join(expand(path)?).exists()),

        WhenCondition::NotExists(path) => Ok(!ctx.working_dir.join(expand(path)?).exists()),

        WhenCondition::EnvSet(var) => Ok(ctx.is_var_set(var)),

        WhenCondition::EnvNotSet(var) => Ok(!ctx.is_var_set(var)),
    }
}
