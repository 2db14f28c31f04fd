//! Variable interpolation for strings
//!
//! This module handles parsing and replacing variables in strings using the ${var} syntax.

use crate::error::{InterpolationError, InterpolationResult};
use regex::Regex;
use std::collections::HashMap;
use std::env;
use std::sync::OnceLock;

fn var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("variable pattern is valid"))
}

/// Interpolate variables in a string
///
/// Supports:
/// - `${var}` - variable from context, expanded recursively
/// - Environment variables (when not found in context)
///
/// Unknown variables are left as written.
pub fn interpolate(s: &str, vars: &HashMap<String, String>) -> InterpolationResult<String> {
    interpolate_with(s, |name| vars.get(name).cloned().or_else(|| env::var(name).ok()))
}

/// Interpolate with strict mode - errors on undefined variables
pub fn interpolate_strict(
    s: &str,
    vars: &HashMap<String, String>,
) -> InterpolationResult<String> {
    ensure_resolved(interpolate(s, vars)?)
}

/// Interpolate, resolving each name through `lookup`
pub fn interpolate_with<F>(s: &str, lookup: F) -> InterpolationResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    expand(s, &lookup, &mut Vec::new())
}

/// Fail on the first `${var}` left in an interpolated string
pub fn ensure_resolved(result: String) -> InterpolationResult<String> {
    if let Some(caps) = var_pattern().captures(&result) {
        return Err(InterpolationError::UndefinedVariable(caps[1].to_string()));
    }

    Ok(result)
}

fn expand<F>(s: &str, lookup: &F, stack: &mut Vec<String>) -> InterpolationResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(s.len());
    let mut last = 0;

    for caps in var_pattern().captures_iter(s) {
        let Some(whole) = caps.get(0) else { continue };
        let name = &caps[1];

        result.push_str(&s[last..whole.start()]);
        last = whole.end();

        let Some(value) = lookup(name) else {
            result.push_str(whole.as_str());
            continue;
        };

        if stack.iter().any(|n| n == name) {
            return Err(InterpolationError::RecursiveInterpolation);
        }
        stack.push(name.to_string());
        result.push_str(&expand(&value, lookup, stack)?);
        stack.pop();
    }

    result.push_str(&s[last..]);
    Ok(result)
}
