//! Deployment environments and flag resolution

use crate::error::{ComposeResult, ConfigurationError};
use std::fmt;
use std::str::FromStr;

/// A deployment destination.
///
/// Variants are declared in pipeline order; `Ord` follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// All environments in pipeline order
    pub const ALL: [Environment; 3] = [
        Environment::Development,
        Environment::Staging,
        Environment::Production,
    ];

    /// Lower-case name used on the command line and in scoped task names
    pub fn name(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Suffix used to form the per-environment shell task names
    pub fn task_suffix(self) -> &'static str {
        match self {
            Environment::Development => "Development",
            Environment::Staging => "Staging",
            Environment::Production => "Production",
        }
    }

    /// Names accepted by [`Environment::from_str`]
    pub fn names() -> [&'static str; 3] {
        Self::ALL.map(Environment::name)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Environment {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> ComposeResult<Self> {
        Self::ALL
            .into_iter()
            .find(|env| env.name() == s)
            .ok_or_else(|| ConfigurationError::UnknownEnvironment(s.to_string()))
    }
}

/// Which environments a flag-driven invocation targets.
///
/// Values held here are already resolved: building the struct directly does
/// not apply the implicit development default. Use [`EnvironmentFlags::from_cli`]
/// for raw command-line flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvironmentFlags {
    pub development: bool,
    pub staging: bool,
    pub production: bool,
}

impl EnvironmentFlags {
    /// Resolve raw command-line flags.
    ///
    /// Development is on when requested, or when neither staging nor
    /// production was requested.
    pub fn from_cli(development: bool, staging: bool, production: bool) -> Self {
        EnvironmentFlags {
            development: development || !(staging || production),
            staging,
            production,
        }
    }

    /// Flag set selecting exactly one environment
    pub fn only(env: Environment) -> Self {
        let mut flags = EnvironmentFlags::default();
        flags.set(env, true);
        flags
    }

    /// Whether the flag for `env` is set
    pub fn is_set(&self, env: Environment) -> bool {
        match env {
            Environment::Development => self.development,
            Environment::Staging => self.staging,
            Environment::Production => self.production,
        }
    }

    /// Set the flag for `env`
    pub fn set(&mut self, env: Environment, value: bool) {
        match env {
            Environment::Development => self.development = value,
            Environment::Staging => self.staging = value,
            Environment::Production => self.production = value,
        }
    }

    /// Environments active for an invocation, in pipeline order.
    ///
    /// An explicit target wins over every flag.
    pub fn active(&self, target: Option<Environment>) -> Vec<Environment> {
        Environment::ALL
            .into_iter()
            .filter(|&env| match target {
                Some(t) => t == env,
                None => self.is_set(env),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_environment() {
        assert_eq!(
            "development".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert_eq!("staging".parse::<Environment>().unwrap(), Environment::Staging);
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
    }

    #[test]
    fn test_parse_unknown_environment() {
        let result = "Production".parse::<Environment>();
        assert_eq!(
            result,
            Err(ConfigurationError::UnknownEnvironment("Production".to_string()))
        );
    }

    #[test]
    fn test_development_defaults_on() {
        let flags = EnvironmentFlags::from_cli(false, false, false);
        assert!(flags.development);
        assert!(!flags.staging);
        assert!(!flags.production);
    }

    #[test]
    fn test_development_not_implied_by_other_flags() {
        for (staging, production) in [(true, false), (false, true), (true, true)] {
            let flags = EnvironmentFlags::from_cli(false, staging, production);
            assert!(!flags.development, "staging={staging} production={production}");
        }
    }

    #[test]
    fn test_flags_are_or_combined() {
        let flags = EnvironmentFlags::from_cli(true, true, false);
        assert_eq!(
            flags.active(None),
            vec![Environment::Development, Environment::Staging]
        );
    }

    #[test]
    fn test_target_overrides_flags() {
        let flags = EnvironmentFlags::from_cli(true, true, true);
        assert_eq!(
            flags.active(Some(Environment::Staging)),
            vec![Environment::Staging]
        );
    }

    #[test]
    fn test_only() {
        let flags = EnvironmentFlags::only(Environment::Production);
        assert_eq!(flags.active(None), vec![Environment::Production]);
    }

    #[test]
    fn test_ordering() {
        assert!(Environment::Development < Environment::Staging);
        assert!(Environment::Staging < Environment::Production);
        assert_eq!(Environment::Staging.to_string(), "staging");
    }
}
