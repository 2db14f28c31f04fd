//! Main CLI application

use crate::compose::{Environment, EnvironmentFlags, PUSH_TASK, UPDATE_TASK};
use crate::config::{
    load_env_file, parse_config_auto, parse_config_file, validate_config, Config,
    ProjectSettings, COMPLETION_COMMAND, RUN_COMMAND,
};
use crate::error::StagehandError;
use crate::logging::init_tracing;
use crate::runner::{Context, Runner, Verbosity};
use clap::{Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use colored::Colorize;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

/// Task run when no subcommand is given
const DEFAULT_TASK: &str = "default";

/// CLI application
pub struct App {
    /// The clap command
    command: Command,
    /// Parsed manifest
    config: Config,
    /// Runnable tasks
    runner: Runner,
    /// Manifest path
    config_path: PathBuf,
}

impl App {
    /// Create a new app, discovering the manifest from the current directory
    pub fn new() -> Result<Self, StagehandError> {
        let (config, config_path) = parse_config_auto()?;
        Self::from_config(config, config_path)
    }

    /// Create app with a specific manifest file
    pub fn with_config_file(path: PathBuf) -> Result<Self, StagehandError> {
        let config = parse_config_file(&path)?;
        Self::from_config(config, path)
    }

    fn from_config(config: Config, config_path: PathBuf) -> Result<Self, StagehandError> {
        validate_config(&config)?;

        let runner = Runner::from_config(&config);
        let command = build_command(&config, &runner);

        Ok(App {
            command,
            config,
            runner,
            config_path,
        })
    }

    /// Run the application with the process arguments
    pub fn run(self) -> Result<(), StagehandError> {
        self.run_from(std::env::args_os())
    }

    /// Run the application with explicit arguments
    pub fn run_from<I, T>(mut self, args: I) -> Result<(), StagehandError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command.clone().get_matches_from(args);

        let verbosity = get_verbosity(&matches);
        init_tracing(verbosity);

        let tasks = match matches.subcommand() {
            Some((COMPLETION_COMMAND, sub_matches)) => {
                if let Some(shell) = sub_matches.get_one::<Shell>("shell").copied() {
                    let name = self.command.get_name().to_string();
                    clap_complete::generate(shell, &mut self.command, name, &mut io::stdout());
                }
                return Ok(());
            }
            Some((name, sub_matches)) => requested_tasks(name, sub_matches),
            None if self.runner.contains(DEFAULT_TASK) => vec![DEFAULT_TASK.to_string()],
            None => {
                self.command.print_help()?;
                println!();
                return Ok(());
            }
        };

        let mut ctx = self.build_context(&matches, verbosity)?;

        let started = Instant::now();
        self.runner.run_all(&tasks, &mut ctx)?;

        if ctx.is_chatty() && !ctx.dry_run && !ctx.timings.is_empty() {
            eprint!("\n{}", ctx.timings.summary(started.elapsed()));
            eprintln!("{}", "Done.".green().bold());
        }

        Ok(())
    }

    /// Assemble the execution context from the manifest, project files and flags
    fn build_context(
        &self,
        matches: &ArgMatches,
        verbosity: Verbosity,
    ) -> Result<Context, StagehandError> {
        let mut ctx = Context::new()
            .with_config_path(self.config_path.clone())
            .with_verbosity(verbosity)
            .with_dry_run(matches.get_flag("dry-run"))
            .with_environments(get_environments(matches));

        if let Some(interpreter) = &self.config.interpreter {
            ctx = ctx.with_interpreter(interpreter.clone());
        }

        let project = ProjectSettings::load(&ctx.working_dir, &self.config.project)?;
        let env_file = load_env_file(&ctx.working_dir)?;

        // Later sources override earlier ones
        ctx = ctx
            .with_vars(env_file)
            .with_vars(project.vars())
            .with_vars(self.config.vars.clone())
            .with_vars(
                matches
                    .get_many::<(String, String)>("var")
                    .into_iter()
                    .flatten()
                    .cloned(),
            );

        tracing::debug!(
            "Environments: {:?}, {} variables",
            ctx.environments,
            ctx.vars.len()
        );

        Ok(ctx)
    }
}

/// Build the clap command from the manifest
fn build_command(config: &Config, runner: &Runner) -> Command {
    let mut cmd = Command::new(
        config
            .name
            .clone()
            .unwrap_or_else(|| "stagehand".to_string()),
    )
    .version(env!("CARGO_PKG_VERSION"))
    .about(
        config
            .usage
            .clone()
            .unwrap_or_else(|| "Build and deploy task runner".to_string()),
    )
    .arg(
        Arg::new("file")
            .short('f')
            .long("file")
            .value_name("FILE")
            .help("Path to stagehand.yml manifest")
            .global(true),
    )
    .arg(
        Arg::new("quiet")
            .short('q')
            .long("quiet")
            .help("Only print command output and errors")
            .action(ArgAction::SetTrue)
            .global(true),
    )
    .arg(
        Arg::new("silent")
            .short('s')
            .long("silent")
            .help("Print no output")
            .action(ArgAction::SetTrue)
            .global(true),
    )
    .arg(
        Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("Print verbose output")
            .action(ArgAction::SetTrue)
            .global(true),
    )
    .arg(
        Arg::new("dry-run")
            .short('n')
            .long("dry-run")
            .help("Print commands without running them")
            .action(ArgAction::SetTrue)
            .global(true),
    )
    .arg(
        Arg::new("var")
            .long("var")
            .value_name("KEY=VALUE")
            .help("Set a variable for task commands (repeatable)")
            .value_parser(parse_var)
            .action(ArgAction::Append)
            .global(true),
    );

    for env in Environment::ALL {
        cmd = cmd.arg(
            Arg::new(env.name())
                .long(env.name())
                .help(format!(
                    "Target {} when push/update get no explicit target",
                    env.name()
                ))
                .action(ArgAction::SetTrue)
                .global(true),
        );
    }

    cmd = cmd
        .subcommand(environment_command(
            PUSH_TASK,
            "Deploy the build and push it to the selected environments",
        ))
        .subcommand(environment_command(
            UPDATE_TASK,
            "Push to the selected environments and trigger their update check",
        ))
        .subcommand(
            Command::new(RUN_COMMAND)
                .about("Run tasks by name, in order")
                .arg(
                    Arg::new("tasks")
                        .value_name("TASK")
                        .required(true)
                        .num_args(1..),
                ),
        )
        .subcommand(
            Command::new(COMPLETION_COMMAND)
                .about("Print shell completions")
                .arg(
                    Arg::new("shell")
                        .value_name("SHELL")
                        .required(true)
                        .value_parser(clap::value_parser!(Shell)),
                ),
        );

    // Add subcommands for each public manifest task
    for task in runner.public_tasks() {
        let mut task_cmd =
            Command::new(task.name.clone()).about(task.usage.clone().unwrap_or_default());

        if let Some(desc) = &task.description {
            task_cmd = task_cmd.long_about(desc.clone());
        }

        cmd = cmd.subcommand(task_cmd);
    }

    cmd
}

/// `push` / `update` subcommand with an optional target
fn environment_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name).about(about).arg(
        Arg::new("target")
            .value_name("TARGET")
            .help("Environment to target, ignoring the environment flags")
            .value_parser(Environment::names()),
    )
}

/// Task names requested by a subcommand
fn requested_tasks(name: &str, matches: &ArgMatches) -> Vec<String> {
    match name {
        PUSH_TASK | UPDATE_TASK => match matches.get_one::<String>("target") {
            Some(target) => vec![format!("{}:{}", name, target)],
            None => vec![name.to_string()],
        },
        RUN_COMMAND => matches
            .get_many::<String>("tasks")
            .into_iter()
            .flatten()
            .cloned()
            .collect(),
        _ => vec![name.to_string()],
    }
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Resolve the environment flags from matches
fn get_environments(matches: &ArgMatches) -> EnvironmentFlags {
    EnvironmentFlags::from_cli(
        matches.get_flag(Environment::Development.name()),
        matches.get_flag(Environment::Staging.name()),
        matches.get_flag(Environment::Production.name()),
    )
}

/// Parse a `KEY=VALUE` variable assignment
fn parse_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<(), StagehandError> {
    let args: Vec<OsString> = std::env::args_os().collect();

    let app = match extract_file_arg(&args) {
        Some(path) => App::with_config_file(path)?,
        None => App::new()?,
    };

    app.run_from(args)
}

/// Extract --file argument before clap parsing
fn extract_file_arg(args: &[OsString]) -> Option<PathBuf> {
    args.iter().enumerate().find_map(|(i, arg)| {
        if let Some(path) = arg.to_str().and_then(|a| a.strip_prefix("--file=")) {
            return Some(PathBuf::from(path));
        }
        if arg == "--file" || arg == "-f" {
            return args.get(i + 1).map(PathBuf::from);
        }
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn test_command() -> Command {
        let config = parse_config(
            r#"
tasks:
  build:
    usage: Build dist
    run: "true"
  "shell:pushDevelopment":
    private: true
    run: "true"
"#,
        )
        .unwrap();
        build_command(&config, &Runner::from_config(&config))
    }

    #[test]
    fn test_get_verbosity_normal() {
        let matches = test_command().get_matches_from(vec!["stagehand", "build"]);
        assert_eq!(get_verbosity(&matches), Verbosity::Normal);
    }

    #[test]
    fn test_get_verbosity_silent_wins() {
        let matches = test_command().get_matches_from(vec!["stagehand", "-s", "-v", "build"]);
        assert_eq!(get_verbosity(&matches), Verbosity::Silent);
    }

    #[test]
    fn test_environment_flags_default() {
        let matches = test_command().get_matches_from(vec!["stagehand", "push"]);
        assert_eq!(
            get_environments(&matches),
            EnvironmentFlags::only(Environment::Development)
        );
    }

    #[test]
    fn test_environment_flags_after_subcommand() {
        let matches =
            test_command().get_matches_from(vec!["stagehand", "push", "--staging", "--production"]);
        let flags = get_environments(&matches);
        assert!(!flags.development);
        assert!(flags.staging);
        assert!(flags.production);
    }

    #[test]
    fn test_push_target() {
        let matches = test_command().get_matches_from(vec!["stagehand", "push", "production"]);
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(requested_tasks(name, sub), vec!["push:production"]);
    }

    #[test]
    fn test_push_rejects_unknown_target() {
        let result = test_command().try_get_matches_from(vec!["stagehand", "update", "qa"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_many_tasks() {
        let matches = test_command().get_matches_from(vec![
            "stagehand",
            "run",
            "build",
            "shell:pushDevelopment",
        ]);
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(
            requested_tasks(name, sub),
            vec!["build", "shell:pushDevelopment"]
        );
    }

    #[test]
    fn test_private_tasks_are_not_subcommands() {
        let result =
            test_command().try_get_matches_from(vec!["stagehand", "shell:pushDevelopment"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(
            parse_var("goal=install"),
            Ok(("goal".to_string(), "install".to_string()))
        );
        assert_eq!(
            parse_var("url=http://a/b?c=d"),
            Ok(("url".to_string(), "http://a/b?c=d".to_string()))
        );
        assert!(parse_var("goal").is_err());
        assert!(parse_var("=x").is_err());
    }

    #[test]
    fn test_var_flag_collects() {
        let matches = test_command().get_matches_from(vec![
            "stagehand",
            "--var",
            "goal=install",
            "build",
            "--var",
            "tag=v1",
        ]);
        let vars: Vec<(String, String)> = matches
            .get_many::<(String, String)>("var")
            .unwrap()
            .cloned()
            .collect();
        assert_eq!(vars.len(), 2);
    }

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_extract_file_arg() {
        let args = os_args(&["stagehand", "--file", "deploy.yml"]);
        assert_eq!(extract_file_arg(&args), Some(PathBuf::from("deploy.yml")));
    }

    #[test]
    fn test_extract_file_arg_short_and_equals() {
        let args = os_args(&["stagehand", "-f", "a.yml"]);
        assert_eq!(extract_file_arg(&args), Some(PathBuf::from("a.yml")));

        let args = os_args(&["stagehand", "--file=b.yml"]);
        assert_eq!(extract_file_arg(&args), Some(PathBuf::from("b.yml")));
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_file_arg_non_utf8() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(vec![b'b', b'u', b'i', b'l', b'd', 0xff]);
        let args = vec![
            OsString::from("stagehand"),
            raw.clone(),
            OsString::from("-f"),
            raw.clone(),
        ];
        assert_eq!(extract_file_arg(&args), Some(PathBuf::from(raw)));
        assert_eq!(extract_file_arg(&args[..2]), None);
    }
}
