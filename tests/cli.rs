//! End-to-end tests for the stagehand binary

mod common;

use assert_cmd::Command;
use common::{create_test_config, read_log, PIPELINE_MANIFEST};
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn stagehand(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stagehand").unwrap();
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_push_defaults_to_development() {
    let (temp_dir, _config_path) = create_test_config(PIPELINE_MANIFEST);

    stagehand(temp_dir.path()).arg("push").assert().success();

    assert_eq!(
        read_log(temp_dir.path()),
        vec!["build", "deploy", "shell:pushDevelopment"]
    );
}

#[test]
fn test_push_with_environment_flags() {
    let (temp_dir, _config_path) = create_test_config(PIPELINE_MANIFEST);

    stagehand(temp_dir.path())
        .args(["push", "--production", "--staging"])
        .assert()
        .success();

    assert_eq!(
        read_log(temp_dir.path()),
        vec!["build", "deploy", "shell:pushStaging", "shell:pushProduction"]
    );
}

#[test]
fn test_update_target_overrides_flags() {
    let (temp_dir, _config_path) = create_test_config(PIPELINE_MANIFEST);

    stagehand(temp_dir.path())
        .args(["--staging", "update", "production"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Execution Time"));

    assert_eq!(
        read_log(temp_dir.path()),
        vec![
            "build",
            "deploy",
            "shell:pushProduction",
            "shell:updateProduction"
        ]
    );
}

#[test]
fn test_unknown_target_rejected() {
    let (temp_dir, _config_path) = create_test_config(PIPELINE_MANIFEST);

    stagehand(temp_dir.path())
        .args(["update", "qa"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("qa"));

    assert!(read_log(temp_dir.path()).is_empty());
}

#[test]
fn test_scoped_builtin_with_unknown_environment() {
    let (temp_dir, _config_path) = create_test_config(PIPELINE_MANIFEST);

    stagehand(temp_dir.path())
        .args(["run", "push:qa"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Unknown environment 'qa'"));
}

#[test]
fn test_dry_run_prints_the_plan() {
    let (temp_dir, _config_path) = create_test_config(PIPELINE_MANIFEST);

    stagehand(temp_dir.path())
        .args(["--dry-run", "update", "--staging"])
        .assert()
        .success()
        .stderr(
            predicate::str::is_match(
                "(?s)echo deploy >> log.txt.*echo shell:pushStaging >> log.txt.*echo shell:updateStaging >> log.txt",
            )
            .unwrap(),
        );

    assert!(!temp_dir.path().join("log.txt").exists());
}

#[test]
fn test_failing_task_exits_with_error() {
    let yaml = r#"
tasks:
  deploy:
    run:
      - "false"
      - echo unreachable >> log.txt
  "shell:pushDevelopment":
    run: echo push >> log.txt
"#;
    let (temp_dir, _config_path) = create_test_config(yaml);

    stagehand(temp_dir.path())
        .arg("push")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));

    assert!(read_log(temp_dir.path()).is_empty());
}

#[test]
fn test_nested_failure_reported_once() {
    let yaml = r#"
tasks:
  deploy:
    run: "true"
  "shell:pushProduction":
    run: "true"
  "shell:updateProduction":
    run: "false"
"#;
    let (temp_dir, _config_path) = create_test_config(yaml);

    stagehand(temp_dir.path())
        .args(["update", "production"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Task 'update:production' failed: "))
        .stderr(predicate::function(|err: &str| {
            err.matches("' failed: ").count() == 1
        }));
}

#[test]
fn test_run_private_tasks() {
    let (temp_dir, _config_path) = create_test_config(PIPELINE_MANIFEST);

    stagehand(temp_dir.path())
        .args(["-q", "run", "shell:updateStaging", "push:production"])
        .assert()
        .success();

    assert_eq!(
        read_log(temp_dir.path()),
        vec![
            "shell:updateStaging",
            "build",
            "deploy",
            "shell:pushProduction"
        ]
    );
}

#[test]
fn test_default_task_and_vars() {
    let yaml = r#"
vars:
  goal: release
tasks:
  default:
    run: echo ${goal} ${project.dist} >> log.txt
"#;
    let (temp_dir, _config_path) = create_test_config(yaml);
    fs::write(temp_dir.path().join(".env"), "goal=snapshot\n").unwrap();

    stagehand(temp_dir.path()).assert().success();
    stagehand(temp_dir.path())
        .args(["--var", "goal=install"])
        .assert()
        .success();

    // Manifest vars beat .env, --var beats both
    assert_eq!(
        read_log(temp_dir.path()),
        vec!["release dist", "install dist"]
    );
}

#[test]
fn test_project_settings_exposed_to_tasks() {
    let yaml = r#"
tasks:
  "template:index":
    run: echo ${project.name} ${framework.version} ${project.index_html} >> log.txt
"#;
    let (temp_dir, _config_path) = common::create_test_project(
        yaml,
        r#"{"name": "summer-promo"}"#,
        r#"{"dependencies": {"vivoom-chaps": "git@github.com:vivoom/chaps.git#v1.0.53"}}"#,
    );
    fs::create_dir(temp_dir.path().join("app")).unwrap();
    fs::write(temp_dir.path().join("app/index.html"), "<html></html>").unwrap();

    stagehand(temp_dir.path())
        .arg("template:index")
        .assert()
        .success()
        .stderr(predicate::str::contains("Using custom declared index.html file"));

    assert_eq!(
        read_log(temp_dir.path()),
        vec!["summer-promo v1.0.53 app/index.html"]
    );
}

#[test]
fn test_manifest_file_flag() {
    let (temp_dir, config_path) = create_test_config(PIPELINE_MANIFEST);
    let elsewhere = tempfile::TempDir::new().unwrap();

    stagehand(elsewhere.path())
        .arg("--file")
        .arg(&config_path)
        .arg("build")
        .assert()
        .success();

    // Commands run from the manifest's directory
    assert_eq!(read_log(temp_dir.path()), vec!["build"]);
}

#[test]
fn test_missing_manifest() {
    let temp_dir = tempfile::TempDir::new().unwrap();

    stagehand(temp_dir.path())
        .arg("build")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("stagehand.yml"));
}

#[test]
fn test_invalid_manifest_rejected() {
    let (temp_dir, _config_path) = create_test_config(
        r#"
tasks:
  push:
    run: echo shadowed
"#,
    );

    stagehand(temp_dir.path())
        .arg("push")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("reserved"));
}

#[test]
fn test_completion() {
    let (temp_dir, _config_path) = create_test_config(PIPELINE_MANIFEST);

    stagehand(temp_dir.path())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stagehand"))
        .stdout(predicate::str::contains("push"));
}
