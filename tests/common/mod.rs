//! Common test utilities

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a temporary directory with a stagehand.yml file
pub fn create_test_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("stagehand.yml");
    fs::write(&config_path, content).unwrap();
    (temp_dir, config_path)
}

/// Create a test project with a manifest, project settings and bower.json
pub fn create_test_project(manifest: &str, settings: &str, bower: &str) -> (TempDir, PathBuf) {
    let (temp_dir, config_path) = create_test_config(manifest);
    fs::write(temp_dir.path().join("project.settings.json"), settings).unwrap();
    fs::write(temp_dir.path().join("bower.json"), bower).unwrap();
    (temp_dir, config_path)
}

/// Lines appended to `log.txt` by the `echo ... >> log.txt` commands of a test manifest
pub fn read_log(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("log.txt"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Manifest whose push/update shell tasks record their names in log.txt
pub const PIPELINE_MANIFEST: &str = r#"
tasks:
  build:
    usage: Build the dist folder
    run: echo build >> log.txt
  deploy:
    usage: Build and publish a snapshot package
    run:
      - task: build
      - echo deploy >> log.txt
  "shell:pushDevelopment":
    private: true
    run: echo shell:pushDevelopment >> log.txt
  "shell:pushStaging":
    private: true
    run: echo shell:pushStaging >> log.txt
  "shell:pushProduction":
    private: true
    run: echo shell:pushProduction >> log.txt
  "shell:updateDevelopment":
    private: true
    run: echo shell:updateDevelopment >> log.txt
  "shell:updateStaging":
    private: true
    run: echo shell:updateStaging >> log.txt
  "shell:updateProduction":
    private: true
    run: echo shell:updateProduction >> log.txt
"#;
