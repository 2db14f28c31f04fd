//! Manifest file parsing and discovery

use crate::config::types::Config;
use crate::error::{ConfigError, ConfigResult, StagehandError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default manifest file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["stagehand.yml", "stagehand.yaml"];

/// Variables file loaded from the manifest's directory
const ENV_FILE_NAME: &str = ".env";

/// Find the manifest by searching current and parent directories
pub fn find_config_file() -> ConfigResult<PathBuf> {
    find_config_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the manifest starting from a specific directory
pub fn find_config_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in CONFIG_FILE_NAMES {
            let config_path = current_dir.join(file_name);
            searched_paths.push(config_path.display().to_string());

            if config_path.is_file() {
                tracing::debug!("Found manifest at {}", config_path.display());
                return Ok(config_path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse a manifest from a path
pub fn parse_config_file(path: &Path) -> Result<Config, StagehandError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e))
    })?;

    parse_config(&contents)
}

/// Parse a manifest from a string
pub fn parse_config(yaml: &str) -> Result<Config, StagehandError> {
    // An empty document deserializes as null
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Read variables from the `.env` file in `dir`, if there is one
pub fn load_env_file(dir: &Path) -> ConfigResult<Vec<(String, String)>> {
    let path = dir.join(ENV_FILE_NAME);
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let invalid = |e: dotenvy::Error| {
        ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e))
    };

    let vars = dotenvy::from_path_iter(&path)
        .map_err(invalid)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(invalid)?;
    tracing::debug!("Loaded {} variables from {}", vars.len(), path.display());
    Ok(vars)
}

/// Parse the manifest with automatic file discovery
pub fn parse_config_auto() -> Result<(Config, PathBuf), StagehandError> {
    let config_path = find_config_file()?;
    let config = parse_config_file(&config_path)?;
    Ok((config, config_path))
}
