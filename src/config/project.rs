//! Project settings
//!
//! Reads the JSON project settings and dependency manifest that sit next to
//! the task manifest and turns them into interpolation variables.

use crate::config::types::ProjectFiles;
use crate::error::{ConfigError, ConfigResult};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Defaults for the directory settings every pipeline relies on
const DEFAULT_DIRS: &[(&str, &str)] = &[("src", "app"), ("dist", "dist"), ("temp", ".tmp")];

/// Resolved project settings
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSettings {
    /// Scalar settings by key, defaults applied
    pub settings: BTreeMap<String, String>,

    /// Version of the framework dependency (empty when unknown)
    pub framework_version: String,

    /// Index file the templating step starts from
    pub index_html: String,

    /// Whether `index_html` is the project's own index file
    pub custom_index: bool,
}

impl ProjectSettings {
    /// Load settings for a project rooted at `base_dir`
    pub fn load(base_dir: &Path, files: &ProjectFiles) -> ConfigResult<Self> {
        let settings = load_settings(&base_dir.join(&files.settings))?;
        let framework_version =
            load_framework_version(&base_dir.join(&files.dependencies), &files.framework)?;

        let src = settings.get("src").map(String::as_str).unwrap_or("app");
        let (index_html, custom_index) = select_index(base_dir, src, &files.index);
        if custom_index {
            tracing::warn!("Using custom declared index.html file");
        }

        Ok(ProjectSettings {
            settings,
            framework_version,
            index_html,
            custom_index,
        })
    }

    /// Look up a setting
    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Interpolation variables exposed to tasks
    pub fn vars(&self) -> BTreeMap<String, String> {
        let mut vars: BTreeMap<String, String> = self
            .settings
            .iter()
            .map(|(key, value)| (format!("project.{}", key), value.clone()))
            .collect();
        vars.insert("project.index_html".to_string(), self.index_html.clone());
        vars.insert("framework.version".to_string(), self.framework_version.clone());
        vars
    }
}

/// Read the project settings file, filling in directory defaults.
///
/// A missing file yields the defaults alone.
pub fn load_settings(path: &Path) -> ConfigResult<BTreeMap<String, String>> {
    let mut settings = match read_json_object(path)? {
        Some(object) => flatten_scalars(&object),
        None => {
            tracing::debug!("No project settings at {}, using defaults", path.display());
            BTreeMap::new()
        }
    };

    for (key, default) in DEFAULT_DIRS {
        settings
            .entry(key.to_string())
            .or_insert_with(|| default.to_string());
    }

    Ok(settings)
}

/// Read the framework version from the dependency manifest
pub fn load_framework_version(path: &Path, framework: &str) -> ConfigResult<String> {
    let descriptor = read_json_object(path)?.and_then(|object| {
        object
            .get("dependencies")
            .and_then(|deps| deps.get(framework))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    Ok(descriptor
        .as_deref()
        .map(version_from_descriptor)
        .unwrap_or_default())
}

/// Extract the version from a dependency descriptor.
///
/// Descriptors look like `git@host:org/repo.git#v1.0.53`; the version is the
/// tag, commit or branch after the last `#`.
pub fn version_from_descriptor(descriptor: &str) -> String {
    descriptor
        .rsplit_once('#')
        .map(|(_, version)| version.to_string())
        .unwrap_or_default()
}

/// Choose the index file: the project's own `<src>/index.html` when present
pub fn select_index(base_dir: &Path, src: &str, fallback: &str) -> (String, bool) {
    let custom = Path::new(src).join("index.html");
    if base_dir.join(&custom).is_file() {
        (custom.to_string_lossy().into_owned(), true)
    } else {
        (fallback.to_string(), false)
    }
}

fn read_json_object(path: &Path) -> ConfigResult<Option<Map<String, Value>>> {
    if !path.exists() {
        return Ok(None);
    }

    let settings_error = |error: String| ConfigError::Settings {
        path: PathBuf::from(path),
        error,
    };

    let contents = fs::read_to_string(path).map_err(|e| settings_error(e.to_string()))?;
    match serde_json::from_str::<Value>(&contents).map_err(|e| settings_error(e.to_string()))? {
        Value::Object(object) => Ok(Some(object)),
        _ => Err(settings_error("expected a JSON object".to_string())),
    }
}

fn flatten_scalars(object: &Map<String, Value>) -> BTreeMap<String, String> {
    object
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), text))
        })
        .collect()
}
