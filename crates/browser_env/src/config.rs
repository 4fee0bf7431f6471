use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::env::EnvError;

/// Separator used by task files that open several start pages at once.
pub const START_URL_SEPARATOR: &str = " |AND| ";

/// One task as described by a JSON config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(default)]
    pub task_id: Option<serde_json::Value>,
    #[serde(default)]
    pub start_url: Option<String>,
    #[serde(default)]
    pub storage_state: Option<PathBuf>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub sites: Vec<String>,
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl TaskConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EnvError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| EnvError::Io {
            context: format!("failed to read task config '{}'", path.display()),
            source,
        })?;
        let mut config: TaskConfig = serde_json::from_str(&raw).map_err(|err| {
            EnvError::Config(format!("invalid task config '{}': {err}", path.display()))
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Start pages in tab order; empty when the task names none.
    pub fn start_urls(&self) -> Vec<String> {
        self.start_url
            .as_deref()
            .map(|raw| {
                raw.split(START_URL_SEPARATOR)
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Storage-state path, resolved against the config file's directory when relative.
    pub fn storage_state_path(&self) -> Option<PathBuf> {
        let path = self.storage_state.as_ref()?;
        if path.is_absolute() || path.exists() {
            return Some(path.clone());
        }
        match self.source.as_ref().and_then(|source| source.parent()) {
            Some(dir) => Some(dir.join(path)),
            None => Some(path.clone()),
        }
    }
}

/// Browser cookies captured from an authenticated session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageState {
    #[serde(default)]
    pub cookies: Vec<StoredCookie>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: Option<bool>,
    #[serde(default)]
    pub secure: Option<bool>,
    #[serde(default)]
    pub same_site: Option<String>,
}

impl StorageState {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EnvError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| EnvError::Io {
            context: format!("failed to read storage state '{}'", path.display()),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|err| {
            EnvError::Config(format!("invalid storage state '{}': {err}", path.display()))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Launch options for a browsing environment.
#[derive(Debug, Clone)]
pub struct EnvOptions {
    pub headless: bool,
    pub slow_mo: Duration,
    pub viewport: ViewportSize,
    pub current_viewport_only: bool,
    pub screenshot_dir: Option<PathBuf>,
}

impl Default for EnvOptions {
    fn default() -> Self {
        Self {
            headless: false,
            slow_mo: Duration::from_millis(100),
            viewport: ViewportSize::default(),
            current_viewport_only: true,
            screenshot_dir: None,
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
