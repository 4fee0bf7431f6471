use std::{collections::HashMap, fs};

use serde::Deserialize;

const SETTINGS_FILE: &str = "homepage.toml";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub database_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:4399".into(),
            database_url: "sqlite://./data/homepage.db".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_overrides(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("HOMEPAGE_BIND") {
        settings.bind_addr = v;
    }
    if let Ok(v) = std::env::var("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Ok(v) = std::env::var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Ok(v) = std::env::var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    settings
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        tracing::warn!(file = SETTINGS_FILE, "ignoring unreadable settings file");
        return;
    };
    if let Some(v) = file_cfg.get("bind_addr") {
        settings.bind_addr = v.clone();
    }
    if let Some(v) = file_cfg.get("database_url") {
        settings.database_url = v.clone();
    }
}

impl Settings {
    /// `database_url` as sqlx expects it: a bare file path becomes a
    /// `sqlite://` url. The storage layer creates the file's directory.
    pub fn sqlite_url(&self) -> String {
        let raw = self.database_url.trim();
        if raw.is_empty() {
            return Settings::default().database_url;
        }
        if raw.starts_with("sqlite:") || raw.contains("://") {
            return raw.to_string();
        }
        format!("sqlite://{}", raw.replace('\\', "/"))
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
