//! Settings and configuration utilities.
//!
//! This module reads settings from $HOME/.monorepo-commits/settings.json and
//! uses them as a fallback for environment variables such as
//! `SRM_MAX_THREADS`.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Settings loaded from $HOME/.monorepo-commits/settings.json.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable overrides.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // A missing file means no overrides
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

        Ok(home_dir.join(".monorepo-commits").join("settings.json"))
    }

    /// Returns an environment variable with fallback to settings.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        env::var(key).ok().or_else(|| self.env.get(key).cloned())
    }
}

/// Returns an environment variable with fallback to the default settings file.
pub fn get_env_var(key: &str) -> Result<String> {
    match Settings::load() {
        Ok(settings) => settings
            .get_env_var(key)
            .ok_or_else(|| anyhow::anyhow!("Environment variable not found: {}", key)),
        // Without a settings file only the process environment counts
        Err(err) => env::var(key)
            .map_err(|_| anyhow::anyhow!("Environment variable not found: {}", key).context(err)),
    }
}
