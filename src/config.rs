//! Runtime configuration.
//!
//! Loaded from `street-service/config.json` in the platform config directory,
//! then overridden by environment variables:
//!
//! - `STREET_USE_NATIVE`: `true`/`1` routes point insertion through the
//!   database-native statement instead of the in-memory merge.
//! - `STREET_DATABASE_PATH`: SQLite file to open instead of the default.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "street-service";
const CONFIG_FILE: &str = "config.json";

/// Flags that change runtime behavior without a rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Use the single-statement native insertion strategy.
    pub use_native: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite database file. `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,
    pub feature_flags: FeatureFlags,
}

impl AppConfig {
    /// Load the config file (if any) and apply environment overrides.
    /// Falls back to defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        let mut config = match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    fn try_load() -> Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(&config_path)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Apply overrides from a key lookup (the environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(flag) = lookup("STREET_USE_NATIVE").and_then(|v| parse_bool(&v)) {
            self.feature_flags.use_native = flag;
        }
        if let Some(path) = lookup("STREET_DATABASE_PATH").filter(|p| !p.trim().is_empty()) {
            self.database_path = Some(PathBuf::from(path));
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
