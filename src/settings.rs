use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{OreganoError, Result};

pub const DB_FILENAME: &str = "oregano.db";
pub const DATA_DIR_ENV: &str = "OREGANO_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_dir_string")]
    pub data_dir: String,
    /// How many transactions `trsn` shows when `-n` is not given.
    #[serde(default = "default_count")]
    pub default_count: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_count() -> usize {
    10
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_data_dir_string() -> String {
    default_data_dir().to_string_lossy().to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir_string(),
            default_count: default_count(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// The data directory after applying the environment override.
    pub fn resolved_data_dir(&self) -> PathBuf {
        match std::env::var(DATA_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => PathBuf::from(shellexpand_path(&dir)),
            _ => PathBuf::from(shellexpand_path(&self.data_dir)),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("oregano")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("oregano")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        return Settings::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(content) => parse_settings(&content).unwrap_or_else(|e| {
            tracing::warn!("ignoring {}: {e}", path.display());
            Settings::default()
        }),
        Err(e) => {
            tracing::warn!("could not read {}: {e}", path.display());
            Settings::default()
        }
    }
}

fn parse_settings(content: &str) -> Result<Settings> {
    serde_json::from_str(content).map_err(|e| OreganoError::Settings(e.to_string()))
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| OreganoError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
