use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::sim::SimTimings;

pub const DEFAULT_REPLY_TEXT: &str = "Интересно! Расскажи больше 😊";
pub const DEFAULT_ATTACHMENT_NAME: &str = "документ.pdf";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Runtime settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub timings: SimTimings,
    pub reply_text: String,
    pub attachment_name: String,
    /// How often the terminal UI advances the clock and redraws.
    pub tick_rate_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            timings: SimTimings::default(),
            reply_text: DEFAULT_REPLY_TEXT.to_string(),
            attachment_name: DEFAULT_ATTACHMENT_NAME.to_string(),
            tick_rate_ms: 100,
            log_file: None,
        }
    }
}

pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("mockchat"))
        .ok_or(ConfigError::NoConfigDir)
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(get_config_dir()?.join("config.json"))
}

/// Reads a config file strictly: a missing or malformed file is an error.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let mut file = File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let config: AppConfig = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Resolves the config: an explicit path must load, the default location is
/// used only if the file is there, and anything else falls back to defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    match default_config_path() {
        Ok(path) if path.exists() => load_config_from(&path),
        _ => {
            info!("No config file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}
