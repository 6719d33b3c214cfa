//! Configuration file discovery and loading
//!
//! Looks for `seltabls/config.toml` under `$XDG_CONFIG_HOME`, falling back to
//! `~/.config`. A missing file means defaults.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::models::config::SeltablsConfig;

const APP_DIR: &str = "seltabls";
const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "seltabls.log";

/// `$XDG_CONFIG_HOME/seltabls`, or `~/.config/seltabls`.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .map(|d| d.join(APP_DIR))
}

pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CONFIG_FILE))
}

pub fn default_log_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(LOG_FILE))
}

/// Load from `explicit` when given, otherwise from the default location.
///
/// An explicit path must exist; the default one may be absent.
pub fn load(explicit: Option<&Path>) -> Result<SeltablsConfig, ConfigError> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            load_file(path)
        }
        None => match default_config_path() {
            Some(path) if path.exists() => load_file(&path),
            _ => Ok(SeltablsConfig::default()),
        },
    }
}

pub fn load_file(path: &Path) -> Result<SeltablsConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse(&content)
        .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn parse(content: &str) -> Result<SeltablsConfig, toml::de::Error> {
    toml::from_str(content)
}
