//! Configuration model for seltabls

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// seltabls configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SeltablsConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub lint: LintConfig,
}

/// Language server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Frames decoded ahead of the dispatcher
    #[serde(default = "defaults::queue_capacity")]
    pub queue_capacity: usize,

    /// Characters of each response kept in the message log
    #[serde(default = "defaults::log_response_limit")]
    pub log_response_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: defaults::queue_capacity(),
            log_response_limit: defaults::log_response_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Log file used by `seltabls lsp`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: defaults::log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LintConfig {
    /// Keys every dialect field must carry
    #[serde(default = "defaults::required_tags")]
    pub required_tags: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            required_tags: defaults::required_tags(),
        }
    }
}

mod defaults {
    pub fn queue_capacity() -> usize {
        64
    }
    pub fn log_response_limit() -> usize {
        256
    }
    pub fn log_level() -> String {
        "info".to_string()
    }
    pub fn required_tags() -> Vec<String> {
        ["hSel", "dSel", "ctl"].map(String::from).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SeltablsConfig::default();
        assert_eq!(config.server.queue_capacity, 64);
        assert_eq!(config.server.log_response_limit, 256);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.lint.required_tags, vec!["hSel", "dSel", "ctl"]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SeltablsConfig = toml::from_str(
            r#"
            [server]
            queue_capacity = 8

            [lint]
            required_tags = ["hSel"]
            "#,
        )
        .unwrap();
        assert_eq!(config.server.queue_capacity, 8);
        assert_eq!(config.server.log_response_limit, 256);
        assert_eq!(config.lint.required_tags, vec!["hSel"]);
        assert!(config.log.file.is_none());
    }
}
