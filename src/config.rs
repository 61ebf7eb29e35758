//! Configuration for ussd-pager.
//!
//! This module provides:
//! - TOML configuration file loading from `~/.ussd-pager/config.toml`
//! - The channel settings every render is given explicitly
//!
//! # Configuration File
//!
//! ```toml
//! # Menu tree definition (optional, the simulator has a built-in demo tree)
//! tree = "demos/menu.toml"
//!
//! [channel]
//! char_limit = 182
//! separator = "\n"
//! enable_exit = true
//! page_size = 5
//! multi_select_delimiter = ","
//!
//! [log]
//! level = "info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters a single USSD response can carry.
pub const DEFAULT_CHAR_LIMIT: usize = 182;

/// Items per page when a node sets no override.
pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config: {0}")]
    Write(#[source] std::io::Error),

    #[error("Could not determine config path")]
    NoConfigPath,

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Menu tree definition file
    pub tree: Option<PathBuf>,
    /// Channel settings
    pub channel: ChannelConfig,
    /// Logging settings
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tree: None,
            channel: ChannelConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Settings of the delivery channel, passed into every render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Maximum characters in one response
    pub char_limit: usize,
    /// Placed between lines of a page
    pub separator: String,
    /// Show the "0.Exit" line on every page
    pub enable_exit: bool,
    /// Items per page unless a node overrides it
    pub page_size: usize,
    /// Separates picks on multi-select nodes
    pub multi_select_delimiter: String,
}

impl ChannelConfig {
    /// Reject settings no session can work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.multi_select_delimiter.is_empty() {
            return Err(ConfigError::Invalid(
                "channel.multi_select_delimiter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            char_limit: DEFAULT_CHAR_LIMIT,
            separator: "\n".to_string(),
            enable_exit: true,
            page_size: DEFAULT_PAGE_SIZE,
            multi_select_delimiter: ",".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Log file (defaults to `~/.ussd-pager/ussd-pager.log`)
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                if let Ok(config) = Self::load_from(&path) {
                    return config;
                }
            }
        }
        Self::default()
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&content)?;
        config.channel.validate()?;
        // Relative tree paths are taken from the config file's directory.
        if let (Some(tree), Some(dir)) = (config.tree.as_ref(), path.parent()) {
            if tree.is_relative() {
                config.tree = Some(dir.join(tree));
            }
        }
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::get_config_path().ok_or(ConfigError::NoConfigPath)?;
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(ConfigError::Write)
    }

    /// Directory holding config and log files
    pub fn data_dir() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".ussd-pager"))
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        let dir = Self::data_dir()?;
        if !dir.exists() {
            let _ = fs::create_dir_all(&dir);
        }
        Some(dir.join("config.toml"))
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.channel.char_limit, DEFAULT_CHAR_LIMIT);
        assert_eq!(config.channel.separator, "\n");
        assert!(config.channel.enable_exit);
        assert_eq!(config.channel.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.log.level, "info");
        assert!(config.tree.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config =
            toml::from_str("[channel]\nchar_limit = 160\nenable_exit = false\n").unwrap();
        assert_eq!(config.channel.char_limit, 160);
        assert!(!config.channel.enable_exit);
        assert_eq!(config.channel.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.channel.multi_select_delimiter, ",");
    }

    #[test]
    fn test_load_from_resolves_tree_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "tree = \"menu.toml\"\n[channel]\npage_size = 3").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.tree, Some(dir.path().join("menu.toml")));
        assert_eq!(config.channel.page_size, 3);
    }

    #[test]
    fn test_load_from_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load_from(&missing), Err(ConfigError::Read { .. })));

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "[channel\n").unwrap();
        assert!(matches!(Config::load_from(&bad), Err(ConfigError::Parse(_))));

        let no_delimiter = dir.path().join("no_delimiter.toml");
        fs::write(&no_delimiter, "[channel]\nmulti_select_delimiter = \"\"\n").unwrap();
        assert!(matches!(
            Config::load_from(&no_delimiter),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_save_to_round_trips_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = Config::default();
        config.channel.char_limit = 120;
        config.channel.enable_exit = false;

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.channel, config.channel);
    }
}
