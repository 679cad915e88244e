//! steb configuration management.
//!
//! Handles the configuration file at:
//! - Linux: ~/.config/steb/config.toml
//! - macOS: ~/Library/Application Support/steb/config.toml
//! - Windows: %APPDATA%\steb\config.toml

use crate::error::StebError;
use crate::fs_utils;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Port used when none is configured
pub const DEFAULT_PORT: u16 = 4404;

/// Ports a listener may be configured on
pub const PORT_RANGE: RangeInclusive<u16> = 1025..=65534;

/// steb configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StebConfig {
    /// Listener settings
    #[serde(default)]
    pub listener: ListenerConfig,

    /// Editor selection settings
    #[serde(default)]
    pub editor: EditorConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Port to listen on (1025-65534)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether the listener should be running
    #[serde(default)]
    pub enabled: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            enabled: false,
        }
    }
}

/// Editor configuration, consumed by the editor host only
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct EditorConfig {
    /// Editor ids to replace with the default text editor
    #[serde(default)]
    pub overrides: Vec<String>,

    /// File extension to editor id
    #[serde(default)]
    pub associations: BTreeMap<String, String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

const ASSOCIATIONS_PREFIX: &str = "editor.associations.";

/// Canonical form of a file extension key: no leading dots, lowercase
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Parse and range-check a port value
pub fn parse_port(value: &str) -> Result<u16, StebError> {
    let port: i64 = value.trim().parse().map_err(|_| StebError::ConfigError {
        message: format!("Invalid port: {}", value),
    })?;
    check_port(port)
}

fn check_port(port: i64) -> Result<u16, StebError> {
    u16::try_from(port)
        .ok()
        .filter(|p| PORT_RANGE.contains(p))
        .ok_or(StebError::InvalidPort { port })
}

fn parse_bool(value: &str) -> Result<bool, StebError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(StebError::ConfigError {
            message: format!("Invalid boolean: {}", value),
        }),
    }
}

impl StebConfig {
    /// Default configuration file path
    pub fn default_path() -> Result<PathBuf, StebError> {
        fs_utils::config_file_path().ok_or_else(|| StebError::ConfigError {
            message: "Unable to determine the user configuration directory".to_string(),
        })
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, StebError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| StebError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| StebError::ConfigError {
            message: format!("Failed to parse config: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<(), StebError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StebError::IoError {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| StebError::ConfigError {
            message: format!("Failed to serialize config: {}", e),
        })?;

        // Atomic write
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content).map_err(|e| StebError::IoError {
            path: temp_path.clone(),
            message: e.to_string(),
        })?;

        fs_utils::atomic_rename(&temp_path, path).map_err(|e| StebError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(())
    }

    /// Check values that serde alone cannot
    pub fn validate(&self) -> Result<(), StebError> {
        check_port(self.listener.port as i64)?;
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(StebError::ConfigError {
                message: format!(
                    "Invalid log level: {}. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
        Ok(())
    }

    /// Get a configuration value by key path (e.g., "listener.port")
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(ext) = key.strip_prefix(ASSOCIATIONS_PREFIX) {
            return self
                .editor
                .associations
                .get(&normalize_extension(ext))
                .cloned();
        }
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["listener", "port"] => Some(self.listener.port.to_string()),
            ["listener", "enabled"] => Some(self.listener.enabled.to_string()),
            ["logging", "level"] => Some(self.logging.level.clone()),
            ["editor", "overrides"] => Some(self.editor.overrides.join(", ")),
            _ => None,
        }
    }

    /// Set a configuration value by key path
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), StebError> {
        if let Some(ext) = key.strip_prefix(ASSOCIATIONS_PREFIX) {
            return self.set_association(ext, value);
        }
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["listener", "port"] => {
                self.listener.port = parse_port(value)?;
            }
            ["listener", "enabled"] => {
                self.listener.enabled = parse_bool(value)?;
            }
            ["logging", "level"] => {
                let level = value.trim().to_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(StebError::ConfigError {
                        message: format!(
                            "Invalid log level: {}. Must be one of: {}",
                            value,
                            LOG_LEVELS.join(", ")
                        ),
                    });
                }
                self.logging.level = level;
            }
            ["editor", "overrides"] => {
                self.editor.overrides = value
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => {
                return Err(StebError::ConfigError {
                    message: format!("Unknown configuration key: {}", key),
                });
            }
        }
        Ok(())
    }

    /// An empty value removes the association
    fn set_association(&mut self, ext: &str, value: &str) -> Result<(), StebError> {
        let ext = normalize_extension(ext);
        if ext.is_empty() {
            return Err(StebError::ConfigError {
                message: format!("Missing file extension in {}<ext>", ASSOCIATIONS_PREFIX),
            });
        }
        let value = value.trim();
        if value.is_empty() {
            self.editor.associations.remove(&ext);
        } else {
            self.editor.associations.insert(ext, value.to_string());
        }
        Ok(())
    }

    /// Reset configuration to defaults
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Display configuration as formatted text
    pub fn display(&self) -> String {
        let mut output = String::new();

        output.push_str("[listener]\n");
        output.push_str(&format!("enabled = {}\n", self.listener.enabled));
        output.push_str(&format!("port = {}\n", self.listener.port));

        output.push_str("\n[editor]\n");
        output.push_str(&format!("overrides = {:?}\n", self.editor.overrides));
        if self.editor.associations.is_empty() {
            output.push_str("# associations: none (all files use the text editor)\n");
        } else {
            output.push_str("\n[editor.associations]\n");
            for (ext, id) in &self.editor.associations {
                output.push_str(&format!("{} = {:?}\n", ext, id));
            }
        }

        output.push_str("\n[logging]\n");
        output.push_str(&format!("level = \"{}\"\n", self.logging.level));

        output
    }
}
