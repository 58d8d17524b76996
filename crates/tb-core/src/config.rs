// ABOUTME: Application configuration handling.
// ABOUTME: Loads and saves layout and modeline settings from TOML config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Window tree settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Number of empty windows the root container starts with
    pub initial_windows: usize,
    /// Splits beyond this many windows are refused by the frontend
    pub max_windows: usize,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            initial_windows: 1,
            max_windows: 16,
        }
    }
}

/// What each window's status line shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelineSettings {
    /// Prefix the line with the 1-based window number
    pub show_window_id: bool,
    /// Append the window's tree address (e.g. `0.1`)
    pub show_address: bool,
}

impl Default for ModelineSettings {
    fn default() -> Self {
        Self {
            show_window_id: true,
            show_address: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window tree settings
    pub layout: LayoutSettings,

    /// Status line settings
    pub modeline: ModelineSettings,

    /// Text shown by windows that have no buffer
    pub placeholder_text: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: LayoutSettings::default(),
            modeline: ModelineSettings::default(),
            placeholder_text: "[no buffer]".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

impl Config {
    /// Get the default config file path (~/.config/tilebuf/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tilebuf").join("config.toml"))
    }

    /// Load config from a path
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from default path, or return default config if not found
    pub fn load_or_default() -> Self {
        Self::default_path()
            .and_then(|path| Self::load(&path).ok())
            .unwrap_or_default()
    }

    /// Save config to a path
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
