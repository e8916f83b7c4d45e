//! Editor configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! `#[derive(Serialize, Deserialize)]` generates the TOML mapping for
//! every section below. `#[serde(default)]` fills in missing fields from
//! `Default::default()`, so a config file only has to name what it changes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::streamer::LineEnding;

/// Main editor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editing behavior
    pub editor: EditorConfig,

    /// Window and appearance
    pub ui: UiConfig,

    /// File handling
    pub files: FileConfig,

    /// Keyboard settings
    pub keyboard: KeyboardConfig,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default config: {e}");
                Self::default()
            }
        }
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("zephyr").join("config.toml"))
    }

    /// Saves the config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path()?)
    }

    /// Saves the config to a file, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Editing behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Tab width in columns
    pub tab_size: usize,

    /// Soft-wrap long lines
    pub line_wrap: bool,

    /// Text put between lines by "join lines"
    pub join_separator: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_size: 4,
            line_wrap: true,
            join_separator: " ".to_string(),
        }
    }
}

/// Window and appearance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Look-and-feel (theme) name
    pub look_and_feel: String,

    /// Interface language tag
    pub language: String,

    /// Font size in points
    pub font_size: u32,

    /// Text area background as `#RRGGBB`
    pub background_color: String,

    pub always_on_top: bool,

    pub show_splash_screen: bool,

    /// Window size in pixels (width, height)
    pub window_size: (u32, u32),

    /// Window position in pixels (x, y)
    pub window_position: (i32, i32),
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            look_and_feel: "default".to_string(),
            language: "en-US".to_string(),
            font_size: 15,
            background_color: "#FFFFFF".to_string(),
            always_on_top: false,
            show_splash_screen: true,
            window_size: (480, 600),
            window_position: (250, 150),
        }
    }
}

/// Which documents "save on focus lost" writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveTarget {
    /// Only the active document
    #[default]
    Current,
    /// Every open document
    All,
}

/// File handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Terminator used when writing documents
    pub line_ending: LineEnding,

    /// Reopen the previous session's files on start
    pub remember_current_session: bool,

    /// Save when the window loses focus
    pub save_on_focus_lost: bool,

    pub save_on_focus_lost_target: SaveTarget,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            line_ending: LineEnding::default(),
            remember_current_session: true,
            save_on_focus_lost: false,
            save_on_focus_lost_target: SaveTarget::Current,
        }
    }
}

/// Keyboard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Custom key bindings, key chord to command name
    /// (`"ctrl+d" = "duplicate-lines"`)
    pub bindings: HashMap<String, String>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
