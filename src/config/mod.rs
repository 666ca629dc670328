//! Configuration for treepick
//!
//! [`PickerConfig`] holds the options the engine reads. [`AppConfig`] is the
//! on-disk file (`<config_dir>/treepick/config.toml`) combining engine
//! options with the settings of each node provider.

use std::fs;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::engine::{SelectionMode, SortPolicy};
use crate::node::NodeId;
use crate::provider::{FileProviderConfig, FormatConfig, JsonProviderConfig};

/// Engine options
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// Single or multiple picks
    pub selection_mode: SelectionMode,

    /// Sibling ordering; `None` keeps provider order
    pub sort: Option<SortPolicy>,

    /// Node above which up-navigation stops; provider boundary when unset
    ///
    /// Ids are source-specific, so this is set from code only and never read
    /// from or written to the shared `[picker]` section. The filesystem
    /// boundary comes from `[files] root`.
    #[serde(skip)]
    pub root_boundary: Option<NodeId>,

    /// Tapping a selectable leaf with nothing picked commits immediately
    pub one_tap_commit: bool,

    /// Allow committing with nothing picked
    pub allow_empty_commit: bool,

    /// Cap on the navigation stack depth
    pub max_depth: Option<usize>,
}

impl PickerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    #[must_use]
    pub const fn with_sort(mut self, sort: Option<SortPolicy>) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn with_root_boundary(mut self, boundary: impl Into<NodeId>) -> Self {
        self.root_boundary = Some(boundary.into());
        self
    }

    #[must_use]
    pub const fn with_one_tap_commit(mut self, enabled: bool) -> Self {
        self.one_tap_commit = enabled;
        self
    }

    #[must_use]
    pub const fn with_allow_empty_commit(mut self, allowed: bool) -> Self {
        self.allow_empty_commit = allowed;
        self
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Application configuration file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Engine options shared by every source
    #[serde(default)]
    pub picker: PickerConfig,

    /// Filesystem source
    #[serde(default)]
    pub files: FileProviderConfig,

    /// JSON source
    #[serde(default)]
    pub json: JsonProviderConfig,

    /// Size and date formatting
    #[serde(default)]
    pub format: FormatConfig,
}

impl AppConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::Message("Could not determine config directory".to_string())
        })?;

        Ok(config_dir.join("treepick").join("config.toml"))
    }

    /// Load configuration from the default location, creating it if missing
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be determined or
    /// the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the parent directory cannot be created, the
    /// configuration cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }
}
