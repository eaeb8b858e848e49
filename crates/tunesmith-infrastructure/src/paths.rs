//! Unified path management for tunesmith files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/tunesmith/         # Config directory (platform default)
//! ├── config.toml              # GeneratorConfig
//! └── settings.toml            # UserSettings (long-wait flag, daily usage)
//! ```

use std::env;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "tunesmith";
const CONFIG_FILE_NAME: &str = "config.toml";
const SETTINGS_FILE_NAME: &str = "settings.toml";
const ENV_CONFIG_PATH: &str = "TUNESMITH_CONFIG";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for tunesmith_core::TunesmithError {
    fn from(err: PathError) -> Self {
        tunesmith_core::TunesmithError::config(err.to_string())
    }
}

/// Path resolution for tunesmith.
///
/// A base directory may be injected (tests, portable installs); otherwise the
/// platform config directory from `dirs` is used.
#[derive(Debug, Clone, Default)]
pub struct TunesmithPaths {
    base_dir: Option<PathBuf>,
}

impl TunesmithPaths {
    /// Creates a resolver.
    ///
    /// # Arguments
    ///
    /// * `base_dir` - Overrides the config directory when `Some`
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Returns the tunesmith configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base_dir {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the configuration file.
    ///
    /// `TUNESMITH_CONFIG` wins when set and non-empty; a directory value
    /// resolves to `config.toml` inside it.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        if let Some(value) = env::var_os(ENV_CONFIG_PATH).filter(|v| !v.is_empty()) {
            let path = PathBuf::from(value);
            if path.is_dir() {
                return Ok(path.join(CONFIG_FILE_NAME));
            }
            return Ok(path);
        }
        Ok(self.config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Returns the path to the persisted user settings.
    pub fn settings_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(SETTINGS_FILE_NAME))
    }
}
