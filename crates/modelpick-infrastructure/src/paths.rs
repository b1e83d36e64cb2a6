//! Unified path management for modelpick files.
//!
//! The user-edited configuration lives in the config directory; everything
//! modelpick writes lives in the data directory. Both are resolved via
//! AppPaths from the version-migrate crate.

use modelpick_core::ModelPickError;
use std::path::{Path, PathBuf};
use version_migrate::AppPaths;

/// Base name shared by the source configuration and its derived copy.
pub const CONFIG_FILE_NAME: &str = "modelpick.json";

/// Provider cache file kept in the data directory.
pub const PROVIDERS_CACHE_FILE_NAME: &str = "providers.json";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for ModelPickError {
    fn from(e: PathError) -> Self {
        ModelPickError::config(e.to_string())
    }
}

/// Platform directories for modelpick.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/modelpick/         # Config directory (user-edited, never written)
/// └── modelpick.json           # Source configuration
///
/// ~/.local/share/modelpick/    # Data directory (derived state)
/// ├── modelpick.json           # Derived configuration with pruned recents
/// └── providers.json           # Provider cache
/// ```
pub struct ModelPickPaths;

impl ModelPickPaths {
    /// Returns a configured AppPaths instance for modelpick.
    fn app_paths() -> AppPaths {
        AppPaths::new("modelpick")
    }

    /// Returns the modelpick configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        Self::app_paths()
            .config_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    /// Returns the modelpick data directory.
    pub fn data_dir() -> Result<PathBuf, PathError> {
        Self::app_paths()
            .data_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    /// Returns the path to the source configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }
}

/// Concrete file locations used by one session.
///
/// Built from the platform defaults or injected directly by tests and
/// embedders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    source_file: PathBuf,
    data_dir: PathBuf,
}

impl ConfigPaths {
    pub fn new(source_file: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_file: source_file.into(),
            data_dir: data_dir.into(),
        }
    }

    /// Locations under the platform config and data directories.
    pub fn platform_default() -> Result<Self, PathError> {
        Ok(Self::new(
            ModelPickPaths::config_file()?,
            ModelPickPaths::data_dir()?,
        ))
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The derived document: the source's base name inside the data directory.
    pub fn derived_file(&self) -> PathBuf {
        let name = self
            .source_file
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| CONFIG_FILE_NAME.into());
        self.data_dir.join(name)
    }

    pub fn providers_cache_file(&self) -> PathBuf {
        self.data_dir.join(PROVIDERS_CACHE_FILE_NAME)
    }
}
