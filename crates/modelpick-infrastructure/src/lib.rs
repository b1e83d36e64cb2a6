//! Infrastructure layer for modelpick.
//!
//! File locations, locked atomic document storage, configuration loading,
//! the provider cache reader and the file-backed derived config repository.

pub mod config_loader;
pub mod derived_config_repository;
pub mod paths;
pub mod provider_cache;
pub mod storage;

pub use crate::config_loader::{ConfigLoader, LoadedConfig};
pub use crate::derived_config_repository::FileDerivedConfigRepository;
pub use crate::paths::{ConfigPaths, ModelPickPaths};
pub use crate::provider_cache::load_cached_providers;
