pub mod list;
pub mod reconcile;
pub mod select;

use anyhow::{Context, Result};
use modelpick_application::ModelSelectionService;
use modelpick_infrastructure::{ConfigPaths, ModelPickPaths, load_cached_providers};
use std::path::Path;

/// Resolves file locations from flags, falling back to the platform directories.
pub fn resolve_paths(config: Option<&Path>, data_dir: Option<&Path>) -> Result<ConfigPaths> {
    let source_file = match config {
        Some(path) => path.to_path_buf(),
        None => ModelPickPaths::config_file()?,
    };
    let data_dir = match data_dir {
        Some(path) => path.to_path_buf(),
        None => ModelPickPaths::data_dir()?,
    };
    Ok(ConfigPaths::new(source_file, data_dir))
}

pub fn open_service(
    config: Option<&Path>,
    data_dir: Option<&Path>,
    providers: Option<&Path>,
) -> Result<ModelSelectionService> {
    let paths = resolve_paths(config, data_dir)?;

    let extra = match providers {
        Some(path) => load_cached_providers(path)
            .with_context(|| format!("Failed to read providers from {}", path.display()))?,
        None => Vec::new(),
    };

    tracing::debug!(
        "[modelpick] source {}, derived {}",
        paths.source_file().display(),
        paths.derived_file().display()
    );
    ModelSelectionService::from_paths(paths, extra).context("Failed to load configuration")
}
