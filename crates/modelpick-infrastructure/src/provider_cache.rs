//! Local provider cache.
//!
//! The cache is a JSON array of providers kept in the data directory by
//! whichever collaborator resolves providers. This module only reads it.

use modelpick_core::error::Result;
use modelpick_core::ProviderDescriptor;
use std::fs;
use std::path::Path;

/// Reads the cached provider list. A missing or blank file yields an empty list.
pub fn load_cached_providers(path: &Path) -> Result<Vec<ProviderDescriptor>> {
    if !path.exists() {
        tracing::debug!("[ProviderCache] no cache at {}", path.display());
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let providers: Vec<ProviderDescriptor> = serde_json::from_str(&content)?;
    tracing::debug!(
        "[ProviderCache] loaded {} providers from {}",
        providers.len(),
        path.display()
    );
    Ok(providers)
}
