//! Configuration loading.
//!
//! Reads the source document from the config directory and overlays the
//! recency state persisted in the derived document. Never writes.
//!
//! Only the source document can fail a load. An unreadable derived document
//! is reported on [`LoadedConfig::derived_error`] and the source recents are
//! used instead.

use crate::paths::ConfigPaths;
use crate::storage::DocumentStorage;
use modelpick_core::ConfigSnapshot;
use modelpick_core::error::{ModelPickError, Result};
use modelpick_core::reconcile::overlay_recent_models;
use serde_json::{Map, Value};

/// A configuration loaded for one session.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The user's document exactly as read (empty object when missing).
    pub source_document: Value,
    /// The source document with persisted recent lists overlaid.
    pub effective_document: Value,
    pub snapshot: ConfigSnapshot,
    /// Why the derived document was ignored, if it was.
    pub derived_error: Option<ModelPickError>,
}

pub struct ConfigLoader {
    paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn new(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    /// Loads the source and derived documents and parses the snapshot.
    ///
    /// # Errors
    ///
    /// - `MalformedSnapshot` when the source document has an interpreted key
    ///   in the wrong shape
    /// - `Io` / `Serialization` when the source file cannot be read or parsed
    pub fn load(&self) -> Result<LoadedConfig> {
        let source_path = self.paths.source_file();
        let source_document = DocumentStorage::new(source_path.to_path_buf())
            .load()?
            .unwrap_or_else(|| Value::Object(Map::new()));

        // Validate the source on its own so errors point at the user's file
        ConfigSnapshot::from_document(&source_document)?;

        let (effective_document, derived_error) = match self.overlay_derived(&source_document) {
            Ok(effective) => (effective, None),
            Err(e) => {
                tracing::warn!(
                    "[ConfigLoader] ignoring derived config {}: {}",
                    self.paths.derived_file().display(),
                    e
                );
                (source_document.clone(), Some(e))
            }
        };

        let snapshot = ConfigSnapshot::from_document(&effective_document)?;
        tracing::debug!(
            "[ConfigLoader] loaded {} (auto update disabled: {})",
            source_path.display(),
            snapshot.options().disable_provider_auto_update
        );

        Ok(LoadedConfig {
            source_document,
            effective_document,
            snapshot,
            derived_error,
        })
    }

    /// The source with the derived document's recent lists laid over it.
    fn overlay_derived(&self, source_document: &Value) -> Result<Value> {
        let mut effective = source_document.clone();
        let derived_path = self.paths.derived_file();
        if let Some(derived) = DocumentStorage::new(derived_path.clone()).load()? {
            tracing::debug!(
                "[ConfigLoader] overlaying recent models from {}",
                derived_path.display()
            );
            overlay_recent_models(&mut effective, &derived, None)?;
            ConfigSnapshot::from_document(&effective)?;
        }
        Ok(effective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelpick_core::{RecentEntry, SizeClass};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn paths(temp_dir: &TempDir) -> ConfigPaths {
        ConfigPaths::new(
            temp_dir.path().join("config").join("modelpick.json"),
            temp_dir.path().join("data"),
        )
    }

    fn write_json(path: &std::path::Path, value: &Value) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_vec(value).unwrap()).unwrap();
    }

    #[test]
    fn test_missing_source_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = ConfigLoader::new(paths(&temp_dir)).load().unwrap();

        assert_eq!(loaded.source_document, json!({}));
        assert!(loaded.derived_error.is_none());
        assert!(loaded.snapshot.recents(&SizeClass::large()).is_empty());
    }

    #[test]
    fn test_derived_recents_override_source() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths(&temp_dir);
        write_json(
            paths.source_file(),
            &json!({
                "recent_models": {
                    "large": [ { "provider": "p1", "model": "m2" }, { "provider": "x", "model": "y" } ],
                    "small": [ { "provider": "p1", "model": "m1" } ]
                }
            }),
        );
        write_json(
            &paths.derived_file(),
            &json!({ "recent_models": { "large": [ { "provider": "p1", "model": "m2" } ] } }),
        );

        let loaded = ConfigLoader::new(paths).load().unwrap();

        assert_eq!(
            loaded.snapshot.recents(&SizeClass::large()),
            &[RecentEntry::new("p1", "m2")]
        );
        assert_eq!(
            loaded.snapshot.recents(&SizeClass::small()),
            &[RecentEntry::new("p1", "m1")]
        );
        assert_eq!(
            loaded.source_document["recent_models"]["large"]
                .as_array()
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_unreadable_derived_document_falls_back_to_source() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths(&temp_dir);
        let source = json!({
            "recent_models": { "large": [ { "provider": "p1", "model": "m1" } ] }
        });
        write_json(paths.source_file(), &source);

        for garbage in ["{ truncated", r#"{ "recent_models": { "large": 7 } }"#] {
            fs::create_dir_all(paths.data_dir()).unwrap();
            fs::write(paths.derived_file(), garbage).unwrap();

            let loaded = ConfigLoader::new(paths.clone()).load().unwrap();

            assert!(loaded.derived_error.is_some(), "{garbage} was accepted");
            assert_eq!(loaded.effective_document, source);
            assert_eq!(
                loaded.snapshot.recents(&SizeClass::large()),
                &[RecentEntry::new("p1", "m1")]
            );
        }
    }

    #[test]
    fn test_malformed_source_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths(&temp_dir);
        write_json(paths.source_file(), &json!({ "recent_models": "oops" }));

        let err = ConfigLoader::new(paths).load().unwrap_err();
        assert!(err.is_malformed());
    }
}
