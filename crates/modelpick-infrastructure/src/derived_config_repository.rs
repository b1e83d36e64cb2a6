//! File-backed derived configuration repository.
//!
//! Writes reconciled recency state to the derived document in the data
//! directory. The source document is only ever passed in by value; this
//! repository has no handle on the source file.

use crate::paths::ConfigPaths;
use crate::storage::DocumentStorage;
use async_trait::async_trait;
use modelpick_core::error::{ModelPickError, Result};
use modelpick_core::recency::{MAX_RECENT_MODELS, record_recent, validate_recents};
use modelpick_core::reconcile::{overlay_recent_models, reconcile_document, recents_in};
use modelpick_core::{DerivedConfigRepository, ProviderCatalog, RecentEntry, SizeClass};
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Stores the derived document with locked, atomic read-merge-write updates.
#[derive(Clone)]
pub struct FileDerivedConfigRepository {
    storage: Arc<DocumentStorage>,
}

impl FileDerivedConfigRepository {
    /// Creates a repository for the derived file of `paths`.
    ///
    /// Fails with a `Config` error when the derived file would be the source
    /// file itself, including when neither file exists yet.
    pub fn new(paths: &ConfigPaths) -> Result<Self> {
        Self::with_paths(paths.source_file(), &paths.derived_file())
    }

    pub fn with_paths(source_file: &Path, derived_file: &Path) -> Result<Self> {
        if same_file(source_file, derived_file) {
            return Err(ModelPickError::config(format!(
                "derived config path must differ from the source config path ({})",
                source_file.display()
            )));
        }

        Ok(Self {
            storage: Arc::new(DocumentStorage::new(derived_file.to_path_buf())),
        })
    }

    pub fn derived_file(&self) -> &Path {
        self.storage.path()
    }

    async fn run_blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&DocumentStorage) -> Result<T> + Send + 'static,
    {
        let storage = self.storage.clone();
        tokio::task::spawn_blocking(move || f(&storage))
            .await
            .map_err(|e| ModelPickError::internal(format!("Failed to join task: {}", e)))?
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    a == b || resolve_location(a) == resolve_location(b)
}

/// Where `path` points once written.
///
/// The longest existing ancestor is canonicalized and the remaining
/// components are applied lexically, so files that do not exist yet still
/// compare equal to their eventual location.
fn resolve_location(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let components: Vec<Component> = absolute.components().collect();
    for split in (1..=components.len()).rev() {
        let ancestor: PathBuf = components[..split].iter().collect();
        let Ok(mut resolved) = ancestor.canonicalize() else {
            continue;
        };
        for component in &components[split..] {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::CurDir => {}
                other => resolved.push(other),
            }
        }
        return resolved;
    }
    absolute
}

#[async_trait]
impl DerivedConfigRepository for FileDerivedConfigRepository {
    async fn replace_recents(
        &self,
        source: &Value,
        size_class: &SizeClass,
        recents: &[RecentEntry],
    ) -> Result<Value> {
        let source = source.clone();
        let class = size_class.clone();
        let recents = recents.to_vec();
        let count = recents.len();

        let written = self
            .run_blocking(move |storage| {
                storage.update(|current| -> Result<Value> {
                    let mut derived = reconcile_document(&source, &class, &recents)?;
                    if let Some(previous) = current.as_ref() {
                        overlay_recent_models(&mut derived, previous, Some(&class))?;
                    }
                    Ok(derived)
                })
            })
            .await?;

        tracing::info!(
            "[FileDerivedConfigRepository] wrote {} recent entries for '{}' to {}",
            count,
            size_class,
            self.derived_file().display()
        );
        Ok(written)
    }

    async fn record_recent(
        &self,
        source: &Value,
        size_class: &SizeClass,
        entry: RecentEntry,
        selectable: &ProviderCatalog,
    ) -> Result<Vec<RecentEntry>> {
        let source = source.clone();
        let class = size_class.clone();
        let selectable = selectable.clone();

        let written = self
            .run_blocking(move |storage| {
                storage.update(|current| -> Result<Value> {
                    let mut effective = source.clone();
                    if let Some(previous) = current.as_ref() {
                        overlay_recent_models(&mut effective, previous, None)?;
                    }
                    let persisted = recents_in(&effective, &class)?;
                    let existing = validate_recents(&persisted, &selectable);
                    let updated = record_recent(&existing, entry, MAX_RECENT_MODELS);

                    let mut derived = reconcile_document(&source, &class, &updated)?;
                    if let Some(previous) = current.as_ref() {
                        overlay_recent_models(&mut derived, previous, Some(&class))?;
                    }
                    Ok(derived)
                })
            })
            .await?;

        let recents = recents_in(&written, size_class)?;
        tracing::info!(
            "[FileDerivedConfigRepository] recorded selection for '{}' ({} recent entries)",
            size_class,
            recents.len()
        );
        Ok(recents)
    }
}
