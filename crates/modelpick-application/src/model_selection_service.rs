//! Model selection use case.
//!
//! One reconciliation pass per size class:
//! `Loaded(source) → Validated(recents) → Merged(derived) → Persisted`.
//! Building the display list never depends on persistence succeeding.

use modelpick_core::error::{ModelPickError, Result};
use modelpick_core::option_list::selectable_catalog;
use modelpick_core::{
    ConfigSnapshot, DerivedConfigRepository, ModelList, OptionItem, OptionListBuilder,
    ProviderCatalog, ProviderDescriptor, RecentEntry, SizeClass, validate_recents,
};
use modelpick_infrastructure::{
    ConfigLoader, ConfigPaths, FileDerivedConfigRepository, LoadedConfig, load_cached_providers,
};
use serde_json::Value;
use std::sync::Arc;

/// Result of opening the model list for a size class.
#[derive(Debug)]
pub struct PreparedList {
    pub list: ModelList,
    /// Recent entries that survived validation, in their recorded order.
    pub validated: Vec<RecentEntry>,
    /// Outcome of persisting the pruned recents. The list is usable either way.
    pub persisted: Result<()>,
}

pub struct ModelSelectionService {
    catalog: ProviderCatalog,
    config: LoadedConfig,
    repository: Arc<dyn DerivedConfigRepository>,
}

impl ModelSelectionService {
    pub fn new(
        catalog: ProviderCatalog,
        config: LoadedConfig,
        repository: Arc<dyn DerivedConfigRepository>,
    ) -> Self {
        Self {
            catalog,
            config,
            repository,
        }
    }

    /// Wires the service from file locations.
    ///
    /// The catalog is `bundled` merged with the provider cache found in the
    /// data directory. An unreadable cache only loses its providers.
    pub fn from_paths(paths: ConfigPaths, bundled: Vec<ProviderDescriptor>) -> Result<Self> {
        let cache_file = paths.providers_cache_file();
        let cached = load_cached_providers(&cache_file).unwrap_or_else(|e| {
            tracing::warn!(
                "[ModelSelectionService] ignoring provider cache {}: {}",
                cache_file.display(),
                e
            );
            Vec::new()
        });
        let catalog = ProviderCatalog::from_sources([bundled, cached]);
        let repository = Arc::new(FileDerivedConfigRepository::new(&paths)?);
        let config = ConfigLoader::new(paths).load()?;

        tracing::debug!(
            "[ModelSelectionService] catalog has {} providers",
            catalog.len()
        );
        Ok(Self::new(catalog, config, repository))
    }

    pub fn snapshot(&self) -> &ConfigSnapshot {
        &self.config.snapshot
    }

    pub fn source_document(&self) -> &Value {
        &self.config.source_document
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    /// Why persisted recency state was ignored at load time, if it was.
    pub fn derived_error(&self) -> Option<&ModelPickError> {
        self.config.derived_error.as_ref()
    }

    /// Recents for `size_class` that still resolve.
    pub fn validated_recents(&self, size_class: &SizeClass) -> Vec<RecentEntry> {
        let selectable = selectable_catalog(&self.catalog, self.snapshot());
        validate_recents(self.snapshot().recents(size_class), &selectable)
    }

    /// Builds the display groups without touching storage.
    pub fn build_list(&self, size_class: &SizeClass) -> ModelList {
        OptionListBuilder::new(&self.catalog, self.snapshot()).build(size_class)
    }

    /// Validates and persists the recents of one size class.
    ///
    /// # Errors
    ///
    /// - `MalformedSnapshot` when the source document cannot be reconciled;
    ///   nothing is written
    /// - persistence errors from the repository
    pub async fn reconcile(&self, size_class: &SizeClass) -> Result<Vec<RecentEntry>> {
        let validated = self.validated_recents(size_class);
        self.repository
            .replace_recents(self.source_document(), size_class, &validated)
            .await?;
        Ok(validated)
    }

    /// Builds the list and reconciles the size class in one pass.
    pub async fn open(&self, size_class: &SizeClass) -> PreparedList {
        let list = self.build_list(size_class);
        let validated = self.validated_recents(size_class);

        let persisted = self
            .repository
            .replace_recents(self.source_document(), size_class, &validated)
            .await
            .map(|_| ());
        if let Err(e) = &persisted {
            tracing::warn!(
                "[ModelSelectionService] could not persist recent models for '{}': {}",
                size_class,
                e
            );
        }

        PreparedList {
            list,
            validated,
            persisted,
        }
    }

    /// Records a list item as the most recent selection.
    pub async fn select(
        &self,
        size_class: &SizeClass,
        item: &OptionItem,
    ) -> Result<Vec<RecentEntry>> {
        self.select_model(size_class, item.option.provider_id(), item.option.model_id())
            .await
    }

    /// Records `(provider, model)` as the most recent selection.
    ///
    /// # Errors
    ///
    /// `NotFound` when the pair is not selectable; nothing is written.
    pub async fn select_model(
        &self,
        size_class: &SizeClass,
        provider_id: &str,
        model_id: &str,
    ) -> Result<Vec<RecentEntry>> {
        let selectable = selectable_catalog(&self.catalog, self.snapshot());
        if selectable.resolve(provider_id, model_id).is_none() {
            return Err(ModelPickError::not_found(
                "Model",
                format!("{provider_id}/{model_id}"),
            ));
        }

        tracing::debug!(
            "[ModelSelectionService] recording {}/{} for '{}'",
            provider_id,
            model_id,
            size_class
        );
        self.repository
            .record_recent(
                self.source_document(),
                size_class,
                RecentEntry::new(provider_id, model_id),
                &selectable,
            )
            .await
    }
}
