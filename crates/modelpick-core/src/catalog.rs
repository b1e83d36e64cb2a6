//! Provider catalog domain models.
//!
//! A catalog is the set of providers the running process can offer, each with
//! an ordered set of models. Catalogs are assembled from several overlapping
//! source lists (bundled providers, the on-disk provider cache, providers the
//! user configured by hand); providers sharing an ID are treated as one
//! logical provider whose model set is the union of all sources.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A single model offered by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    #[serde(rename = "name", default)]
    pub display_name: String,
    #[serde(default)]
    pub default_max_tokens: u64,
}

impl ModelDescriptor {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            default_max_tokens: 0,
        }
    }

    pub fn with_default_max_tokens(mut self, tokens: u64) -> Self {
        self.default_max_tokens = tokens;
        self
    }
}

/// A named source of models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub id: String,
    #[serde(rename = "name", default)]
    pub display_name: String,
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

impl ProviderDescriptor {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        models: Vec<ModelDescriptor>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            models,
        }
    }

    /// Looks up a model by ID.
    pub fn model(&self, model_id: &str) -> Option<&ModelDescriptor> {
        if model_id.is_empty() {
            return None;
        }
        self.models.iter().find(|m| m.id == model_id)
    }

    /// Label used for display, falling back to the ID when no name is known.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.id
        } else {
            &self.display_name
        }
    }

    /// Adds every model of `other` whose ID is not yet present, keeping the
    /// existing order and appending new models in `other`'s order.
    fn absorb(&mut self, other: &ProviderDescriptor) {
        if self.display_name.is_empty() {
            self.display_name = other.display_name.clone();
        }
        let mut seen: HashSet<String> = self.models.iter().map(|m| m.id.clone()).collect();
        for model in &other.models {
            if !model.id.is_empty() && seen.insert(model.id.clone()) {
                self.models.push(model.clone());
            }
        }
    }

    /// Drops empty and repeated model IDs.
    fn normalized(&self) -> ProviderDescriptor {
        let mut out = ProviderDescriptor::new(self.id.clone(), self.display_name.clone(), Vec::new());
        out.absorb(self);
        out
    }
}

/// The providers available to the running process.
///
/// Provider order is the order in which IDs were first seen across sources.
#[derive(Debug, Clone, Default)]
pub struct ProviderCatalog {
    providers: Vec<Arc<ProviderDescriptor>>,
    index: HashMap<String, usize>,
}

impl ProviderCatalog {
    /// Creates a catalog from a single source list.
    pub fn new(providers: Vec<ProviderDescriptor>) -> Self {
        Self::from_sources([providers])
    }

    /// Creates a catalog from several overlapping source lists.
    ///
    /// Providers with the same ID are merged into one logical provider and
    /// their model sets are unioned by model ID, so a model described by any
    /// source appears exactly once. Providers with an empty ID are skipped.
    pub fn from_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = ProviderDescriptor>,
    {
        let mut merged: Vec<ProviderDescriptor> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for source in sources {
            for provider in source {
                if provider.id.is_empty() {
                    continue;
                }
                match index.get(&provider.id) {
                    Some(&pos) => merged[pos].absorb(&provider),
                    None => {
                        index.insert(provider.id.clone(), merged.len());
                        merged.push(provider.normalized());
                    }
                }
            }
        }

        Self {
            providers: merged.into_iter().map(Arc::new).collect(),
            index,
        }
    }

    /// Returns a new catalog with `extra` merged in after the existing providers.
    pub fn merged_with(&self, extra: Vec<ProviderDescriptor>) -> Self {
        let existing: Vec<ProviderDescriptor> =
            self.providers.iter().map(|p| p.as_ref().clone()).collect();
        Self::from_sources([existing, extra])
    }

    /// Returns a new catalog without the given provider IDs.
    pub fn without(&self, provider_ids: &HashSet<String>) -> Self {
        let kept: Vec<ProviderDescriptor> = self
            .providers
            .iter()
            .filter(|p| !provider_ids.contains(&p.id))
            .map(|p| p.as_ref().clone())
            .collect();
        Self::new(kept)
    }

    pub fn providers(&self) -> &[Arc<ProviderDescriptor>] {
        &self.providers
    }

    pub fn provider(&self, provider_id: &str) -> Option<&Arc<ProviderDescriptor>> {
        self.index.get(provider_id).map(|&pos| &self.providers[pos])
    }

    pub fn contains_provider(&self, provider_id: &str) -> bool {
        self.index.contains_key(provider_id)
    }

    /// Resolves a `(provider, model)` pair. Empty IDs never resolve.
    pub fn resolve(
        &self,
        provider_id: &str,
        model_id: &str,
    ) -> Option<(&Arc<ProviderDescriptor>, &ModelDescriptor)> {
        if provider_id.is_empty() || model_id.is_empty() {
            return None;
        }
        let provider = self.provider(provider_id)?;
        let model = provider.model(model_id)?;
        Some((provider, model))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
