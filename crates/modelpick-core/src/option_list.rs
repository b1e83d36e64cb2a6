//! Grouped, deduplicated model option lists.
//!
//! The builder produces display groups for a list widget: a "Recently used"
//! group first, then one group per provider. Recent items live in their own
//! ID namespace (`recent::<provider>:<model>`), so the same model may appear
//! both as a recent item and in its provider group. Within and across
//! provider groups every `<provider>:<model>` key appears at most once.

use crate::catalog::ProviderCatalog;
use crate::option::{ModelOption, model_key, recent_item_id};
use crate::recency::validate_recents;
use crate::snapshot::{ConfigSnapshot, RecentEntry, SizeClass};
use std::collections::HashSet;

pub const RECENT_GROUP_LABEL: &str = "Recently used";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOrigin {
    Recent,
    Provider,
}

/// A selectable list entry with a string identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionItem {
    pub id: String,
    pub option: ModelOption,
    pub origin: ItemOrigin,
}

impl OptionItem {
    pub fn is_recent(&self) -> bool {
        self.origin == ItemOrigin::Recent
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup {
    pub label: String,
    /// `None` for the recent group.
    pub provider_id: Option<String>,
    pub items: Vec<OptionItem>,
}

/// Result of one list build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelList {
    pub groups: Vec<OptionGroup>,
    /// Item ID of the size class's current assignment, when it resolves.
    pub selected: Option<String>,
}

impl ModelList {
    pub fn items(&self) -> impl Iterator<Item = &OptionItem> {
        self.groups.iter().flat_map(|g| g.items.iter())
    }

    pub fn recent_items(&self) -> impl Iterator<Item = &OptionItem> {
        self.items().filter(|item| item.is_recent())
    }

    pub fn find(&self, id: &str) -> Option<&OptionItem> {
        self.items().find(|item| item.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// The catalog merged with the snapshot's configured providers.
///
/// Configured providers sharing a catalog ID extend that provider's model
/// set; the rest are appended after the catalog providers in configuration
/// order. Providers configured with `disable: true` are removed entirely.
pub fn selectable_catalog(catalog: &ProviderCatalog, snapshot: &ConfigSnapshot) -> ProviderCatalog {
    let configured = snapshot.configured_providers();

    let disabled: HashSet<String> = configured
        .iter()
        .filter(|p| p.disabled)
        .map(|p| p.id.clone())
        .collect();
    for id in &disabled {
        tracing::debug!("[OptionListBuilder] provider '{}' is disabled", id);
    }

    let extra = configured
        .iter()
        .filter(|p| !p.disabled)
        .map(|p| p.to_descriptor())
        .collect();

    catalog.merged_with(extra).without(&disabled)
}

pub struct OptionListBuilder<'a> {
    catalog: &'a ProviderCatalog,
    snapshot: &'a ConfigSnapshot,
}

impl<'a> OptionListBuilder<'a> {
    pub fn new(catalog: &'a ProviderCatalog, snapshot: &'a ConfigSnapshot) -> Self {
        Self { catalog, snapshot }
    }

    /// Builds the display groups for `size_class`.
    pub fn build(&self, size_class: &SizeClass) -> ModelList {
        let selectable = selectable_catalog(self.catalog, self.snapshot);
        let validated = validate_recents(self.snapshot.recents(size_class), &selectable);

        let mut groups = Vec::with_capacity(selectable.len() + 1);

        let recent = recent_group(&selectable, &validated);
        if !recent.items.is_empty() {
            groups.push(recent);
        }

        let mut seen_keys: HashSet<String> = HashSet::new();
        for provider in selectable.providers() {
            let items: Vec<OptionItem> = provider
                .models
                .iter()
                .filter_map(|model| {
                    let key = model_key(&provider.id, &model.id);
                    if key.is_empty() || !seen_keys.insert(key.clone()) {
                        return None;
                    }
                    Some(OptionItem {
                        id: key,
                        option: ModelOption::new(provider.clone(), model.clone()),
                        origin: ItemOrigin::Provider,
                    })
                })
                .collect();

            if items.is_empty() {
                continue;
            }
            groups.push(OptionGroup {
                label: provider.label().to_string(),
                provider_id: Some(provider.id.clone()),
                items,
            });
        }

        let selected = self
            .snapshot
            .model_assignment(size_class)
            .filter(|s| selectable.resolve(&s.provider, &s.model).is_some())
            .map(|s| model_key(&s.provider, &s.model));

        tracing::debug!(
            "[OptionListBuilder] built {} groups for size class '{}' ({} recent)",
            groups.len(),
            size_class,
            validated.len()
        );

        ModelList { groups, selected }
    }
}

fn recent_group(selectable: &ProviderCatalog, validated: &[RecentEntry]) -> OptionGroup {
    let items = validated
        .iter()
        .filter_map(|entry| {
            let (provider, model) = selectable.resolve(&entry.provider, &entry.model)?;
            Some(OptionItem {
                id: recent_item_id(&provider.id, &model.id),
                option: ModelOption::new(provider.clone(), model.clone()),
                origin: ItemOrigin::Recent,
            })
        })
        .collect();

    OptionGroup {
        label: RECENT_GROUP_LABEL.to_string(),
        provider_id: None,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ModelDescriptor, ProviderDescriptor};
    use crate::option::RECENT_ID_PREFIX;
    use serde_json::json;
    use std::collections::HashMap;

    fn provider(id: &str, name: &str, models: &[&str]) -> ProviderDescriptor {
        ProviderDescriptor::new(
            id,
            name,
            models.iter().map(|m| ModelDescriptor::new(*m, *m)).collect(),
        )
    }

    fn snapshot(doc: serde_json::Value) -> ConfigSnapshot {
        ConfigSnapshot::from_document(&doc).unwrap()
    }

    fn provider_key_counts(list: &ModelList) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for item in list.items().filter(|i| !i.is_recent()) {
            *counts.entry(item.option.key()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_recent_section_prunes_invalid() {
        let catalog = ProviderCatalog::new(vec![provider("p1", "Provider One", &["m1", "m2"])]);
        let snapshot = snapshot(json!({
            "models": { "large": { "model": "m1", "provider": "p1" } },
            "recent_models": { "large": [
                { "model": "m2", "provider": "p1" },
                { "model": "x", "provider": "unknown-provider" }
            ] }
        }));

        let list = OptionListBuilder::new(&catalog, &snapshot).build(&SizeClass::large());

        let recent_ids: Vec<&str> = list.recent_items().map(|i| i.id.as_str()).collect();
        assert_eq!(recent_ids, vec!["recent::p1:m2"]);
        assert_eq!(list.groups[0].label, RECENT_GROUP_LABEL);
        assert_eq!(list.groups[1].label, "Provider One");
        assert_eq!(list.selected.as_deref(), Some("p1:m1"));
    }

    #[test]
    fn test_recent_item_also_appears_in_provider_group() {
        let catalog = ProviderCatalog::new(vec![provider("p1", "Provider One", &["m1", "m2"])]);
        let snapshot = snapshot(json!({
            "recent_models": { "large": [ { "model": "m2", "provider": "p1" } ] }
        }));

        let list = OptionListBuilder::new(&catalog, &snapshot).build(&SizeClass::large());

        assert!(list.find("recent::p1:m2").is_some());
        assert!(list.find("p1:m2").is_some());
        assert_eq!(list.items().count(), 3);
    }

    #[test]
    fn test_no_recent_group_when_all_invalid() {
        let catalog = ProviderCatalog::new(vec![provider("p1", "Provider One", &["m1"])]);
        let snapshot = snapshot(json!({
            "recent_models": { "large": [
                { "model": "x", "provider": "unknown1" },
                { "model": "y", "provider": "unknown2" }
            ] }
        }));

        let list = OptionListBuilder::new(&catalog, &snapshot).build(&SizeClass::large());

        assert_eq!(list.recent_items().count(), 0);
        assert!(list.groups.iter().all(|g| g.label != RECENT_GROUP_LABEL));
        assert!(!list.is_empty());
    }

    #[test]
    fn test_configured_and_catalog_provider_are_not_duplicated() {
        let catalog = ProviderCatalog::new(vec![provider(
            "gpt-oss",
            "GPT OSS",
            &["gpt-oss-120b", "qwen3-next", "devstral2"],
        )]);
        let snapshot = snapshot(json!({
            "models": { "large": { "model": "gpt-oss-120b", "provider": "gpt-oss" } },
            "providers": { "gpt-oss": {
                "api_key": "$GPT_OSS_API_KEY",
                "models": [
                    { "id": "gpt-oss-120b", "name": "GPT OSS 120B" },
                    { "id": "qwen3-next", "name": "Qwen3 Next" }
                ]
            } }
        }));

        let list = OptionListBuilder::new(&catalog, &snapshot).build(&SizeClass::large());
        let counts = provider_key_counts(&list);

        assert!(counts.values().all(|&n| n == 1), "duplicates: {counts:?}");
        assert_eq!(counts.get("gpt-oss:gpt-oss-120b"), Some(&1));
        assert_eq!(counts.get("gpt-oss:qwen3-next"), Some(&1));
        assert_eq!(list.groups.len(), 1);
        assert_eq!(list.groups[0].label, "GPT OSS");
    }

    #[test]
    fn test_overlapping_provider_sources_union_models() {
        let catalog = ProviderCatalog::new(vec![provider("p1", "Provider One", &["m1", "m2"])]);
        let snapshot = snapshot(json!({
            "providers": { "p1": { "models": [ { "id": "m2" }, { "id": "m3" } ] } }
        }));

        let list = OptionListBuilder::new(&catalog, &snapshot).build(&SizeClass::large());
        let group = list
            .groups
            .iter()
            .find(|g| g.provider_id.as_deref() == Some("p1"))
            .unwrap();
        let ids: Vec<&str> = group.items.iter().map(|i| i.option.model_id()).collect();

        assert_eq!(ids, vec!["m1", "m2", "m3"]);
    }

    #[test]
    fn test_uncataloged_configured_provider_gets_group_after_catalog() {
        let catalog = ProviderCatalog::new(vec![provider("p1", "Provider One", &["m1"])]);
        let snapshot = snapshot(json!({
            "providers": {
                "local": { "name": "Local Box", "models": [ { "id": "llama" } ] },
                "bare": { "models": [ { "id": "tiny" } ] }
            },
            "recent_models": { "large": [ { "provider": "local", "model": "llama" } ] }
        }));

        let list = OptionListBuilder::new(&catalog, &snapshot).build(&SizeClass::large());
        let labels: Vec<&str> = list.groups.iter().map(|g| g.label.as_str()).collect();

        assert_eq!(labels, vec![RECENT_GROUP_LABEL, "Provider One", "Local Box", "bare"]);
        assert!(list.find("recent::local:llama").is_some());
    }

    #[test]
    fn test_disabled_provider_is_hidden() {
        let catalog = ProviderCatalog::new(vec![
            provider("p1", "Provider One", &["m1"]),
            provider("p2", "Provider Two", &["m2"]),
        ]);
        let snapshot = snapshot(json!({
            "providers": { "p2": { "disable": true } },
            "recent_models": { "large": [ { "provider": "p2", "model": "m2" } ] }
        }));

        let list = OptionListBuilder::new(&catalog, &snapshot).build(&SizeClass::large());

        assert!(list.groups.iter().all(|g| g.provider_id.as_deref() != Some("p2")));
        assert_eq!(list.recent_items().count(), 0);
    }

    #[test]
    fn test_size_classes_are_independent() {
        let catalog = ProviderCatalog::new(vec![provider("p1", "Provider One", &["m1", "m2"])]);
        let snapshot = snapshot(json!({
            "recent_models": {
                "large": [ { "provider": "p1", "model": "m1" } ],
                "small": [ { "provider": "p1", "model": "m2" } ]
            }
        }));
        let builder = OptionListBuilder::new(&catalog, &snapshot);

        let large: Vec<String> = builder
            .build(&SizeClass::large())
            .recent_items()
            .map(|i| i.id.clone())
            .collect();
        let small: Vec<String> = builder
            .build(&SizeClass::small())
            .recent_items()
            .map(|i| i.id.clone())
            .collect();

        assert_eq!(large, vec!["recent::p1:m1"]);
        assert_eq!(small, vec!["recent::p1:m2"]);
    }

    #[test]
    fn test_every_item_has_a_key_and_recent_ids_are_prefixed() {
        let catalog = ProviderCatalog::from_sources([
            vec![provider("p1", "One", &["m1", "", "m2"]), provider("", "Nameless", &["m1"])],
            vec![provider("p1", "One again", &["m2", "m3"])],
        ]);
        let snapshot = snapshot(json!({
            "recent_models": { "large": [
                { "provider": "p1", "model": "m3" },
                { "provider": "p1", "model": "m3" },
                { "provider": "", "model": "m1" }
            ] }
        }));

        let list = OptionListBuilder::new(&catalog, &snapshot).build(&SizeClass::large());

        for item in list.items() {
            assert!(!item.option.key().is_empty());
            assert_eq!(item.is_recent(), item.id.starts_with(RECENT_ID_PREFIX));
        }
        assert_eq!(list.recent_items().count(), 1);
        assert_eq!(provider_key_counts(&list).len(), 3);
    }

    #[test]
    fn test_unresolvable_assignment_is_not_selected() {
        let catalog = ProviderCatalog::new(vec![provider("p1", "Provider One", &["m1"])]);
        let snapshot = snapshot(json!({
            "models": { "large": { "model": "gone", "provider": "p1" } }
        }));

        let list = OptionListBuilder::new(&catalog, &snapshot).build(&SizeClass::large());
        assert_eq!(list.selected, None);
    }
}
