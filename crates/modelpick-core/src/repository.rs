//! Derived configuration repository trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::catalog::ProviderCatalog;
use crate::error::Result;
use crate::snapshot::{RecentEntry, SizeClass};

/// Persists recent-model state to the derived configuration document.
///
/// The derived document lives apart from the user-edited source document and
/// is the only thing implementations write. Every write is a serialized
/// read-merge-write so that concurrent passes for different size classes do
/// not overwrite each other.
#[async_trait]
pub trait DerivedConfigRepository: Send + Sync {
    /// Writes a copy of `source` whose `recent_models[size_class]` is `recents`.
    ///
    /// Other size classes keep the lists already persisted in the derived
    /// document. Returns the document that was written.
    async fn replace_recents(
        &self,
        source: &Value,
        size_class: &SizeClass,
        recents: &[RecentEntry],
    ) -> Result<Value>;

    /// Records `entry` as the most recent selection for `size_class`.
    ///
    /// The existing list is validated against `selectable` before `entry` is
    /// put in front of it. Returns the size class's resulting recent list.
    async fn record_recent(
        &self,
        source: &Value,
        size_class: &SizeClass,
        entry: RecentEntry,
        selectable: &ProviderCatalog,
    ) -> Result<Vec<RecentEntry>>;
}
