//! Recent-model validation and recording.
//!
//! Both functions are pure: they take the current entries and return a new
//! list, leaving persistence to the caller.

use crate::catalog::ProviderCatalog;
use crate::option::model_key;
use crate::snapshot::RecentEntry;
use std::collections::HashSet;

/// Maximum number of recent entries kept per size class.
pub const MAX_RECENT_MODELS: usize = 5;

/// Keeps only the entries whose provider and model resolve in `catalog`.
///
/// Relative order is preserved and nothing is added. Entries with an empty
/// provider or model ID never resolve. A key listed twice keeps only its
/// first occurrence.
pub fn validate_recents(entries: &[RecentEntry], catalog: &ProviderCatalog) -> Vec<RecentEntry> {
    let mut seen = HashSet::new();
    let validated: Vec<RecentEntry> = entries
        .iter()
        .filter(|entry| catalog.resolve(&entry.provider, &entry.model).is_some())
        .filter(|entry| seen.insert(model_key(&entry.provider, &entry.model)))
        .cloned()
        .collect();

    let pruned = entries.len() - validated.len();
    if pruned > 0 {
        tracing::debug!(
            "[RecencyValidator] pruned {} of {} recent entries",
            pruned,
            entries.len()
        );
    }

    validated
}

/// Records `entry` as the most recent selection.
///
/// The entry moves to the front, earlier occurrences of the same key are
/// dropped along with unkeyable entries, and the list is cut to `limit`.
pub fn record_recent(entries: &[RecentEntry], entry: RecentEntry, limit: usize) -> Vec<RecentEntry> {
    let mut seen = HashSet::new();
    std::iter::once(entry)
        .chain(entries.iter().cloned())
        .filter(|e| {
            let key = model_key(&e.provider, &e.model);
            !key.is_empty() && seen.insert(key)
        })
        .take(limit)
        .collect()
}
