//! Model options: one provider joined with one of its models.

use crate::catalog::{ModelDescriptor, ProviderDescriptor};
use std::sync::Arc;

/// Item ID prefix separating recent entries from catalog entries that share
/// the same underlying model.
pub const RECENT_ID_PREFIX: &str = "recent::";

/// Identity key of a `(provider, model)` pair.
///
/// Returns an empty string when either part is empty. The empty key is a
/// sentinel for "unkeyable" and never matches a real entry.
pub fn model_key(provider_id: &str, model_id: &str) -> String {
    if provider_id.is_empty() || model_id.is_empty() {
        return String::new();
    }
    format!("{provider_id}:{model_id}")
}

/// Item ID of a recent entry, or an empty string when the pair is unkeyable.
pub fn recent_item_id(provider_id: &str, model_id: &str) -> String {
    let key = model_key(provider_id, model_id);
    if key.is_empty() {
        return key;
    }
    format!("{RECENT_ID_PREFIX}{key}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOption {
    pub provider: Arc<ProviderDescriptor>,
    pub model: ModelDescriptor,
}

impl ModelOption {
    pub fn new(provider: Arc<ProviderDescriptor>, model: ModelDescriptor) -> Self {
        Self { provider, model }
    }

    pub fn key(&self) -> String {
        model_key(&self.provider.id, &self.model.id)
    }

    pub fn provider_id(&self) -> &str {
        &self.provider.id
    }

    pub fn model_id(&self) -> &str {
        &self.model.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_key_empty_inputs() {
        assert_eq!(model_key("", "model"), "");
        assert_eq!(model_key("provider", ""), "");
        assert_eq!(model_key("", ""), "");
        assert_eq!(model_key("p", "m"), "p:m");
    }

    #[test]
    fn test_recent_item_id() {
        assert_eq!(recent_item_id("p1", "m2"), "recent::p1:m2");
        assert_eq!(recent_item_id("", "m2"), "");
    }

    #[test]
    fn test_option_key() {
        let provider = Arc::new(ProviderDescriptor::new("p1", "Provider One", vec![]));
        let option = ModelOption::new(provider, ModelDescriptor::new("m1", "Model One"));
        assert_eq!(option.key(), "p1:m1");
        assert_eq!(option.provider_id(), "p1");
        assert_eq!(option.model_id(), "m1");
    }
}
