//! Read-only view of the user's configuration document.
//!
//! The configuration document is held as an opaque `serde_json::Value`; only
//! the keys below are interpreted:
//!
//! ```text
//! {
//!   "options":       { "disable_provider_auto_update": bool },
//!   "models":        { "<size class>": { "provider": "..", "model": "..", ... } },
//!   "recent_models": { "<size class>": [ { "provider": "..", "model": ".." } ] },
//!   "providers":     { "<id>": { "name": "..", "disable": bool, "models": [ { "id": "..", "name": ".." } ] } }
//! }
//! ```

use crate::catalog::{ModelDescriptor, ProviderDescriptor};
use crate::error::{ModelPickError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

pub const MODELS_KEY: &str = "models";
pub const RECENT_MODELS_KEY: &str = "recent_models";
pub const PROVIDERS_KEY: &str = "providers";
pub const OPTIONS_KEY: &str = "options";

/// A named bucket under which one model assignment and one recent-model
/// history are tracked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SizeClass(String);

impl SizeClass {
    pub const LARGE: &'static str = "large";
    pub const SMALL: &'static str = "small";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn large() -> Self {
        Self::new(Self::LARGE)
    }

    pub fn small() -> Self {
        Self::new(Self::SMALL)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SizeClass {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A persisted record of a previously selected provider/model pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecentEntry {
    pub provider: String,
    pub model: String,
}

impl RecentEntry {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }
}

/// The current model assignment of a size class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedModel {
    pub provider: String,
    pub model: String,
}

/// A provider declared in the configuration's `providers` map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredProvider {
    pub id: String,
    pub name: Option<String>,
    pub models: Vec<ModelDescriptor>,
    pub disabled: bool,
}

impl ConfiguredProvider {
    pub fn to_descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor::new(
            self.id.clone(),
            self.name.clone().unwrap_or_default(),
            self.models.clone(),
        )
    }
}

/// Operator options. Read, never written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotOptions {
    pub disable_provider_auto_update: bool,
}

/// Immutable, parsed view of a configuration document.
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    models: HashMap<SizeClass, SelectedModel>,
    recent_models: HashMap<SizeClass, Vec<RecentEntry>>,
    providers: Vec<ConfiguredProvider>,
    options: SnapshotOptions,
}

impl ConfigSnapshot {
    /// Parses the interpreted keys of a configuration document.
    ///
    /// Unknown keys are ignored. A key that is present with the wrong shape
    /// yields [`ModelPickError::MalformedSnapshot`]. Recent entries with
    /// missing fields are kept with empty IDs; validation prunes them later.
    pub fn from_document(document: &Value) -> Result<Self> {
        let root = match document {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::default()),
            other => {
                return Err(ModelPickError::malformed(
                    "$",
                    format!("expected an object, found {}", kind(other)),
                ));
            }
        };

        Ok(Self {
            models: parse_models(root)?,
            recent_models: parse_recent_models(root)?,
            providers: parse_providers(root)?,
            options: parse_options(root)?,
        })
    }

    /// Recent entries recorded for a size class; empty when none.
    pub fn recents(&self, size_class: &SizeClass) -> &[RecentEntry] {
        self.recent_models
            .get(size_class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn model_assignment(&self, size_class: &SizeClass) -> Option<&SelectedModel> {
        self.models.get(size_class)
    }

    pub fn configured_providers(&self) -> &[ConfiguredProvider] {
        &self.providers
    }

    pub fn options(&self) -> &SnapshotOptions {
        &self.options
    }

    /// Size classes that have an assignment or recent history, sorted by name.
    pub fn size_classes(&self) -> Vec<SizeClass> {
        let mut classes: Vec<SizeClass> = self
            .models
            .keys()
            .chain(self.recent_models.keys())
            .cloned()
            .collect();
        classes.sort();
        classes.dedup();
        classes
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Returns the object at `key`, `None` when absent or null.
fn optional_object<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<&'a Map<String, Value>>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(inner)) => Ok(Some(inner)),
        Some(other) => Err(ModelPickError::malformed(
            path,
            format!("expected an object, found {}", kind(other)),
        )),
    }
}

/// Returns the string at `key`, empty when absent or null.
fn optional_string(map: &Map<String, Value>, key: &str, path: &str) -> Result<String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ModelPickError::malformed(
            format!("{path}.{key}"),
            format!("expected a string, found {}", kind(other)),
        )),
    }
}

fn parse_models(root: &Map<String, Value>) -> Result<HashMap<SizeClass, SelectedModel>> {
    let mut models = HashMap::new();
    let Some(map) = optional_object(root, MODELS_KEY, MODELS_KEY)? else {
        return Ok(models);
    };

    for class in map.keys() {
        let path = format!("{MODELS_KEY}.{class}");
        let Some(assignment) = optional_object(map, class, &path)? else {
            continue;
        };
        models.insert(
            SizeClass::new(class.clone()),
            SelectedModel {
                provider: optional_string(assignment, "provider", &path)?,
                model: optional_string(assignment, "model", &path)?,
            },
        );
    }
    Ok(models)
}

/// Parses one size class's recent list. `null` reads as empty.
pub(crate) fn parse_recent_list(value: &Value, path: &str) -> Result<Vec<RecentEntry>> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(ModelPickError::malformed(
                path,
                format!("expected an array, found {}", kind(other)),
            ));
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let item_path = format!("{path}[{i}]");
            match item {
                Value::Object(entry) => Ok(RecentEntry {
                    provider: optional_string(entry, "provider", &item_path)?,
                    model: optional_string(entry, "model", &item_path)?,
                }),
                other => Err(ModelPickError::malformed(
                    item_path,
                    format!("expected an object, found {}", kind(other)),
                )),
            }
        })
        .collect()
}

fn parse_recent_models(
    root: &Map<String, Value>,
) -> Result<HashMap<SizeClass, Vec<RecentEntry>>> {
    let mut recents = HashMap::new();
    let Some(map) = optional_object(root, RECENT_MODELS_KEY, RECENT_MODELS_KEY)? else {
        return Ok(recents);
    };

    for (class, value) in map {
        let path = format!("{RECENT_MODELS_KEY}.{class}");
        recents.insert(SizeClass::new(class.clone()), parse_recent_list(value, &path)?);
    }
    Ok(recents)
}

fn parse_providers(root: &Map<String, Value>) -> Result<Vec<ConfiguredProvider>> {
    let Some(map) = optional_object(root, PROVIDERS_KEY, PROVIDERS_KEY)? else {
        return Ok(Vec::new());
    };

    let mut providers = Vec::with_capacity(map.len());
    for id in map.keys() {
        let path = format!("{PROVIDERS_KEY}.{id}");
        let Some(entry) = optional_object(map, id, &path)? else {
            continue;
        };

        let name = optional_string(entry, "name", &path)?;
        let disabled = match entry.get("disable") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(ModelPickError::malformed(
                    format!("{path}.disable"),
                    format!("expected a boolean, found {}", kind(other)),
                ));
            }
        };

        let models = match entry.get("models") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let model_path = format!("{path}.models[{i}]");
                    serde_json::from_value::<ModelDescriptor>(item.clone())
                        .map_err(|e| ModelPickError::malformed(model_path, e.to_string()))
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(ModelPickError::malformed(
                    format!("{path}.models"),
                    format!("expected an array, found {}", kind(other)),
                ));
            }
        };

        providers.push(ConfiguredProvider {
            id: id.clone(),
            name: (!name.is_empty()).then_some(name),
            models,
            disabled,
        });
    }
    Ok(providers)
}

fn parse_options(root: &Map<String, Value>) -> Result<SnapshotOptions> {
    let Some(map) = optional_object(root, OPTIONS_KEY, OPTIONS_KEY)? else {
        return Ok(SnapshotOptions::default());
    };

    let disable_provider_auto_update = match map.get("disable_provider_auto_update") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(ModelPickError::malformed(
                "options.disable_provider_auto_update",
                format!("expected a boolean, found {}", kind(other)),
            ));
        }
    };

    Ok(SnapshotOptions {
        disable_provider_auto_update,
    })
}
