//! Document-level reconciliation of recent-model state.
//!
//! These functions work on whole configuration documents as
//! `serde_json::Value` so that unknown keys, nesting and key order survive
//! untouched. Only `recent_models.<size class>` is ever replaced.

use crate::error::{ModelPickError, Result};
use crate::snapshot::{ConfigSnapshot, RECENT_MODELS_KEY, RecentEntry, SizeClass, parse_recent_list};
use serde_json::{Map, Value};

/// Serializes a recent list in its persisted shape.
pub fn recents_to_value(recents: &[RecentEntry]) -> Value {
    Value::Array(
        recents
            .iter()
            .map(|entry| {
                let mut object = Map::new();
                object.insert("provider".to_string(), Value::String(entry.provider.clone()));
                object.insert("model".to_string(), Value::String(entry.model.clone()));
                Value::Object(object)
            })
            .collect(),
    )
}

/// Returns a copy of `source` with `recent_models[size_class]` set to `recents`.
///
/// The source must parse as a [`ConfigSnapshot`]; otherwise the
/// `MalformedSnapshot` error is returned and nothing is produced. An empty
/// list is written as `[]`.
pub fn reconcile_document(
    source: &Value,
    size_class: &SizeClass,
    recents: &[RecentEntry],
) -> Result<Value> {
    ConfigSnapshot::from_document(source)?;

    let mut derived = match source {
        Value::Null => Value::Object(Map::new()),
        other => other.clone(),
    };
    recent_models_mut(&mut derived)?.insert(size_class.to_string(), recents_to_value(recents));
    Ok(derived)
}

/// Copies `recent_models` lists from `from` into `target`, skipping `except`.
///
/// Used both to overlay persisted recency state onto the source document and
/// to keep other size classes' lists when one class is rewritten.
pub fn overlay_recent_models(
    target: &mut Value,
    from: &Value,
    except: Option<&SizeClass>,
) -> Result<()> {
    let Some(lists) = recent_models_of(from)? else {
        return Ok(());
    };

    let mut carried = Vec::new();
    for (class, list) in lists {
        if except.is_some_and(|c| c.as_str() == class) {
            continue;
        }
        parse_recent_list(list, &format!("{RECENT_MODELS_KEY}.{class}"))?;
        carried.push((class.clone(), list.clone()));
    }

    if carried.is_empty() {
        return Ok(());
    }
    let target_lists = recent_models_mut(target)?;
    for (class, list) in carried {
        target_lists.insert(class, list);
    }
    Ok(())
}

/// Reads one size class's recent list from a document.
pub fn recents_in(document: &Value, size_class: &SizeClass) -> Result<Vec<RecentEntry>> {
    match recent_models_of(document)?.and_then(|lists| lists.get(size_class.as_str())) {
        Some(list) => parse_recent_list(list, &format!("{RECENT_MODELS_KEY}.{size_class}")),
        None => Ok(Vec::new()),
    }
}

fn recent_models_of(document: &Value) -> Result<Option<&Map<String, Value>>> {
    match document {
        Value::Null => Ok(None),
        Value::Object(root) => match root.get(RECENT_MODELS_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(lists)) => Ok(Some(lists)),
            Some(_) => Err(ModelPickError::malformed(
                RECENT_MODELS_KEY,
                "expected an object",
            )),
        },
        _ => Err(ModelPickError::malformed("$", "expected an object")),
    }
}

fn recent_models_mut(document: &mut Value) -> Result<&mut Map<String, Value>> {
    if document.is_null() {
        *document = Value::Object(Map::new());
    }
    let root = document
        .as_object_mut()
        .ok_or_else(|| ModelPickError::malformed("$", "expected an object"))?;

    let entry = root
        .entry(RECENT_MODELS_KEY.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if entry.is_null() {
        *entry = Value::Object(Map::new());
    }
    entry
        .as_object_mut()
        .ok_or_else(|| ModelPickError::malformed(RECENT_MODELS_KEY, "expected an object"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source() -> Value {
        json!({
            "options": { "disable_provider_auto_update": true },
            "models": { "large": { "model": "m1", "provider": "p1" } },
            "recent_models": {
                "large": [
                    { "model": "m2", "provider": "p1" },
                    { "model": "x", "provider": "unknown-provider" }
                ],
                "small": [ { "model": "m1", "provider": "p1" } ]
            },
            "zzz_custom": { "nested": [1, { "keep": true }] }
        })
    }

    #[test]
    fn test_only_target_class_is_replaced() {
        let source = source();
        let derived =
            reconcile_document(&source, &SizeClass::large(), &[RecentEntry::new("p1", "m2")])
                .unwrap();

        assert_eq!(
            derived["recent_models"]["large"],
            json!([{ "provider": "p1", "model": "m2" }])
        );
        assert_eq!(derived["recent_models"]["small"], source["recent_models"]["small"]);
        assert_eq!(derived["options"], source["options"]);
        assert_eq!(derived["models"], source["models"]);
        assert_eq!(derived["zzz_custom"], source["zzz_custom"]);
        // source value itself is untouched
        assert_eq!(source["recent_models"]["large"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_key_order_is_preserved() {
        let source = source();
        let derived = reconcile_document(&source, &SizeClass::large(), &[]).unwrap();

        let source_keys: Vec<&String> = source.as_object().unwrap().keys().collect();
        let derived_keys: Vec<&String> = derived.as_object().unwrap().keys().collect();
        assert_eq!(source_keys, derived_keys);
    }

    #[test]
    fn test_empty_recents_written_as_empty_array() {
        let derived = reconcile_document(&json!({}), &SizeClass::large(), &[]).unwrap();
        assert_eq!(derived, json!({ "recent_models": { "large": [] } }));
        assert!(recents_in(&derived, &SizeClass::large()).unwrap().is_empty());
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let recents = [RecentEntry::new("p1", "m2")];
        let once = reconcile_document(&source(), &SizeClass::large(), &recents).unwrap();
        let twice = reconcile_document(&once, &SizeClass::large(), &recents).unwrap();
        assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );
    }

    #[test]
    fn test_malformed_source_is_rejected() {
        let bad = json!({ "recent_models": { "large": "p1:m1" } });
        let err = reconcile_document(&bad, &SizeClass::large(), &[]).unwrap_err();
        assert!(err.is_malformed());

        let err = reconcile_document(&json!("text"), &SizeClass::large(), &[]).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_overlay_skips_excluded_class() {
        let mut target = json!({ "recent_models": { "large": [] } });
        let previous = json!({
            "recent_models": {
                "large": [ { "provider": "old", "model": "old" } ],
                "small": [ { "provider": "p1", "model": "m1" } ]
            }
        });

        overlay_recent_models(&mut target, &previous, Some(&SizeClass::large())).unwrap();

        assert_eq!(target["recent_models"]["large"], json!([]));
        assert_eq!(
            target["recent_models"]["small"],
            json!([{ "provider": "p1", "model": "m1" }])
        );
    }

    #[test]
    fn test_overlay_creates_recent_models_when_missing() {
        let mut target = json!({ "models": {} });
        let previous = json!({ "recent_models": { "large": [ { "provider": "p", "model": "m" } ] } });

        overlay_recent_models(&mut target, &previous, None).unwrap();

        assert_eq!(
            recents_in(&target, &SizeClass::large()).unwrap(),
            vec![RecentEntry::new("p", "m")]
        );
    }

    #[test]
    fn test_overlay_rejects_malformed_lists() {
        let mut target = json!({});
        let previous = json!({ "recent_models": { "large": 5 } });
        assert!(overlay_recent_models(&mut target, &previous, None).unwrap_err().is_malformed());
        assert_eq!(target, json!({}));
    }
}
