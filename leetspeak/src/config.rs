//! Plugin configuration: the namespaced store and the typed leetspeak view.
//!
//! The host owns a `ConfigStore` of JSON values grouped by namespace. Plugins
//! register their defaults at init time and take a snapshot of their
//! namespace whenever they need it, so values changed by the host between
//! two messages are picked up on the next one.
//!
//! License: MIT OR Apache-2.0

use anyhow::{Context, Result};
use leetspeak_core::RuleMap;
use log::{debug, info, warn};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

/// Config namespace of the leetspeak plugin.
pub const NAMESPACE: &str = "leetspeak";

pub const KEY_ENABLED: &str = "enabled";
pub const KEY_LEVEL: &str = "level";
pub const KEY_IGNORE_CASE: &str = "ignorecase";
pub const KEY_CUSTOM_CHARS: &str = "customchars";

type Namespaces = HashMap<String, Map<String, Value>>;

/// A thread-safe, namespaced key/value store.
#[derive(Debug, Default)]
pub struct ConfigStore {
    namespaces: RwLock<Namespaces>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a YAML document whose top level maps namespace to key/value pairs.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::new());
        }
        let namespaces: Option<Namespaces> =
            serde_yml::from_str(yaml).context("Failed to parse configuration")?;
        Ok(Self {
            namespaces: RwLock::new(namespaces.unwrap_or_default()),
        })
    }

    /// Loads a YAML configuration file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Sets `namespace.key` only if it has no value yet. Returns whether the
    /// default was applied.
    pub fn set_default(&self, namespace: &str, key: &str, value: impl Into<Value>) -> bool {
        let mut namespaces = self.namespaces.write().unwrap_or_else(PoisonError::into_inner);
        let entries = namespaces.entry(namespace.to_string()).or_default();
        if entries.contains_key(key) {
            return false;
        }
        debug!("Registering default for {}.{}", namespace, key);
        entries.insert(key.to_string(), value.into());
        true
    }

    pub fn set(&self, namespace: &str, key: &str, value: impl Into<Value>) {
        let mut namespaces = self.namespaces.write().unwrap_or_else(PoisonError::into_inner);
        namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<Value> {
        let namespaces = self.namespaces.read().unwrap_or_else(PoisonError::into_inner);
        namespaces.get(namespace)?.get(key).cloned()
    }

    /// Reads `namespace.key` as a boolean. A missing or non-boolean value
    /// yields `default`.
    pub fn get_bool(&self, namespace: &str, key: &str, default: bool) -> bool {
        decode_bool(self.get(namespace, key).as_ref(), namespace, key).unwrap_or(default)
    }

    /// A consistent copy of every key in `namespace`.
    pub fn snapshot(&self, namespace: &str) -> Map<String, Value> {
        let namespaces = self.namespaces.read().unwrap_or_else(PoisonError::into_inner);
        namespaces.get(namespace).cloned().unwrap_or_default()
    }
}

/// Typed view of the `leetspeak` namespace.
///
/// Every field decodes leniently: a value of the wrong type falls back to
/// that field's default with a warning instead of failing the whole view.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LeetspeakSettings {
    #[serde(deserialize_with = "lenient_enabled")]
    pub enabled: bool,
    #[serde(deserialize_with = "lenient_level")]
    pub level: i64,
    #[serde(rename = "ignorecase", deserialize_with = "lenient_ignore_case")]
    pub ignore_case: bool,
    #[serde(rename = "customchars", deserialize_with = "lenient_custom_chars")]
    pub custom_chars: RuleMap,
}

impl Default for LeetspeakSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            level: 0,
            ignore_case: true,
            custom_chars: RuleMap::new(),
        }
    }
}

impl LeetspeakSettings {
    /// Registers the namespace defaults without touching values already set.
    pub fn register_defaults(store: &ConfigStore) {
        let defaults = Self::default();
        store.set_default(NAMESPACE, KEY_ENABLED, defaults.enabled);
        store.set_default(NAMESPACE, KEY_LEVEL, defaults.level);
        store.set_default(NAMESPACE, KEY_IGNORE_CASE, defaults.ignore_case);
        store.set_default(NAMESPACE, KEY_CUSTOM_CHARS, Value::Object(Map::new()));
    }

    /// Reads the current settings from a snapshot of the namespace.
    pub fn from_store(store: &ConfigStore) -> Self {
        let snapshot = Value::Object(store.snapshot(NAMESPACE));
        serde_json::from_value(snapshot).unwrap_or_else(|e| {
            warn!("Could not decode {} settings: {}; using defaults", NAMESPACE, e);
            Self::default()
        })
    }
}

/// Decodes a boolean config value. `None` means "use the default".
pub(crate) fn decode_bool(value: Option<&Value>, namespace: &str, key: &str) -> Option<bool> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(other) => {
            warn!("{}.{} should be a boolean, got {}; using the default", namespace, key, other);
            None
        }
    }
}

fn decode_level(value: &Value) -> Option<i64> {
    let parsed = match value {
        Value::Null => return None,
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    if parsed.is_none() {
        warn!("{}.{} should be an integer, got {}; using the default", NAMESPACE, KEY_LEVEL, value);
    }
    parsed
}

fn decode_custom_chars(value: &Value) -> RuleMap {
    let mut rules = RuleMap::new();
    match value {
        Value::Object(entries) => {
            for (from, to) in entries {
                match to {
                    Value::String(s) => {
                        rules.insert(from.clone(), s.clone());
                    }
                    Value::Number(n) => {
                        rules.insert(from.clone(), n.to_string());
                    }
                    other => warn!(
                        "Ignoring custom rule '{}': replacement should be a string, got {}",
                        from, other
                    ),
                }
            }
        }
        // An empty list is how an unset mapping is often serialised.
        Value::Null => {}
        Value::Array(items) if items.is_empty() => {}
        other => warn!(
            "{}.{} should be a mapping, got {}; no custom rules apply",
            NAMESPACE, KEY_CUSTOM_CHARS, other
        ),
    }
    rules
}

fn lenient_enabled<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(decode_bool(Some(&value), NAMESPACE, KEY_ENABLED)
        .unwrap_or(LeetspeakSettings::default().enabled))
}

fn lenient_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(decode_level(&value).unwrap_or(LeetspeakSettings::default().level))
}

fn lenient_ignore_case<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(decode_bool(Some(&value), NAMESPACE, KEY_IGNORE_CASE)
        .unwrap_or(LeetspeakSettings::default().ignore_case))
}

fn lenient_custom_chars<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RuleMap, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(decode_custom_chars(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_default_does_not_overwrite() {
        let store = ConfigStore::new();
        store.set(NAMESPACE, KEY_LEVEL, 3);
        assert!(!store.set_default(NAMESPACE, KEY_LEVEL, 0));
        assert!(store.set_default(NAMESPACE, KEY_ENABLED, false));
        assert_eq!(store.get(NAMESPACE, KEY_LEVEL), Some(json!(3)));
    }

    #[test]
    fn test_defaults_round_trip_through_store() {
        let store = ConfigStore::new();
        LeetspeakSettings::register_defaults(&store);
        assert_eq!(LeetspeakSettings::from_store(&store), LeetspeakSettings::default());
    }

    #[test]
    fn test_wrong_types_fall_back_to_defaults() {
        let store = ConfigStore::new();
        store.set(NAMESPACE, KEY_ENABLED, "yes");
        store.set(NAMESPACE, KEY_LEVEL, 2.5);
        store.set(NAMESPACE, KEY_IGNORE_CASE, json!([true]));
        store.set(NAMESPACE, KEY_CUSTOM_CHARS, "a=4");

        assert_eq!(LeetspeakSettings::from_store(&store), LeetspeakSettings::default());
    }

    #[test]
    fn test_level_accepts_numeric_strings() {
        let store = ConfigStore::new();
        store.set(NAMESPACE, KEY_LEVEL, " 4 ");
        assert_eq!(LeetspeakSettings::from_store(&store).level, 4);
    }

    #[test]
    fn test_custom_chars_keep_order_and_skip_non_strings() {
        let store = ConfigStore::new();
        store.set(
            NAMESPACE,
            KEY_CUSTOM_CHARS,
            json!({"z": "2", "a": 4, "x": null, "e": "3"}),
        );
        let settings = LeetspeakSettings::from_store(&store);
        let pairs: Vec<(&str, &str)> = settings
            .custom_chars
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(pairs, vec![("z", "2"), ("a", "4"), ("e", "3")]);
    }

    #[test]
    fn test_empty_list_means_no_custom_chars() {
        let store = ConfigStore::new();
        store.set(NAMESPACE, KEY_CUSTOM_CHARS, json!([]));
        assert!(LeetspeakSettings::from_store(&store).custom_chars.is_empty());
    }

    #[test]
    fn test_get_bool_falls_back_on_wrong_type() {
        let store = ConfigStore::new();
        assert!(store.get_bool("other", KEY_ENABLED, true));
        store.set("other", KEY_ENABLED, "true");
        assert!(!store.get_bool("other", KEY_ENABLED, false));
        store.set("other", KEY_ENABLED, true);
        assert!(store.get_bool("other", KEY_ENABLED, false));
    }

    #[test]
    fn test_null_values_use_field_defaults() {
        let store = ConfigStore::new();
        for key in [KEY_ENABLED, KEY_LEVEL, KEY_IGNORE_CASE, KEY_CUSTOM_CHARS] {
            store.set(NAMESPACE, key, Value::Null);
        }
        assert_eq!(LeetspeakSettings::from_store(&store), LeetspeakSettings::default());
    }
}
