//! Level tables: the predefined substitution rules for each severity level.
//!
//! The table is read from a JSON document keyed `level_0` .. `level_N`, each
//! holding an object of substring to replacement. It is loaded once and is
//! read-only for the rest of the process lifetime.
//!
//! License: MIT OR Apache-2.0

use anyhow::Context;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::LeetspeakError;
use crate::rules::RuleMap;

/// Prefix every top-level key of a level document carries.
pub const LEVEL_KEY_PREFIX: &str = "level_";

static BUILTIN_LEVELS: Lazy<LevelTable> = Lazy::new(|| {
    let json = include_str!("../levels/levels.json");
    LevelTable::from_json_str(json).unwrap_or_else(|e| {
        warn!("Built-in level table is invalid, using an empty table: {}", e);
        LevelTable::default()
    })
});

/// Severity level to rule map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelTable {
    levels: BTreeMap<i64, RuleMap>,
}

impl LevelTable {
    /// Parses a level document.
    ///
    /// Top-level keys that are not `level_<integer>` are skipped with a warning.
    pub fn from_json_str(json: &str) -> Result<Self, LeetspeakError> {
        let raw: indexmap::IndexMap<String, RuleMap> = serde_json::from_str(json)?;
        let mut levels = BTreeMap::new();

        for (key, rules) in raw {
            match parse_level_key(&key) {
                Some(level) => {
                    debug!("Level {} defines {} rule(s).", level, rules.len());
                    levels.insert(level, rules);
                }
                None => warn!("Skipping unrecognised level key '{}'.", key),
            }
        }

        Ok(Self { levels })
    }

    /// Reads and parses a level document from disk.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, LeetspeakError> {
        let path = path.as_ref();
        info!("Loading level table from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read level table {}", path.display()))?;
        let table = Self::from_json_str(&text)?;
        info!("Loaded {} level(s) from {}.", table.levels.len(), path.display());
        Ok(table)
    }

    /// Like [`LevelTable::load_from_file`], but an unreadable or malformed
    /// file yields an empty table and a warning instead of an error.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load_from_file(path) {
            Ok(table) => table,
            Err(e) => {
                warn!(
                    "Could not load level table from {}: {}. No level rules will apply.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// The level table shipped with the plugin.
    pub fn builtin() -> &'static LevelTable {
        &BUILTIN_LEVELS
    }

    /// Rules for `level`, or `None` if the table has no such level.
    pub fn rules_for(&self, level: i64) -> Option<&RuleMap> {
        self.levels.get(&level)
    }

    /// Defined levels in ascending order.
    pub fn levels(&self) -> impl Iterator<Item = i64> + '_ {
        self.levels.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

fn parse_level_key(key: &str) -> Option<i64> {
    key.strip_prefix(LEVEL_KEY_PREFIX)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_key() {
        assert_eq!(parse_level_key("level_0"), Some(0));
        assert_eq!(parse_level_key("level_5"), Some(5));
        assert_eq!(parse_level_key("level_"), None);
        assert_eq!(parse_level_key("levels"), None);
        assert_eq!(parse_level_key("level_x"), None);
    }

    #[test]
    fn test_builtin_levels_are_cumulative() {
        let table = LevelTable::builtin();
        assert_eq!(table.levels().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
        assert!(table.rules_for(0).map_or(false, |r| r.is_empty()));

        for level in 1..=5 {
            let lower = table.rules_for(level - 1).unwrap();
            let upper = table.rules_for(level).unwrap();
            assert!(upper.len() > lower.len(), "level {} should add rules", level);
            for key in lower.keys() {
                assert!(upper.contains_key(key), "level {} dropped '{}'", level, key);
            }
        }
    }

    #[test]
    fn test_entry_order_is_preserved() {
        let table = LevelTable::from_json_str(r#"{"level_1": {"z": "2", "a": "4", "m": "|v|"}}"#)
            .unwrap();
        let keys: Vec<&str> = table.rules_for(1).unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_unknown_keys_are_skipped() {
        let table = LevelTable::from_json_str(r#"{"level_1": {"a": "4"}, "comment": {}}"#).unwrap();
        assert_eq!(table.levels().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(LevelTable::from_json_str("[1, 2, 3]").is_err());
        assert!(LevelTable::from_json_str(r#"{"level_1": {"a": 4}}"#).is_err());
    }
}
