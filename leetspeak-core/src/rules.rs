//! Rule maps and the merge that produces an effective rule set.
//!
//! A rule maps a source substring to its replacement. Rule maps keep
//! insertion order: when a later source overwrites a key, the key keeps the
//! position it had when first inserted. Order is observable once
//! case-insensitive duplication folds two keys onto the same upper-case key,
//! so it is part of the contract here.
//!
//! License: MIT OR Apache-2.0

use indexmap::IndexMap;
use log::debug;

/// An insertion-ordered mapping of source substring to replacement.
pub type RuleMap = IndexMap<String, String>;

/// Builds the effective rule set for one invocation.
///
/// Merge order is level rules, then `custom_rules` (custom wins on
/// conflict), then, if `ignore_case` is set, an upper-cased copy of every
/// key mapping to the same replacement. Each stage is last-write-wins.
/// Upper-casing is ASCII-only, so a key never changes length and a
/// non-ASCII letter never folds onto an ASCII key.
/// `level_rules` is `None` when the selected level is absent from the table.
pub fn merge_rules(
    level_rules: Option<&RuleMap>,
    custom_rules: &RuleMap,
    ignore_case: bool,
) -> RuleMap {
    let mut merged: RuleMap = level_rules.cloned().unwrap_or_default();
    debug!(
        "merge_rules called. Level rules: {}, custom rules: {}, ignore_case: {}",
        merged.len(),
        custom_rules.len(),
        ignore_case
    );

    for (from, to) in custom_rules {
        merged.insert(from.clone(), to.clone());
    }

    if ignore_case {
        let upper: Vec<(String, String)> = merged
            .iter()
            .map(|(from, to)| (from.to_ascii_uppercase(), to.clone()))
            .collect();
        for (from, to) in upper {
            merged.insert(from, to);
        }
    }

    debug!("Final effective rule count after merge: {}", merged.len());
    merged
}
