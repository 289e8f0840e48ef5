// leetspeak-core/src/engine.rs
//! The substitution engine.
//!
//! A `Substitutor` applies a compiled rule set to a message in one
//! left-to-right pass. At every position the longest matching key wins,
//! matches never overlap, and replacement text is never rescanned, so
//! `{"e": "3", "3": "e"}` turns `"e3"` into `"3e"` rather than cascading.
//!
//! License: MIT OR APACHE 2.0

use daachorse::DoubleArrayAhoCorasick;
use log::warn;
use std::borrow::Cow;
use std::fmt;

use crate::levels::LevelTable;
use crate::rules::{merge_rules, RuleMap};
use crate::substitution::compiler::get_or_compile_rules;

/// A compiled, immutable rule set ready to be applied to messages.
pub struct Substitutor {
    automaton: Option<DoubleArrayAhoCorasick<u32>>,
    replacements: Vec<String>,
}

impl fmt::Debug for Substitutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Substitutor")
            .field("automaton", &self.automaton.as_ref().map(|_| "<DoubleArrayAhoCorasick>"))
            .field("replacements", &self.replacements.len())
            .finish()
    }
}

impl Substitutor {
    pub(crate) fn new(automaton: DoubleArrayAhoCorasick<u32>, replacements: Vec<String>) -> Self {
        Self {
            automaton: Some(automaton),
            replacements,
        }
    }

    /// A substitutor with no rules; `apply` always returns its input.
    pub fn identity() -> Self {
        Self {
            automaton: None,
            replacements: Vec::new(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.automaton.is_none()
    }

    /// Number of rules compiled into this substitutor.
    pub fn rule_count(&self) -> usize {
        self.replacements.len()
    }

    /// Applies every rule to `message` in a single simultaneous pass.
    ///
    /// Borrows `message` when nothing matched.
    pub fn apply<'a>(&self, message: &'a str) -> Cow<'a, str> {
        let automaton = match &self.automaton {
            Some(automaton) => automaton,
            None => return Cow::Borrowed(message),
        };

        let mut output: Option<String> = None;
        let mut last_end = 0usize;

        for m in automaton.leftmost_find_iter(message) {
            let out = output.get_or_insert_with(|| String::with_capacity(message.len() + 16));
            out.push_str(&message[last_end..m.start()]);
            // Keys and message are both UTF-8, so matches sit on char boundaries.
            out.push_str(&self.replacements[m.value() as usize]);
            last_end = m.end();
        }

        match output {
            Some(mut out) => {
                out.push_str(&message[last_end..]);
                Cow::Owned(out)
            }
            None => Cow::Borrowed(message),
        }
    }
}

/// Rewrites `message` with the rules for `level` merged with `custom_rules`.
///
/// A level missing from `level_table` contributes no rules, and a rule set
/// that fails to compile leaves the message unchanged. This never fails.
pub fn transform(
    message: &str,
    level: i64,
    custom_rules: &RuleMap,
    ignore_case: bool,
    level_table: &LevelTable,
) -> String {
    let effective = merge_rules(level_table.rules_for(level), custom_rules, ignore_case);
    if effective.is_empty() {
        return message.to_string();
    }

    match get_or_compile_rules(&effective) {
        Ok(substitutor) => substitutor.apply(message).into_owned(),
        Err(e) => {
            warn!("Failed to compile substitution rules, leaving message unchanged: {}", e);
            message.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substitution::compiler::compile_rules;

    fn rules(pairs: &[(&str, &str)]) -> RuleMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_identity_borrows_input() {
        let substitutor = Substitutor::identity();
        assert!(matches!(substitutor.apply("hello"), Cow::Borrowed("hello")));
    }

    #[test]
    fn test_no_match_borrows_input() {
        let substitutor = compile_rules(&rules(&[("q", "9")])).unwrap();
        assert!(matches!(substitutor.apply("hello"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_swap_is_not_cascading() {
        let substitutor = compile_rules(&rules(&[("e", "3"), ("3", "e")])).unwrap();
        assert_eq!(substitutor.apply("e3"), "3e");
    }

    #[test]
    fn test_longest_key_wins_at_a_position() {
        let substitutor = compile_rules(&rules(&[("o", "0"), ("oo", "00!")])).unwrap();
        assert_eq!(substitutor.apply("food"), "f00!d");
        assert_eq!(substitutor.apply("ooo"), "00!0");
    }

    #[test]
    fn test_leftmost_match_wins_over_longer_later_match() {
        let substitutor = compile_rules(&rules(&[("ab", "X"), ("bcd", "Y")])).unwrap();
        assert_eq!(substitutor.apply("abcd"), "Xcd");
    }

    #[test]
    fn test_multibyte_text_is_preserved() {
        let substitutor = compile_rules(&rules(&[("e", "3"), ("ü", "u")])).unwrap();
        assert_eq!(substitutor.apply("Grüße, hello ✓"), "Gruß3, h3llo ✓");
    }

    #[test]
    fn test_transform_empty_message() {
        let table = LevelTable::builtin();
        assert_eq!(transform("", 5, &RuleMap::new(), true, table), "");
    }
}
