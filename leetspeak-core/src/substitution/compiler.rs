//! compiler.rs - Compilation and caching of effective rule sets.
//!
//! Converts a `RuleMap` into a `Substitutor` backed by a double-array
//! Aho-Corasick automaton in leftmost-longest mode. Compiled sets are kept
//! in a global cache keyed by a hash of the rules.
//!
//! License: MIT OR APACHE 2.0

use daachorse::{DoubleArrayAhoCorasickBuilder, MatchKind};
use lazy_static::lazy_static;
use log::{debug, warn};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};

use crate::engine::Substitutor;
use crate::errors::LeetspeakError;
use crate::rules::RuleMap;

/// Maximum length in bytes of a rule key. Longer keys are skipped.
pub const MAX_RULE_KEY_LENGTH: usize = 256;

/// Number of compiled sets kept before the cache is flushed.
pub const MAX_CACHED_RULE_SETS: usize = 64;

/// Rule pairs in sorted order, the canonical form of a rule set.
type SortedRules = Vec<(String, String)>;

/// A cache entry keeps the rules it was compiled from so that a hash
/// collision is detected instead of serving another set's automaton.
#[derive(Debug)]
struct CachedRules {
    rules: SortedRules,
    compiled: Arc<Substitutor>,
}

type RulesCache = HashMap<u64, CachedRules>;

lazy_static! {
    static ref COMPILED_RULES_CACHE: RwLock<RulesCache> = RwLock::new(HashMap::new());
}

/// Keys are unique after the merge, so the compiled result does not depend
/// on order and the pairs are sorted.
fn sorted_rules(rules: &RuleMap) -> SortedRules {
    let mut pairs: SortedRules = rules
        .iter()
        .map(|(from, to)| (from.clone(), to.clone()))
        .collect();
    pairs.sort();
    pairs
}

fn hash_sorted_rules(rules: &SortedRules) -> u64 {
    let mut hasher = DefaultHasher::new();
    rules.hash(&mut hasher);
    hasher.finish()
}

/// Returns the cached substitutor for `rules`, ignoring an entry under the
/// same key that was compiled from different rules.
fn lookup(cache: &RulesCache, cache_key: u64, rules: &SortedRules) -> Option<Arc<Substitutor>> {
    match cache.get(&cache_key) {
        Some(entry) if entry.rules == *rules => Some(Arc::clone(&entry.compiled)),
        Some(_) => {
            debug!("Cache key {} collides with a different rule set.", cache_key);
            None
        }
        None => None,
    }
}

/// Compiles `rules` into a `Substitutor`.
pub fn compile_rules(rules: &RuleMap) -> Result<Substitutor, LeetspeakError> {
    debug!("Starting compilation of {} rules.", rules.len());

    let mut patterns: Vec<(&str, u32)> = Vec::with_capacity(rules.len());
    let mut replacements: Vec<String> = Vec::with_capacity(rules.len());

    for (from, to) in rules {
        if from.is_empty() {
            debug!("Skipping rule with an empty key (replacement '{}').", to);
            continue;
        }
        if from.len() > MAX_RULE_KEY_LENGTH {
            warn!(
                "Skipping rule: key length ({}) exceeds maximum allowed ({}).",
                from.len(),
                MAX_RULE_KEY_LENGTH
            );
            continue;
        }
        let index = u32::try_from(replacements.len())
            .map_err(|e| LeetspeakError::AutomatonBuild(rules.len(), e.to_string()))?;
        patterns.push((from.as_str(), index));
        replacements.push(to.clone());
    }

    if patterns.is_empty() {
        debug!("No applicable rules; compiled an identity substitutor.");
        return Ok(Substitutor::identity());
    }

    let automaton = DoubleArrayAhoCorasickBuilder::new()
        .match_kind(MatchKind::LeftmostLongest)
        .build_with_values(patterns)
        .map_err(|e| LeetspeakError::AutomatonBuild(replacements.len(), e.to_string()))?;

    log::debug!(
        target: "leetspeak_core::compiler",
        "Compiled {} rule(s) into automaton.",
        replacements.len()
    );
    Ok(Substitutor::new(automaton, replacements))
}

/// Gets a compiled `Substitutor` for `rules` from the cache, compiling and
/// caching it on a miss.
pub fn get_or_compile_rules(rules: &RuleMap) -> Result<Arc<Substitutor>, LeetspeakError> {
    let sorted = sorted_rules(rules);
    let cache_key = hash_sorted_rules(&sorted);

    {
        let cache = COMPILED_RULES_CACHE
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(compiled) = lookup(&cache, cache_key, &sorted) {
            debug!("Serving compiled rules from cache for key: {}", cache_key);
            return Ok(compiled);
        }
    }

    debug!("Compiled rules not found in cache. Compiling now.");
    let compiled = Arc::new(compile_rules(rules)?);

    let mut cache = COMPILED_RULES_CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    if cache.len() >= MAX_CACHED_RULE_SETS {
        debug!("Compiled rules cache is full ({} entries); flushing.", cache.len());
        cache.clear();
    }
    cache.insert(
        cache_key,
        CachedRules {
            rules: sorted,
            compiled: Arc::clone(&compiled),
        },
    );

    debug!("Successfully compiled and cached rules for key: {}", cache_key);
    Ok(compiled)
}
