// leetspeak-core/src/lib.rs
//! # Leetspeak Core Library
//!
//! `leetspeak-core` is the substitution engine behind the leetspeak plugin.
//! It knows nothing about hooks, plugins or the daemon hosting them; it only
//! turns a severity level, a set of custom rules and a message into a
//! rewritten message.
//!
//! ## Modules
//!
//! * `levels`: The per-level rule table and its JSON loaders.
//! * `rules`: The ordered `RuleMap` and `merge_rules`.
//! * `substitution`: Compiles rule sets into automata, with a shared cache.
//! * `engine`: The `Substitutor` and the one-shot `transform` function.
//! * `errors`: `LeetspeakError`.
//!
//! ## Usage Example
//!
//! ```rust
//! use leetspeak_core::{transform, LevelTable, RuleMap};
//!
//! let table = LevelTable::builtin();
//! let mut custom = RuleMap::new();
//! custom.insert("o".to_string(), "()".to_string());
//!
//! let out = transform("Hello World", 2, &custom, true, table);
//! assert_eq!(out, "H3ll() W()rld");
//! ```
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod engine;
pub mod errors;
pub mod levels;
pub mod rules;
pub mod substitution;

/// Re-exports the rule map type and merge logic.
pub use rules::{merge_rules, RuleMap};

/// Re-exports the level table.
pub use levels::{LevelTable, LEVEL_KEY_PREFIX};

/// Re-exports the custom error type for clear error reporting.
pub use errors::LeetspeakError;

/// Re-exports the engine entry points.
pub use engine::{transform, Substitutor};

pub use substitution::compiler::{
    compile_rules, get_or_compile_rules, MAX_CACHED_RULE_SETS, MAX_RULE_KEY_LENGTH,
};
