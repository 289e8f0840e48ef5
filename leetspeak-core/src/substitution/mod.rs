//! Turns an effective rule set into something that can be applied to text.
//!
//! `compiler` builds a leftmost-longest Aho-Corasick automaton over the rule
//! keys and keeps compiled sets in a process-wide cache, so a message only
//! pays for compilation when the level or custom rules actually changed.

pub mod compiler;
