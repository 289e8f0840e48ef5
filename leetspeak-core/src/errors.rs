//! errors.rs - Custom error types for the leetspeak-core library.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// All error types surfaced by `leetspeak-core`.
///
/// The substitution path itself is total; these only come out of the
/// loading and compilation entry points, and callers on the hook path are
/// expected to degrade to a no-op instead of propagating them.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LeetspeakError {
    #[error("Failed to parse level table: {0}")]
    LevelTableParse(#[from] serde_json::Error),

    #[error("Failed to build substitution automaton for {0} rule(s): {1}")]
    AutomatonBuild(usize, String),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),
}
