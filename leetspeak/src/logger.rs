// leetspeak/src/logger.rs
//! Logger setup for hosts embedding the plugin.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes `env_logger`, honouring `RUST_LOG` and defaulting to `info`.
///
/// `level` overrides the filter when given. Calling this more than once is
/// harmless; only the first call installs a logger.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    let _ = builder.try_init();
}
