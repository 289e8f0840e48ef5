pub mod leetspeak;

pub use leetspeak::{LeetspeakHook, LeetspeakPlugin, LEVELS_PATH};
