// leetspeak/src/lib.rs
//! # Leetspeak Plugin
//!
//! Rewrites outgoing server announcements ("say") and direct messages
//! ("tell") according to a configurable leetspeak level, optionally merged
//! with user-defined substitutions. The substitution itself lives in
//! `leetspeak-core`; this crate wires it to the daemon's hooks and config.
//!
//! ```rust
//! use std::sync::Arc;
//! use leetspeak::{ConfigStore, HookBus, HookPoint, Plugin, PluginContext, Recipient};
//! use leetspeak::plugins::LeetspeakPlugin;
//! use leetspeak_core::LevelTable;
//!
//! let ctx = PluginContext::new(Arc::new(ConfigStore::new()), Arc::new(HookBus::new()), ".");
//! let mut plugin = LeetspeakPlugin::with_level_table(&ctx, LevelTable::builtin().clone());
//! ctx.config.set("leetspeak", "level", 1);
//! plugin.enable().unwrap();
//!
//! let out = ctx.hooks.dispatch(HookPoint::PreRconSay, "Welcome everyone", Recipient::Everyone);
//! assert_eq!(out.as_deref(), Some("W3lcom3 3v3ryon3"));
//! ```

pub mod config;
pub mod hooks;
pub mod logger;
pub mod plugin;
pub mod plugins;

pub use config::{ConfigStore, LeetspeakSettings};
pub use hooks::{HookBus, HookOutcome, HookPoint, MessageHook, PlayerId, Recipient};
pub use plugin::{Plugin, PluginContext, PluginHost};
