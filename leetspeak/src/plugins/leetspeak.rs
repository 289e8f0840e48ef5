//! Leetspeak plugin: rewrites outgoing say and tell messages.
//!
//! On every message the handler reads the current `leetspeak` settings,
//! merges the selected level's rules with the custom ones and applies them.
//! It never suppresses a message.

use anyhow::{bail, Result};
use leetspeak_core::{transform, LevelTable};
use log::{debug, info};
use std::sync::Arc;

use crate::config::{ConfigStore, LeetspeakSettings, NAMESPACE};
use crate::hooks::{HookBus, HookOutcome, HookPoint, MessageHook, Recipient};
use crate::plugin::{Plugin, PluginContext};

/// Location of the level table, relative to the host's root directory.
pub const LEVELS_PATH: &str = "plugins/leetspeak/levels.json";

/// The message handler subscribed to both hook points.
#[derive(Debug)]
pub struct LeetspeakHook {
    config: Arc<ConfigStore>,
    level_table: Arc<LevelTable>,
}

impl LeetspeakHook {
    pub fn new(config: Arc<ConfigStore>, level_table: Arc<LevelTable>) -> Self {
        Self { config, level_table }
    }

    pub fn replace_message(&self, message: &str, recipient: Recipient) -> HookOutcome {
        let settings = LeetspeakSettings::from_store(&self.config);
        debug!(
            "Rewriting message for {:?} at level {} (ignore_case: {}, custom rules: {})",
            recipient,
            settings.level,
            settings.ignore_case,
            settings.custom_chars.len()
        );
        let rewritten = transform(
            message,
            settings.level,
            &settings.custom_chars,
            settings.ignore_case,
            &self.level_table,
        );
        HookOutcome::proceed(rewritten)
    }
}

impl MessageHook for LeetspeakHook {
    fn name(&self) -> &str {
        NAMESPACE
    }

    fn on_message(&self, message: &str, recipient: Recipient) -> HookOutcome {
        self.replace_message(message, recipient)
    }
}

#[derive(Debug)]
pub struct LeetspeakPlugin {
    hooks: Arc<HookBus>,
    hook: Arc<LeetspeakHook>,
    enabled: bool,
}

impl LeetspeakPlugin {
    /// Builds the plugin around an already loaded level table.
    pub fn with_level_table(ctx: &PluginContext, level_table: LevelTable) -> Self {
        LeetspeakSettings::register_defaults(&ctx.config);
        Self {
            hooks: Arc::clone(&ctx.hooks),
            hook: Arc::new(LeetspeakHook::new(
                Arc::clone(&ctx.config),
                Arc::new(level_table),
            )),
            enabled: false,
        }
    }

    pub fn hook(&self) -> &Arc<LeetspeakHook> {
        &self.hook
    }
}

impl Plugin for LeetspeakPlugin {
    fn init(ctx: &PluginContext) -> Result<Self> {
        let level_table = LevelTable::load_or_empty(ctx.root_dir.join(LEVELS_PATH));
        Ok(Self::with_level_table(ctx, level_table))
    }

    fn name(&self) -> &str {
        NAMESPACE
    }

    fn enable(&mut self) -> Result<()> {
        if self.enabled {
            return Ok(());
        }
        let mut registered = Vec::with_capacity(HookPoint::ALL.len());
        for point in HookPoint::ALL {
            let handler: Arc<dyn MessageHook> = self.hook.clone();
            if !self.hooks.register(point, handler) {
                // Only undo our own registrations; the handler already at
                // `point` belongs to someone else.
                for done in &registered {
                    self.hooks.unregister(*done, NAMESPACE);
                }
                bail!("A '{}' handler is already registered for {}", NAMESPACE, point);
            }
            registered.push(point);
        }
        self.enabled = true;
        info!("Plugin '{}' enabled", NAMESPACE);
        Ok(())
    }

    fn disable(&mut self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        for point in HookPoint::ALL {
            self.hooks.unregister(point, NAMESPACE);
        }
        self.enabled = false;
        info!("Plugin '{}' disabled", NAMESPACE);
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
