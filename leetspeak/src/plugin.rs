//! The plugin contract and a minimal host that drives it.
//!
//! Plugins receive their collaborators through a `PluginContext` at init
//! time and are enabled or disabled by the host through the `Plugin` trait.
//! The host decides from each plugin's `<name>.enabled` config key.

use anyhow::{Context, Result};
use log::info;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{ConfigStore, KEY_ENABLED};
use crate::hooks::HookBus;

/// Collaborators the host hands to every plugin.
#[derive(Debug, Clone)]
pub struct PluginContext {
    pub config: Arc<ConfigStore>,
    pub hooks: Arc<HookBus>,
    /// Directory that plugin resource paths are relative to.
    pub root_dir: PathBuf,
}

impl PluginContext {
    pub fn new(config: Arc<ConfigStore>, hooks: Arc<HookBus>, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            hooks,
            root_dir: root_dir.into(),
        }
    }
}

pub trait Plugin: Send + Sync + Debug {
    /// Registers config defaults and loads resources. Must not subscribe to hooks.
    fn init(ctx: &PluginContext) -> Result<Self>
    where
        Self: Sized;

    /// Plugin name, also its config namespace.
    fn name(&self) -> &str;

    /// Subscribes the plugin's handlers. Enabling an enabled plugin is a no-op.
    fn enable(&mut self) -> Result<()>;

    /// Removes every handler `enable` subscribed. Disabling a disabled plugin is a no-op.
    fn disable(&mut self) -> Result<()>;

    fn is_enabled(&self) -> bool;
}

/// Owns loaded plugins and keeps their enabled state in line with config.
#[derive(Debug)]
pub struct PluginHost {
    ctx: PluginContext,
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginHost {
    pub fn new(ctx: PluginContext) -> Self {
        Self {
            ctx,
            plugins: Vec::new(),
        }
    }

    pub fn context(&self) -> &PluginContext {
        &self.ctx
    }

    /// Initialises `P` and takes ownership of it. The plugin starts disabled.
    pub fn load<P: Plugin + 'static>(&mut self) -> Result<()> {
        let plugin = P::init(&self.ctx).context("Failed to initialise plugin")?;
        info!("Loaded plugin '{}'", plugin.name());
        self.plugins.push(Box::new(plugin));
        Ok(())
    }

    pub fn plugin(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    /// Enables every plugin whose `enabled` key is `true` and disables the rest.
    pub fn sync_enabled(&mut self) -> Result<()> {
        for plugin in &mut self.plugins {
            let wanted = self.ctx.config.get_bool(plugin.name(), KEY_ENABLED, false);
            if wanted && !plugin.is_enabled() {
                plugin
                    .enable()
                    .with_context(|| format!("Failed to enable plugin '{}'", plugin.name()))?;
            } else if !wanted && plugin.is_enabled() {
                plugin
                    .disable()
                    .with_context(|| format!("Failed to disable plugin '{}'", plugin.name()))?;
            }
        }
        Ok(())
    }

    pub fn disable_all(&mut self) -> Result<()> {
        for plugin in &mut self.plugins {
            plugin.disable()?;
        }
        Ok(())
    }
}
