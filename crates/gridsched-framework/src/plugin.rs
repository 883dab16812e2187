//! Plugin contract and registry.

use std::collections::HashMap;

use gridsched_api::Arguments;

use crate::context::SchedulerContext;
use crate::error::{FrameworkError, FrameworkResult};
use crate::session::Session;

/// A scheduling plugin.
///
/// A fresh instance is built for every session. `on_session_open` is the
/// plugin's chance to inspect the session and register callbacks.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn on_session_open(&self, ssn: &mut Session);

    fn on_session_close(&self, ssn: &mut Session);
}

/// Constructs a plugin from its raw arguments.
pub type PluginBuilder = fn(Arguments, SchedulerContext) -> Box<dyn Plugin>;

/// Plugin name → builder.
#[derive(Default)]
pub struct PluginRegistry {
    builders: HashMap<String, PluginBuilder>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder. A later registration under the same name wins.
    pub fn register(&mut self, name: &str, builder: PluginBuilder) {
        self.builders.insert(name.to_string(), builder);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    /// Build the plugin registered under `name`.
    pub fn build(
        &self,
        name: &str,
        args: Arguments,
        context: SchedulerContext,
    ) -> FrameworkResult<Box<dyn Plugin>> {
        let builder = self
            .builders
            .get(name)
            .ok_or_else(|| FrameworkError::UnknownPlugin(name.to_string()))?;
        Ok(builder(args, context))
    }
}
