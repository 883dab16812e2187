//! The `usage` plugin lifecycle.

use std::sync::Arc;

use tracing::debug;

use gridsched_api::{Arguments, NodeInfo, TaskInfo};
use gridsched_framework::{Plugin, SchedulerContext, Session};

use crate::PLUGIN_NAME;
use crate::bootstrap::bootstrap;
use crate::config::{ConfigWarning, UsageConfig, resolve};
use crate::filter::FilterEvaluator;
use crate::score::ScoreEvaluator;

/// Filters over-utilized nodes and prefers idle ones.
pub struct UsagePlugin {
    config: Arc<UsageConfig>,
    warnings: Vec<ConfigWarning>,
    context: SchedulerContext,
}

impl UsagePlugin {
    /// Resolve `args` into the plugin's configuration.
    pub fn new(args: &Arguments, context: SchedulerContext) -> Self {
        let resolved = resolve(args);
        Self {
            config: Arc::new(resolved.config),
            warnings: resolved.warnings,
            context,
        }
    }

    pub fn config(&self) -> &UsageConfig {
        &self.config
    }

    /// Anomalies found while resolving the arguments.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }
}

/// [`gridsched_framework::PluginBuilder`] for the usage plugin.
pub fn build(args: Arguments, context: SchedulerContext) -> Box<dyn Plugin> {
    Box::new(UsagePlugin::new(&args, context))
}

impl Plugin for UsagePlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn on_session_open(&self, ssn: &mut Session) {
        debug!(plugin = PLUGIN_NAME, session = %ssn.uid(), "enter usage plugin");

        for node in ssn.nodes() {
            let usage = &node.resource_usage;
            debug!(
                node = %node.name,
                cpu = ?usage.cpu_usage_avg,
                mem = ?usage.mem_usage_avg,
                "node usage"
            );
        }

        let outcome = bootstrap(&self.config, &self.context, ssn);
        debug!(plugin = PLUGIN_NAME, ?outcome, "bootstrap finished");

        let filter = FilterEvaluator::new(Arc::clone(&self.config));
        ssn.add_predicate_fn(
            PLUGIN_NAME,
            Arc::new(move |task: &TaskInfo, node: &NodeInfo| filter.filter(task, node)),
        );

        let scorer = ScoreEvaluator::new(Arc::clone(&self.config));
        ssn.add_node_order_fn(
            PLUGIN_NAME,
            Arc::new(move |task: &TaskInfo, node: &NodeInfo| scorer.score(task, node)),
        );

        debug!(plugin = PLUGIN_NAME, session = %ssn.uid(), "leaving usage plugin");
    }

    fn on_session_close(&self, _ssn: &mut Session) {}
}
