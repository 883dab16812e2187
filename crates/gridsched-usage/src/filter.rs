//! Utilization threshold predicate.

use std::sync::Arc;

use tracing::trace;

use gridsched_api::{FitError, NodeInfo, TaskInfo};

use crate::PLUGIN_NAME;
use crate::config::UsageConfig;

/// Rejects nodes whose recent CPU or memory utilization exceeds the
/// configured thresholds.
#[derive(Debug, Clone)]
pub struct FilterEvaluator {
    config: Arc<UsageConfig>,
}

impl FilterEvaluator {
    pub fn new(config: Arc<UsageConfig>) -> Self {
        Self { config }
    }

    /// A reading equal to the threshold passes. A node with no reading
    /// for the configured period is treated as idle.
    pub fn filter(&self, task: &TaskInfo, node: &NodeInfo) -> Result<(), FitError> {
        let period = self.config.sample_period.as_str();
        if period.is_empty() {
            return Ok(());
        }

        let usage = &node.resource_usage;
        let cpu = usage.cpu(period).unwrap_or(0.0);
        if cpu > self.config.cpu_threshold_pct {
            return Err(FitError::new(
                PLUGIN_NAME,
                &node.name,
                format!(
                    "node {} cpu usage {} exceeds the threshold {}",
                    node.name, cpu, self.config.cpu_threshold_pct
                ),
            ));
        }

        let mem = usage.mem(period).unwrap_or(0.0);
        if mem > self.config.mem_threshold_pct {
            return Err(FitError::new(
                PLUGIN_NAME,
                &node.name,
                format!(
                    "node {} mem usage {} exceeds the threshold {}",
                    node.name, mem, self.config.mem_threshold_pct
                ),
            ));
        }

        trace!(task = %task.key(), node = %node.name, cpu, mem, "usage filter passed");
        Ok(())
    }
}
