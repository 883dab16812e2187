//! Metrics sources feeding the scheduler cache.
//!
//! A source answers "what was this node's average utilization over this
//! period". Sampling itself happens outside the scheduler.

use std::collections::HashMap;

use gridsched_api::ResourceUsage;

use crate::error::CacheResult;

/// Average utilization for one node over one sampling period.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeMetrics {
    pub cpu_usage_avg: Option<f64>,
    pub mem_usage_avg: Option<f64>,
}

/// Backend that reports per-node utilization averages.
pub trait MetricsSource: Send + Sync {
    /// Readings for `node` over `period`; `None` when the source has
    /// nothing for that node yet.
    fn node_metrics(&self, node: &str, period: &str) -> CacheResult<Option<NodeMetrics>>;
}

/// A source serving fixed readings, keyed by node name.
#[derive(Debug, Clone, Default)]
pub struct StaticMetricsSource {
    readings: HashMap<String, ResourceUsage>,
}

impl StaticMetricsSource {
    pub fn new(readings: HashMap<String, ResourceUsage>) -> Self {
        Self { readings }
    }

    pub fn insert(&mut self, node: impl Into<String>, usage: ResourceUsage) {
        self.readings.insert(node.into(), usage);
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.readings.keys().map(String::as_str)
    }
}

impl MetricsSource for StaticMetricsSource {
    fn node_metrics(&self, node: &str, period: &str) -> CacheResult<Option<NodeMetrics>> {
        let Some(usage) = self.readings.get(node) else {
            return Ok(None);
        };
        let metrics = NodeMetrics {
            cpu_usage_avg: usage.cpu(period),
            mem_usage_avg: usage.mem(period),
        };
        if metrics.cpu_usage_avg.is_none() && metrics.mem_usage_avg.is_none() {
            return Ok(None);
        }
        Ok(Some(metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_source_reports_known_period() {
        let mut source = StaticMetricsSource::default();
        source.insert("n1", ResourceUsage::single("10m", 30.0, 60.0));

        let metrics = source.node_metrics("n1", "10m").unwrap().unwrap();
        assert_eq!(metrics.cpu_usage_avg, Some(30.0));
        assert_eq!(metrics.mem_usage_avg, Some(60.0));
    }

    #[test]
    fn static_source_has_nothing_for_unknown_node_or_period() {
        let mut source = StaticMetricsSource::default();
        source.insert("n1", ResourceUsage::single("10m", 30.0, 60.0));

        assert!(source.node_metrics("n2", "10m").unwrap().is_none());
        assert!(source.node_metrics("n1", "1h").unwrap().is_none());
    }
}
