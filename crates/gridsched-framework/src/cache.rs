//! Scheduler cache capabilities.
//!
//! Plugins see the cache only through two narrow traits:
//! [`Cache`] (force a metrics refresh) and [`NodeUsageSource`] (read the
//! per-node utilization the cache holds). A backend that keeps no
//! per-node utilization simply does not expose the second capability.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::{debug, warn};

use gridsched_api::ResourceUsage;

use crate::error::CacheResult;
use crate::metrics::MetricsSource;

/// Read access to the utilization state a cache holds per node.
pub trait NodeUsageSource: Send + Sync {
    fn node_usage(&self, node: &str) -> Option<ResourceUsage>;
}

/// The scheduler cache as seen by plugins.
pub trait Cache: Send + Sync {
    /// Pull fresh utilization averages for `period` from the metrics
    /// backend. Synchronous.
    fn refresh_metrics(&self, period: &str) -> CacheResult<()>;

    /// Per-node utilization state, when this backend keeps it.
    fn usage_source(&self) -> Option<&dyn NodeUsageSource> {
        None
    }
}

/// In-memory cache that mirrors a [`MetricsSource`] for a fixed node set.
pub struct SchedulerCache {
    source: Box<dyn MetricsSource>,
    /// node name → latest utilization snapshot.
    nodes: RwLock<HashMap<String, ResourceUsage>>,
}

impl SchedulerCache {
    pub fn new<I, S>(source: Box<dyn MetricsSource>, node_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let nodes = node_names
            .into_iter()
            .map(|name| (name.into(), ResourceUsage::default()))
            .collect();
        Self {
            source,
            nodes: RwLock::new(nodes),
        }
    }

    /// Number of nodes tracked by the cache.
    pub fn len(&self) -> usize {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for SchedulerCache {
    fn refresh_metrics(&self, period: &str) -> CacheResult<()> {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        let mut refreshed = 0usize;

        for (name, usage) in nodes.iter_mut() {
            let Some(metrics) = self.source.node_metrics(name, period)? else {
                debug!(node = %name, %period, "no metrics reported for node");
                continue;
            };
            if let Some(cpu) = metrics.cpu_usage_avg {
                usage.cpu_usage_avg.insert(period.to_string(), cpu);
            }
            if let Some(mem) = metrics.mem_usage_avg {
                usage.mem_usage_avg.insert(period.to_string(), mem);
            }
            refreshed += 1;
        }

        if refreshed < nodes.len() {
            warn!(
                %period,
                refreshed,
                total = nodes.len(),
                "metrics refresh left some nodes without readings"
            );
        } else {
            debug!(%period, refreshed, "metrics refreshed");
        }
        Ok(())
    }

    fn usage_source(&self) -> Option<&dyn NodeUsageSource> {
        Some(self)
    }
}

impl NodeUsageSource for SchedulerCache {
    fn node_usage(&self, node: &str) -> Option<ResourceUsage> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(node)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::StaticMetricsSource;

    fn cache_with(readings: &[(&str, f64, f64)]) -> SchedulerCache {
        let mut source = StaticMetricsSource::default();
        for (name, cpu, mem) in readings {
            source.insert(*name, ResourceUsage::single("10m", *cpu, *mem));
        }
        let names: Vec<String> = readings.iter().map(|(n, _, _)| n.to_string()).collect();
        SchedulerCache::new(Box::new(source), names)
    }

    #[test]
    fn usage_is_empty_before_refresh() {
        let cache = cache_with(&[("n1", 40.0, 20.0)]);
        let usage = cache.node_usage("n1").unwrap();
        assert!(usage.cpu_usage_avg.is_empty());
    }

    #[test]
    fn refresh_populates_requested_period() {
        let cache = cache_with(&[("n1", 40.0, 20.0), ("n2", 90.0, 10.0)]);
        cache.refresh_metrics("10m").unwrap();

        assert_eq!(cache.node_usage("n1").unwrap().cpu("10m"), Some(40.0));
        assert_eq!(cache.node_usage("n2").unwrap().mem("10m"), Some(10.0));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn refresh_for_unknown_period_leaves_usage_empty() {
        let cache = cache_with(&[("n1", 40.0, 20.0)]);
        cache.refresh_metrics("1h").unwrap();
        assert_eq!(cache.node_usage("n1").unwrap().cpu("1h"), None);
    }

    #[test]
    fn unknown_node_has_no_usage() {
        let cache = cache_with(&[("n1", 40.0, 20.0)]);
        assert!(cache.node_usage("ghost").is_none());
    }

    #[test]
    fn scheduler_cache_exposes_usage_capability() {
        let cache = cache_with(&[]);
        assert!(cache.usage_source().is_some());
        assert!(cache.is_empty());
    }
}
