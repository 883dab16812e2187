//! Restart recovery for utilization snapshots.
//!
//! After a scheduler restart the cache holds no utilization data and no
//! sampling period is established. The first usage plugin to open a
//! session claims the period, forces a metrics refresh and copies the
//! fresh snapshots into the session's node list so that filtering and
//! scoring see real readings from the very first cycle.

use std::fmt;

use tracing::{debug, error, info, warn};

use gridsched_framework::{SchedulerContext, Session};

use crate::PLUGIN_NAME;
use crate::config::UsageConfig;

/// Why a bootstrap did not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The arguments carried no `thresholds` section.
    NoThresholds,
    /// Filtering and scoring are disabled, there is nothing to recover.
    EmptyPeriod,
    /// A sampling period is already established for this scheduler.
    PeriodEstablished(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoThresholds => f.write_str("no thresholds configured"),
            Self::EmptyPeriod => f.write_str("sample period is empty"),
            Self::PeriodEstablished(p) => write!(f, "sampling period {p} already established"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Skipped(SkipReason),
    /// Snapshots were copied for `nodes` nodes.
    Synced { nodes: usize },
    /// The cache keeps no per-node utilization; snapshots left as-is.
    CacheUnsupported,
}

/// Run the one-time snapshot recovery if this scheduler has not
/// established a sampling period yet.
pub fn bootstrap(
    config: &UsageConfig,
    context: &SchedulerContext,
    ssn: &mut Session,
) -> BootstrapOutcome {
    if !config.thresholds_configured {
        debug!(plugin = PLUGIN_NAME, "no thresholds section, skipping bootstrap");
        return BootstrapOutcome::Skipped(SkipReason::NoThresholds);
    }
    if config.sample_period.is_empty() {
        return BootstrapOutcome::Skipped(SkipReason::EmptyPeriod);
    }
    if !context.claim_sampling_period(&config.sample_period) {
        let established = context.sampling_period().unwrap_or_default().to_string();
        return BootstrapOutcome::Skipped(SkipReason::PeriodEstablished(established));
    }

    let period = config.sample_period.as_str();
    let cache = ssn.cache();
    if let Err(err) = cache.refresh_metrics(period) {
        warn!(plugin = PLUGIN_NAME, %period, error = %err, "metrics refresh failed, copying cached state");
    }

    let Some(source) = cache.usage_source() else {
        error!(
            plugin = PLUGIN_NAME,
            session = %ssn.uid(),
            "cache does not expose per-node utilization, snapshots not refreshed"
        );
        return BootstrapOutcome::CacheUnsupported;
    };

    let mut synced = 0usize;
    for node in ssn.nodes_mut() {
        match source.node_usage(&node.name) {
            Some(usage) => {
                node.resource_usage = usage;
                synced += 1;
            }
            None => debug!(node = %node.name, "node unknown to cache, keeping snapshot"),
        }
    }

    info!(plugin = PLUGIN_NAME, %period, nodes = synced, "utilization snapshots bootstrapped");
    BootstrapOutcome::Synced { nodes: synced }
}
