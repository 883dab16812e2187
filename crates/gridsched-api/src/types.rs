//! Domain types seen by scheduling plugins.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Upper bound of a single plugin's node score.
pub const MAX_NODE_SCORE: f64 = 100.0;

/// Label identifying a utilization averaging window, e.g. `"10m"`.
pub type SamplePeriod = String;

// ── Task ──────────────────────────────────────────────────────────

/// A task awaiting placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskInfo {
    pub uid: String,
    pub namespace: String,
    pub name: String,
}

impl TaskInfo {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let name = name.into();
        Self {
            uid: format!("{namespace}/{name}"),
            namespace,
            name,
        }
    }

    /// `namespace/name`, used in log lines.
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

// ── Node ──────────────────────────────────────────────────────────

/// Average utilization per sampling period, in percent (0–100).
///
/// A missing period means no telemetry is available yet for that window.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceUsage {
    #[serde(default, rename = "cpu")]
    pub cpu_usage_avg: HashMap<SamplePeriod, f64>,
    #[serde(default, rename = "mem")]
    pub mem_usage_avg: HashMap<SamplePeriod, f64>,
}

impl ResourceUsage {
    /// Build a snapshot holding a single reading for `period`.
    pub fn single(period: &str, cpu: f64, mem: f64) -> Self {
        let mut usage = Self::default();
        usage.cpu_usage_avg.insert(period.to_string(), cpu);
        usage.mem_usage_avg.insert(period.to_string(), mem);
        usage
    }

    pub fn cpu(&self, period: &str) -> Option<f64> {
        self.cpu_usage_avg.get(period).copied()
    }

    pub fn mem(&self, period: &str) -> Option<f64> {
        self.mem_usage_avg.get(period).copied()
    }
}

/// A candidate node as seen by the scheduling session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeInfo {
    pub name: String,
    /// Latest utilization snapshot. Owned by the metrics cache.
    #[serde(default)]
    pub resource_usage: ResourceUsage,
}

impl NodeInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_usage: ResourceUsage::default(),
        }
    }

    pub fn with_usage(name: impl Into<String>, resource_usage: ResourceUsage) -> Self {
        Self {
            name: name.into(),
            resource_usage,
        }
    }
}
