//! `gridsched eval` — run one session over a node utilization file and
//! report the usage plugin's verdict for every node.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::warn;

use gridsched_api::{NodeInfo, ResourceUsage, TaskInfo};
use gridsched_framework::{
    PluginRegistry, SchedulerCache, SchedulerConf, SchedulerContext, StaticMetricsSource,
    close_session, open_session,
};

/// Verdict for one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeResult {
    pub node: String,
    pub feasible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

pub fn eval(config: &Path, nodes: &Path, task: &str, cold: bool, format: &str) -> Result<()> {
    let results = evaluate(config, nodes, task, cold)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&results)?),
        _ => println!("{}", render(&results)),
    }
    Ok(())
}

/// Evaluate `task` against every node in `nodes`.
///
/// Feasible nodes come first, best score first; rejected nodes follow
/// in name order.
pub fn evaluate(config: &Path, nodes: &Path, task: &str, cold: bool) -> Result<Vec<NodeResult>> {
    let mut conf = SchedulerConf::from_file(config)
        .with_context(|| format!("loading {}", config.display()))?;
    let readings = load_readings(nodes)?;
    let task = parse_task(task)?;

    let mut registry = PluginRegistry::new();
    gridsched_usage::register(&mut registry);
    for tier in &mut conf.tiers {
        tier.plugins.retain(|p| {
            let known = registry.contains(&p.name);
            if !known {
                warn!(plugin = %p.name, "plugin not available here, skipping");
            }
            known
        });
    }

    let node_list: Vec<NodeInfo> = readings
        .iter()
        .map(|(name, usage)| {
            if cold {
                NodeInfo::new(name.as_str())
            } else {
                NodeInfo::with_usage(name.as_str(), usage.clone())
            }
        })
        .collect();
    let names: Vec<String> = readings.keys().cloned().collect();
    let source = StaticMetricsSource::new(readings.into_iter().collect());
    let cache = Arc::new(SchedulerCache::new(Box::new(source), names));

    let context = SchedulerContext::new();
    let open = open_session(&conf, &registry, &context, cache, node_list)?;

    let ssn = &open.session;
    let mut results: Vec<NodeResult> = ssn
        .nodes()
        .iter()
        .map(|node| match ssn.predicate(&task, node) {
            Ok(()) => NodeResult {
                node: node.name.clone(),
                feasible: true,
                reason: None,
                score: Some(ssn.node_order(&task, node)),
            },
            Err(err) => NodeResult {
                node: node.name.clone(),
                feasible: false,
                reason: Some(err.reason),
                score: None,
            },
        })
        .collect();
    close_session(open);

    results.sort_by(|a, b| {
        b.feasible
            .cmp(&a.feasible)
            .then_with(|| {
                let (sa, sb) = (a.score.unwrap_or(0.0), b.score.unwrap_or(0.0));
                sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.node.cmp(&b.node))
    });
    Ok(results)
}

fn load_readings(path: &Path) -> Result<BTreeMap<String, ResourceUsage>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// `namespace/name`, or a bare name in the `default` namespace.
fn parse_task(s: &str) -> Result<TaskInfo> {
    let (namespace, name) = s.split_once('/').unwrap_or(("default", s));
    if namespace.is_empty() || name.is_empty() {
        bail!("invalid task `{s}`, expected namespace/name");
    }
    Ok(TaskInfo::new(namespace, name))
}

fn render(results: &[NodeResult]) -> String {
    let mut out = format!("{:<20} {:<8} {:>10}  REASON", "NODE", "RESULT", "SCORE");
    for r in results {
        let verdict = if r.feasible { "pass" } else { "reject" };
        let score = r.score.map(|s| format!("{s:.2}")).unwrap_or_else(|| "-".to_string());
        let reason = r.reason.as_deref().unwrap_or("");
        out.push_str(&format!("\n{:<20} {:<8} {:>10}  {}", r.node, verdict, score, reason));
    }
    out
}
