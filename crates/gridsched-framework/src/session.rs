//! Scheduling sessions.
//!
//! A session snapshots the node list at the start of a scheduling cycle
//! and collects the callbacks plugins register for it. Callbacks are
//! stored behind `Arc` so the framework may evaluate node candidates
//! concurrently.

use std::sync::Arc;

use tracing::{debug, info, trace};

use gridsched_api::{FitError, NodeInfo, TaskInfo};

use crate::cache::Cache;
use crate::conf::SchedulerConf;
use crate::context::SchedulerContext;
use crate::error::FrameworkResult;
use crate::plugin::{Plugin, PluginRegistry};

/// Predicate callback: `Ok(())` keeps the node, `Err` rejects it.
pub type PredicateFn = Arc<dyn Fn(&TaskInfo, &NodeInfo) -> Result<(), FitError> + Send + Sync>;

/// Node-order callback: higher is better.
pub type NodeOrderFn = Arc<dyn Fn(&TaskInfo, &NodeInfo) -> f64 + Send + Sync>;

/// Aggregated score of one node for one task.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeScore {
    pub node: String,
    pub score: f64,
}

/// One scheduling cycle.
pub struct Session {
    uid: String,
    /// Working node list. Plugins may refresh snapshots during setup.
    nodes: Vec<NodeInfo>,
    cache: Arc<dyn Cache>,
    predicate_fns: Vec<(String, PredicateFn)>,
    node_order_fns: Vec<(String, NodeOrderFn)>,
}

impl Session {
    pub fn new(uid: impl Into<String>, cache: Arc<dyn Cache>, nodes: Vec<NodeInfo>) -> Self {
        Self {
            uid: uid.into(),
            nodes,
            cache,
            predicate_fns: Vec::new(),
            node_order_fns: Vec::new(),
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Shared handle to the scheduler cache.
    pub fn cache(&self) -> Arc<dyn Cache> {
        Arc::clone(&self.cache)
    }

    pub fn nodes(&self) -> &[NodeInfo] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [NodeInfo] {
        &mut self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&NodeInfo> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn add_predicate_fn(&mut self, plugin: &str, f: PredicateFn) {
        self.predicate_fns.push((plugin.to_string(), f));
    }

    pub fn add_node_order_fn(&mut self, plugin: &str, f: NodeOrderFn) {
        self.node_order_fns.push((plugin.to_string(), f));
    }

    /// Plugins that registered a predicate, in registration order.
    pub fn predicate_plugins(&self) -> impl Iterator<Item = &str> {
        self.predicate_fns.iter().map(|(name, _)| name.as_str())
    }

    /// Plugins that registered a node-order function, in registration order.
    pub fn node_order_plugins(&self) -> impl Iterator<Item = &str> {
        self.node_order_fns.iter().map(|(name, _)| name.as_str())
    }

    /// Run every registered predicate. The first rejection wins.
    pub fn predicate(&self, task: &TaskInfo, node: &NodeInfo) -> Result<(), FitError> {
        for (plugin, f) in &self.predicate_fns {
            if let Err(err) = f(task, node) {
                trace!(%plugin, node = %node.name, task = %task.key(), "predicate rejected node");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Sum of every registered node-order score.
    pub fn node_order(&self, task: &TaskInfo, node: &NodeInfo) -> f64 {
        self.node_order_fns.iter().map(|(_, f)| f(task, node)).sum()
    }

    /// Split the node list into feasible nodes and rejection reasons.
    pub fn feasible_nodes(&self, task: &TaskInfo) -> (Vec<&NodeInfo>, Vec<FitError>) {
        let mut feasible = Vec::new();
        let mut rejected = Vec::new();
        for node in &self.nodes {
            match self.predicate(task, node) {
                Ok(()) => feasible.push(node),
                Err(err) => rejected.push(err),
            }
        }
        (feasible, rejected)
    }

    /// Score feasible nodes and return them best first.
    pub fn rank_nodes(&self, task: &TaskInfo) -> Vec<NodeScore> {
        let (feasible, _) = self.feasible_nodes(task);
        let mut scores: Vec<NodeScore> = feasible
            .into_iter()
            .map(|node| NodeScore {
                node: node.name.clone(),
                score: self.node_order(task, node),
            })
            .collect();

        scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scores
    }
}

/// A session together with the plugin instances that opened it.
pub struct OpenSession {
    pub session: Session,
    plugins: Vec<Box<dyn Plugin>>,
}

impl OpenSession {
    pub fn plugin_names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|p| p.name())
    }
}

/// Open a session: build every configured plugin and let each register
/// its callbacks, tier by tier.
pub fn open_session(
    conf: &SchedulerConf,
    registry: &PluginRegistry,
    context: &SchedulerContext,
    cache: Arc<dyn Cache>,
    nodes: Vec<NodeInfo>,
) -> FrameworkResult<OpenSession> {
    let mut session = Session::new(context.next_session_id(), cache, nodes);

    let plugins = conf
        .plugins()
        .map(|opt| registry.build(&opt.name, opt.arguments.clone(), context.clone()))
        .collect::<FrameworkResult<Vec<_>>>()?;

    for plugin in &plugins {
        debug!(session = %session.uid, plugin = plugin.name(), "opening plugin");
        plugin.on_session_open(&mut session);
    }

    info!(
        session = %session.uid,
        plugins = plugins.len(),
        nodes = session.nodes.len(),
        "session opened"
    );
    Ok(OpenSession { session, plugins })
}

/// Close a session, giving every plugin its close hook.
pub fn close_session(open: OpenSession) {
    let OpenSession {
        mut session,
        plugins,
    } = open;
    for plugin in &plugins {
        plugin.on_session_close(&mut session);
    }
    info!(session = %session.uid, "session closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CacheResult, FrameworkError};
    use gridsched_api::Arguments;

    struct NullCache;

    impl Cache for NullCache {
        fn refresh_metrics(&self, _period: &str) -> CacheResult<()> {
            Ok(())
        }
    }

    fn session_with(names: &[&str]) -> Session {
        let nodes = names.iter().map(|n| NodeInfo::new(*n)).collect();
        Session::new("s-1", Arc::new(NullCache), nodes)
    }

    /// Rejects node "bad" and scores nodes by name length.
    struct ToyPlugin;

    impl Plugin for ToyPlugin {
        fn name(&self) -> &str {
            "toy"
        }

        fn on_session_open(&self, ssn: &mut Session) {
            ssn.add_predicate_fn(
                "toy",
                Arc::new(|_task: &TaskInfo, node: &NodeInfo| {
                    if node.name == "bad" {
                        Err(FitError::new("toy", &node.name, "node is bad"))
                    } else {
                        Ok(())
                    }
                }),
            );
            ssn.add_node_order_fn(
                "toy",
                Arc::new(|_task: &TaskInfo, node: &NodeInfo| node.name.len() as f64),
            );
        }

        fn on_session_close(&self, _ssn: &mut Session) {}
    }

    fn build_toy(_args: Arguments, _ctx: SchedulerContext) -> Box<dyn Plugin> {
        Box::new(ToyPlugin)
    }

    fn toy_conf() -> SchedulerConf {
        SchedulerConf::from_toml("[[tiers]]\n[[tiers.plugins]]\nname = \"toy\"\n").unwrap()
    }

    #[test]
    fn empty_session_accepts_everything() {
        let ssn = session_with(&["n1"]);
        let task = TaskInfo::new("default", "t");
        assert!(ssn.predicate(&task, &ssn.nodes()[0]).is_ok());
        assert_eq!(ssn.node_order(&task, &ssn.nodes()[0]), 0.0);
    }

    #[test]
    fn first_rejection_wins() {
        let mut ssn = session_with(&["n1"]);
        ssn.add_predicate_fn(
            "a",
            Arc::new(|_: &TaskInfo, n: &NodeInfo| -> Result<(), FitError> {
                Err(FitError::new("a", &n.name, "first"))
            }),
        );
        ssn.add_predicate_fn(
            "b",
            Arc::new(|_: &TaskInfo, n: &NodeInfo| -> Result<(), FitError> {
                Err(FitError::new("b", &n.name, "second"))
            }),
        );

        let task = TaskInfo::new("default", "t");
        let err = ssn.predicate(&task, &ssn.nodes()[0]).unwrap_err();
        assert_eq!(err.plugin, "a");
        assert_eq!(ssn.predicate_plugins().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn node_order_sums_plugins() {
        let mut ssn = session_with(&["n1"]);
        ssn.add_node_order_fn("a", Arc::new(|_: &TaskInfo, _: &NodeInfo| 10.0));
        ssn.add_node_order_fn("b", Arc::new(|_: &TaskInfo, _: &NodeInfo| 2.5));

        let task = TaskInfo::new("default", "t");
        assert_eq!(ssn.node_order(&task, &ssn.nodes()[0]), 12.5);
    }

    #[test]
    fn open_session_registers_plugin_callbacks() {
        let mut registry = PluginRegistry::new();
        registry.register("toy", build_toy);
        let ctx = SchedulerContext::new();
        let nodes = vec![NodeInfo::new("bad"), NodeInfo::new("n1"), NodeInfo::new("node-22")];

        let open = open_session(&toy_conf(), &registry, &ctx, Arc::new(NullCache), nodes).unwrap();
        assert_eq!(open.plugin_names().collect::<Vec<_>>(), vec!["toy"]);
        assert_eq!(open.session.uid(), "session-1");

        let task = TaskInfo::new("default", "t");
        let (feasible, rejected) = open.session.feasible_nodes(&task);
        assert_eq!(feasible.len(), 2);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].node, "bad");

        let ranked = open.session.rank_nodes(&task);
        assert_eq!(ranked[0].node, "node-22");
        assert_eq!(ranked[1].node, "n1");

        close_session(open);
    }

    #[test]
    fn unknown_plugin_fails_session_open() {
        let registry = PluginRegistry::new();
        let ctx = SchedulerContext::new();
        let result = open_session(&toy_conf(), &registry, &ctx, Arc::new(NullCache), Vec::new());
        assert!(matches!(result, Err(FrameworkError::UnknownPlugin(name)) if name == "toy"));
    }
}
