//! gridsched-framework — the host side of the plugin contract.
//!
//! Plugins never drive scheduling themselves. The framework opens a
//! [`Session`] over the current node list, lets every configured plugin
//! register predicate and node-order callbacks, and then invokes those
//! callbacks once per task/node candidate pair.
//!
//! # Architecture
//!
//! ```text
//! open_session(conf, registry, context, cache, nodes)
//!   ├── PluginRegistry::build()  → one plugin instance per session
//!   ├── Plugin::on_session_open() → add_predicate_fn / add_node_order_fn
//!   └── Session
//!       ├── predicate()   ← first rejection wins
//!       ├── node_order()  ← sum over plugins
//!       └── Arc<dyn Cache> (refresh_metrics, usage_source)
//! ```

pub mod cache;
pub mod conf;
pub mod context;
pub mod error;
pub mod metrics;
pub mod plugin;
pub mod session;

pub use cache::{Cache, NodeUsageSource, SchedulerCache};
pub use conf::{PluginOption, SchedulerConf, Tier};
pub use context::SchedulerContext;
pub use error::{CacheError, CacheResult, FrameworkError, FrameworkResult};
pub use metrics::{MetricsSource, NodeMetrics, StaticMetricsSource};
pub use plugin::{Plugin, PluginBuilder, PluginRegistry};
pub use session::{NodeOrderFn, NodeScore, OpenSession, PredicateFn, Session, close_session, open_session};
