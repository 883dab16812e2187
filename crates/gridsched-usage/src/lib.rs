//! gridsched-usage — the `usage` scheduling plugin.
//!
//! Rejects nodes whose recent CPU or memory utilization exceeds the
//! configured thresholds and prefers nodes with idle CPU.
//!
//! # Components
//!
//! - **`config`** — decodes raw arguments into [`UsageConfig`] with defaults
//! - **`bootstrap`** — one-time snapshot recovery after a scheduler restart
//! - **`filter`** — threshold predicate ([`FilterEvaluator`])
//! - **`score`** — idle-CPU node score ([`ScoreEvaluator`])
//! - **`plugin`** — session lifecycle wiring ([`UsagePlugin`])
//!
//! # Configuration
//!
//! ```toml
//! [[tiers.plugins]]
//! name = "usage"
//! [tiers.plugins.arguments]
//! "usage.weight" = 10
//! type = "average"
//! period = "10m"
//! thresholds = { cpu = 70, mem = 70 }
//! ```

pub mod bootstrap;
pub mod config;
pub mod filter;
pub mod plugin;
pub mod score;

pub use bootstrap::{BootstrapOutcome, SkipReason, bootstrap};
pub use config::{ConfigWarning, Resolved, UsageConfig, UsageMode, resolve};
pub use filter::FilterEvaluator;
pub use plugin::{UsagePlugin, build};
pub use score::{ScoreEvaluator, idle_cpu_score};

use gridsched_framework::PluginRegistry;

/// Name the plugin registers under.
pub const PLUGIN_NAME: &str = "usage";

/// Register the usage plugin builder.
pub fn register(registry: &mut PluginRegistry) {
    registry.register(PLUGIN_NAME, build);
}
