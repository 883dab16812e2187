//! Placement rejection type.

use thiserror::Error;

/// A node failed a plugin's predicate for a task.
///
/// Not an error of the scheduling cycle: the framework drops the node from
/// the candidate set and records the reason.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("plugin {plugin} predicates failed: {reason}")]
pub struct FitError {
    pub plugin: String,
    pub node: String,
    pub reason: String,
}

impl FitError {
    pub fn new(plugin: &str, node: &str, reason: impl Into<String>) -> Self {
        Self {
            plugin: plugin.to_string(),
            node: node.to_string(),
            reason: reason.into(),
        }
    }
}
