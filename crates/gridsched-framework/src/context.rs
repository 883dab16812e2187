//! Scheduler-scoped state shared by every session of one scheduler.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// State that outlives individual sessions.
///
/// Cloning is cheap; clones share the same underlying cells. A fresh
/// context models a freshly started scheduler process.
#[derive(Debug, Clone, Default)]
pub struct SchedulerContext {
    /// The utilization sampling period established for this scheduler.
    /// Empty until the first plugin claims it.
    sampling_period: Arc<OnceLock<String>>,
    sessions: Arc<AtomicU64>,
}

impl SchedulerContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The established sampling period, if any.
    pub fn sampling_period(&self) -> Option<&str> {
        self.sampling_period.get().map(String::as_str)
    }

    /// Establish the sampling period if none is set yet.
    ///
    /// Returns `true` for exactly one caller over the context's lifetime.
    pub fn claim_sampling_period(&self, period: &str) -> bool {
        self.sampling_period.set(period.to_string()).is_ok()
    }

    /// Allocate the next session id.
    pub fn next_session_id(&self) -> String {
        let n = self.sessions.fetch_add(1, Ordering::Relaxed) + 1;
        format!("session-{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_period_starts_empty() {
        let ctx = SchedulerContext::new();
        assert_eq!(ctx.sampling_period(), None);
    }

    #[test]
    fn sampling_period_is_claimed_once() {
        let ctx = SchedulerContext::new();
        assert!(ctx.claim_sampling_period("10m"));
        assert!(!ctx.claim_sampling_period("5m"));
        assert_eq!(ctx.sampling_period(), Some("10m"));
    }

    #[test]
    fn clones_share_state() {
        let ctx = SchedulerContext::new();
        let other = ctx.clone();
        assert!(other.claim_sampling_period("1h"));
        assert_eq!(ctx.sampling_period(), Some("1h"));

        assert_eq!(ctx.next_session_id(), "session-1");
        assert_eq!(other.next_session_id(), "session-2");
    }
}
