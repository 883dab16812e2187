//! Least-utilized node scoring.

use std::sync::Arc;

use tracing::trace;

use gridsched_api::{MAX_NODE_SCORE, NodeInfo, TaskInfo};

use crate::config::UsageConfig;

/// Scores nodes by idle CPU. Memory does not participate.
#[derive(Debug, Clone)]
pub struct ScoreEvaluator {
    config: Arc<UsageConfig>,
}

impl ScoreEvaluator {
    pub fn new(config: Arc<UsageConfig>) -> Self {
        Self { config }
    }

    /// Score in `0.0..=MAX_NODE_SCORE * weight`. Nodes without a CPU
    /// reading for the configured period score 0.
    pub fn score(&self, task: &TaskInfo, node: &NodeInfo) -> f64 {
        let period = self.config.sample_period.as_str();
        if period.is_empty() {
            return 0.0;
        }

        let Some(cpu) = node.resource_usage.cpu(period) else {
            trace!(node = %node.name, %period, "no cpu reading, score 0");
            return 0.0;
        };

        let score = idle_cpu_score(cpu, self.config.weight);
        trace!(task = %task.key(), node = %node.name, cpu, score, "usage score");
        score
    }
}

/// `(100 - cpu) / 100 * MAX_NODE_SCORE * weight`.
pub fn idle_cpu_score(cpu_usage_pct: f64, weight: u32) -> f64 {
    (100.0 - cpu_usage_pct) / 100.0 * MAX_NODE_SCORE * f64::from(weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridsched_api::ResourceUsage;

    fn evaluator(period: &str, weight: u32) -> ScoreEvaluator {
        ScoreEvaluator::new(Arc::new(UsageConfig {
            sample_period: period.to_string(),
            weight,
            ..UsageConfig::default()
        }))
    }

    fn make_node(cpu: f64, mem: f64) -> NodeInfo {
        NodeInfo::with_usage("n1", ResourceUsage::single("10m", cpu, mem))
    }

    fn task() -> TaskInfo {
        TaskInfo::new("default", "job-0")
    }

    #[test]
    fn idle_node_scores_max_times_weight() {
        let s = evaluator("10m", 10);
        assert_eq!(s.score(&task(), &make_node(0.0, 0.0)), MAX_NODE_SCORE * 10.0);
    }

    #[test]
    fn saturated_node_scores_zero() {
        let s = evaluator("10m", 10);
        assert_eq!(s.score(&task(), &make_node(100.0, 0.0)), 0.0);
    }

    #[test]
    fn half_used_node_scores_half() {
        let s = evaluator("10m", 10);
        assert_eq!(s.score(&task(), &make_node(50.0, 40.0)), 0.5 * MAX_NODE_SCORE * 10.0);
    }

    #[test]
    fn score_decreases_with_cpu_usage() {
        let s = evaluator("10m", 3);
        let mut previous = f64::INFINITY;
        for cpu in [0.0, 12.5, 33.0, 50.0, 77.7, 99.0, 100.0] {
            let score = s.score(&task(), &make_node(cpu, 0.0));
            assert!(score <= previous, "score {score} at cpu {cpu} exceeds {previous}");
            previous = score;
        }
    }

    #[test]
    fn memory_does_not_affect_score() {
        let s = evaluator("10m", 1);
        assert_eq!(
            s.score(&task(), &make_node(20.0, 0.0)),
            s.score(&task(), &make_node(20.0, 95.0))
        );
    }

    #[test]
    fn empty_period_scores_zero() {
        let s = evaluator("", 10);
        assert_eq!(s.score(&task(), &make_node(0.0, 0.0)), 0.0);
    }

    #[test]
    fn missing_reading_scores_zero() {
        let s = evaluator("1h", 10);
        assert_eq!(s.score(&task(), &make_node(0.0, 0.0)), 0.0);
        assert_eq!(s.score(&task(), &NodeInfo::new("bare")), 0.0);
    }

    #[test]
    fn zero_weight_scores_zero() {
        let s = evaluator("10m", 0);
        assert_eq!(s.score(&task(), &make_node(10.0, 0.0)), 0.0);
    }
}
