//! LearningEngine: facade over the feedback and backtest functions.

use cascade_causal::graph::CausalGraph;
use cascade_causal::propagation::Cascade;
use cascade_core::config::LearningConfig;
use cascade_core::models::Outcome;

use crate::backtest::{update_graph_from_backtest, BacktestLearningStats, HistoricalObservation};
use crate::feedback::{learn_from_outcomes, LearningStats};

/// Applies outcomes to a graph with configured learning rates.
#[derive(Debug, Clone, Default)]
pub struct LearningEngine {
    config: LearningConfig,
}

impl LearningEngine {
    pub fn new(config: LearningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// Learn from one cascade at the online learning rate.
    pub fn learn(&self, cascade: &Cascade, outcomes: &[Outcome], graph: &mut CausalGraph) -> LearningStats {
        learn_from_outcomes(cascade, outcomes, graph, self.config.learning_rate)
    }

    /// Learn from a batch of historical observations at the backtest rate.
    pub fn learn_from_history(
        &self,
        graph: &mut CausalGraph,
        observations: &[HistoricalObservation],
    ) -> BacktestLearningStats {
        update_graph_from_backtest(graph, observations, self.config.backtest_learning_rate)
    }
}
