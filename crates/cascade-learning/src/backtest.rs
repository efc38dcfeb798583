//! Batch learning over historical cascades.

use serde::{Deserialize, Serialize};

use cascade_causal::graph::CausalGraph;
use cascade_causal::propagation::Cascade;
use cascade_core::models::Outcome;

use crate::feedback::learn_from_outcomes;

/// A past cascade together with the outcomes observed after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalObservation {
    pub cascade: Cascade,
    pub outcomes: Vec<Outcome>,
}

impl HistoricalObservation {
    pub fn new(cascade: Cascade, outcomes: Vec<Outcome>) -> Self {
        Self { cascade, outcomes }
    }
}

/// Totals across a batch of historical observations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestLearningStats {
    pub events_processed: usize,
    pub total_links_updated: usize,
    pub total_predictions_matched: usize,
    /// Mean direction accuracy over events that matched at least one
    /// prediction.
    pub average_direction_accuracy: f64,
}

/// Apply `learn_from_outcomes` to each observation in order.
pub fn update_graph_from_backtest(
    graph: &mut CausalGraph,
    observations: &[HistoricalObservation],
    learning_rate: f64,
) -> BacktestLearningStats {
    let mut totals = BacktestLearningStats::default();
    let mut accuracies = Vec::new();

    for observation in observations {
        let stats = learn_from_outcomes(
            &observation.cascade,
            &observation.outcomes,
            graph,
            learning_rate,
        );
        totals.events_processed += 1;
        totals.total_links_updated += stats.links_updated;
        totals.total_predictions_matched += stats.predictions_matched;
        if stats.predictions_matched > 0 {
            accuracies.push(stats.direction_accuracy);
        }
    }

    if !accuracies.is_empty() {
        totals.average_direction_accuracy = accuracies.iter().sum::<f64>() / accuracies.len() as f64;
    }
    totals
}
