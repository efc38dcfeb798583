//! Prediction/outcome comparison and the per-link update rule.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use cascade_causal::graph::CausalGraph;
use cascade_causal::graph::CausalLink;
use cascade_causal::propagation::{Cascade, Effect};
use cascade_core::constants::{
    CONFIDENCE_PENALTY, CONFIDENCE_REWARD, MAX_LEARNED_CONFIDENCE, MAX_LEARNED_STRENGTH,
    MAX_STRENGTH_ADJUSTMENT, MIN_LEARNED_CONFIDENCE, MIN_LEARNED_DELAY, MIN_LEARNED_STRENGTH,
};
use cascade_core::models::Outcome;
use cascade_observability::events;

/// A predicted effect paired with what actually happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub effect: Effect,
    pub outcome: Outcome,
    pub direction_correct: bool,
    /// `|effect.magnitude - outcome.magnitude|`
    pub magnitude_error: f64,
    /// `|effect.day - outcome.timing_days|`
    pub timing_error: f64,
}

/// Summary of one `learn_from_outcomes` call. Not stored anywhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningStats {
    pub links_updated: usize,
    pub predictions_matched: usize,
    pub direction_accuracy: f64,
    pub average_magnitude_error: f64,
    pub average_timing_error: f64,
}

/// Same sign, or both exactly zero.
pub fn same_direction(predicted: f64, actual: f64) -> bool {
    (predicted > 0.0 && actual > 0.0)
        || (predicted < 0.0 && actual < 0.0)
        || (predicted == 0.0 && actual == 0.0)
}

pub fn compare_prediction_to_outcome(effect: &Effect, outcome: &Outcome) -> PredictionOutcome {
    PredictionOutcome {
        effect: effect.clone(),
        outcome: outcome.clone(),
        direction_correct: same_direction(effect.magnitude, outcome.magnitude),
        magnitude_error: (effect.magnitude - outcome.magnitude).abs(),
        timing_error: (effect.day - outcome.timing_days).abs(),
    }
}

/// Update every link on each matched effect's chain from its outcome.
///
/// Effects are matched to the first outcome with the same entity id;
/// unmatched effects and outcomes are ignored. A link appearing in several
/// matched chains is updated once per appearance. Links that no longer
/// exist in `graph` are skipped.
pub fn learn_from_outcomes(
    cascade: &Cascade,
    outcomes: &[Outcome],
    graph: &mut CausalGraph,
    learning_rate: f64,
) -> LearningStats {
    let mut by_entity: HashMap<&str, &Outcome> = HashMap::new();
    for outcome in outcomes {
        by_entity.entry(outcome.entity.as_str()).or_insert(outcome);
    }

    let matched: Vec<PredictionOutcome> = cascade
        .effects
        .iter()
        .filter_map(|effect| {
            by_entity
                .get(effect.entity.as_str())
                .map(|outcome| compare_prediction_to_outcome(effect, outcome))
        })
        .collect();

    if matched.is_empty() {
        return LearningStats::default();
    }

    let n = matched.len() as f64;
    let mut stats = LearningStats {
        links_updated: 0,
        predictions_matched: matched.len(),
        direction_accuracy: matched.iter().filter(|m| m.direction_correct).count() as f64 / n,
        average_magnitude_error: matched.iter().map(|m| m.magnitude_error).sum::<f64>() / n,
        average_timing_error: matched.iter().map(|m| m.timing_error).sum::<f64>() / n,
    };

    for comparison in &matched {
        for chain_link in comparison.effect.links() {
            if let Some(link) = find_graph_link(graph, chain_link) {
                update_link(link, comparison, learning_rate);
                stats.links_updated += 1;
            }
        }
    }

    events::links_learned(
        &cascade.trigger.entity,
        stats.predictions_matched,
        stats.links_updated,
        stats.direction_accuracy,
    );
    stats
}

/// The graph's copy of a chain link: exact key first, then any link with the
/// same endpoints.
fn find_graph_link<'g>(graph: &'g mut CausalGraph, chain_link: &CausalLink) -> Option<&'g mut CausalLink> {
    let key = chain_link.key();
    if graph.get_link_by_key(&key).is_some() {
        return graph.get_link_by_key_mut(&key);
    }
    graph.get_link_mut(&chain_link.source, &chain_link.target)
}

/// Apply one observation to `link`.
///
/// - strength scales by `1 + clamp((|actual| / |predicted| - 1) * lr, ±0.1)`,
///   skipped when either magnitude is zero
/// - every update leaves strength in `[0.01, 0.99]` and delay mean >= 0.1
/// - delay mean moves `lr` of the way toward the observed timing; delay std
///   grows when the timing error exceeded it and shrinks otherwise, then
///   clamps to `[0.1, delay_mean]`; both skipped when timing was exact
/// - confidence gains `0.02 * lr` on a correct direction and loses
///   `0.05 * lr` otherwise, clamped to `[0.1, 0.99]`
/// - historical accuracy is an adaptive moving average with
///   `alpha = 1 / (observations + 1)`
///
/// Two updates are intentionally skipped: strength when the actual magnitude
/// is zero, and the delay distribution when the timing error is exactly zero.
pub fn update_link(link: &mut CausalLink, comparison: &PredictionOutcome, learning_rate: f64) {
    let predicted = comparison.effect.magnitude.abs();
    let actual = comparison.outcome.magnitude.abs();

    if actual != 0.0 && predicted > 0.0 {
        let adjustment = ((actual / predicted - 1.0) * learning_rate)
            .clamp(-MAX_STRENGTH_ADJUSTMENT, MAX_STRENGTH_ADJUSTMENT);
        link.strength *= 1.0 + adjustment;
    }
    link.strength = link.strength.clamp(MIN_LEARNED_STRENGTH, MAX_LEARNED_STRENGTH);

    if comparison.timing_error > 0.0 {
        let delay_diff = comparison.outcome.timing_days - link.delay_mean;
        link.delay_mean = (link.delay_mean + delay_diff * learning_rate).max(MIN_LEARNED_DELAY);

        if comparison.timing_error > link.delay_std {
            link.delay_std *= 1.0 + learning_rate * 0.5;
        } else {
            link.delay_std *= 1.0 - learning_rate * 0.2;
        }
        link.delay_std = link.delay_std.max(MIN_LEARNED_DELAY).min(link.delay_mean);
    }

    link.delay_mean = link.delay_mean.max(MIN_LEARNED_DELAY);

    let confidence_step = if comparison.direction_correct {
        CONFIDENCE_REWARD * learning_rate
    } else {
        -CONFIDENCE_PENALTY * learning_rate
    };
    link.confidence =
        (link.confidence + confidence_step).clamp(MIN_LEARNED_CONFIDENCE, MAX_LEARNED_CONFIDENCE);

    link.observation_count += 1;
    let alpha = 1.0 / (link.observation_count as f64 + 1.0);
    let accuracy = 1.0 - (comparison.magnitude_error / actual.max(0.01)).min(1.0);
    link.historical_accuracy = (1.0 - alpha) * link.historical_accuracy + alpha * accuracy;
    link.last_updated = Some(Utc::now());

    tracing::trace!(
        source = %link.source,
        target = %link.target,
        strength = link.strength,
        confidence = link.confidence,
        delay_mean = link.delay_mean,
        "link updated"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_rules() {
        assert!(same_direction(0.1, 0.2));
        assert!(same_direction(-0.1, -0.0001));
        assert!(same_direction(0.0, 0.0));
        assert!(!same_direction(0.0, 0.01));
        assert!(!same_direction(-0.1, 0.1));
    }
}
