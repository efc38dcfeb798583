//! Breadth-first shock propagation.

use std::collections::{HashSet, VecDeque};

use rand::Rng;

use cascade_core::config::PropagationConfig;
use cascade_core::models::Event;
use cascade_observability::events;

use crate::graph::CausalGraph;
use crate::narrative::render_explanation;

use super::cascade::Cascade;
use super::effect::{ChainStep, Effect};
use super::state::{child_rejection, NodeState, QueueEntry};

/// Propagate `event` through `graph` using the thread-local RNG for delays.
pub fn propagate(event: &Event, graph: &CausalGraph, config: &PropagationConfig) -> Cascade {
    propagate_with_rng(event, graph, config, &mut rand::thread_rng())
}

/// Propagate with an explicit RNG.
///
/// FIFO traversal seeded with the trigger at order 0. Each dequeued entry is
/// deduplicated on `(entity, magnitude rounded to 3 decimals)`, emitted as an
/// effect unless it is the seed, then expanded over the target-sorted
/// outgoing links unless a stop condition holds. Children that fail the
/// magnitude, confidence or horizon thresholds are never enqueued.
///
/// Effects come back sorted by day ascending, then confidence descending.
pub fn propagate_with_rng<R: Rng + ?Sized>(
    event: &Event,
    graph: &CausalGraph,
    config: &PropagationConfig,
    rng: &mut R,
) -> Cascade {
    let mut queue = VecDeque::new();
    queue.push_back(QueueEntry {
        entity: event.entity.clone(),
        magnitude: event.magnitude,
        day: 0.0,
        confidence: 1.0,
        order: 0,
        chain: vec![ChainStep::Trigger(event.clone())],
    });

    let mut visited = HashSet::new();
    let mut effects = Vec::new();

    while let Some(entry) = queue.pop_front() {
        if !visited.insert(entry.visit_key()) {
            continue;
        }

        if NodeState::after_visit(entry.order) == NodeState::Emitted {
            effects.push(effect_from_entry(&entry));
        }

        if let NodeState::Pruned(reason) = NodeState::settle(&entry, config) {
            tracing::trace!(entity = %entry.entity, order = entry.order, %reason, "pruned");
            continue;
        }

        for link in graph.get_outgoing(&entry.entity) {
            let magnitude = link.propagate_magnitude(entry.magnitude);
            let confidence = link.propagate_confidence(entry.confidence);
            let day = entry.day + link.sample_delay(rng);

            if child_rejection(magnitude, confidence, day, config).is_some() {
                continue;
            }

            let mut chain = entry.chain.clone();
            chain.push(ChainStep::Link(link.clone()));
            queue.push_back(QueueEntry {
                entity: link.target.clone(),
                magnitude,
                day,
                confidence,
                order: entry.order + 1,
                chain,
            });
        }
    }

    effects.sort_by(|a, b| {
        a.day
            .total_cmp(&b.day)
            .then_with(|| b.confidence.total_cmp(&a.confidence))
    });

    let max_order = effects.iter().map(|e| e.order).max().unwrap_or(0);
    events::cascade_propagated(&event.entity, effects.len(), max_order, visited.len());

    Cascade::new(event.clone(), effects, config.horizon_days)
}

fn effect_from_entry(entry: &QueueEntry) -> Effect {
    let relationship_type = entry
        .chain
        .last()
        .and_then(ChainStep::as_link)
        .map(|link| link.relationship_type.clone())
        .unwrap_or_default();
    Effect {
        entity: entry.entity.clone(),
        magnitude: entry.magnitude,
        day: entry.day,
        confidence: entry.confidence,
        cause_chain: entry.chain.clone(),
        order: entry.order,
        relationship_type,
        explanation: String::new(),
    }
}

/// Propagate, then render each effect's `explanation` from its cause chain.
pub fn propagate_with_explanation(
    event: &Event,
    graph: &CausalGraph,
    config: &PropagationConfig,
) -> Cascade {
    let mut cascade = propagate(event, graph, config);
    explain_effects(&mut cascade, graph);
    cascade
}

/// Fill in `explanation` for every effect of an existing cascade.
pub fn explain_effects(cascade: &mut Cascade, graph: &CausalGraph) {
    for effect in &mut cascade.effects {
        effect.explanation = render_explanation(effect, graph);
    }
}
