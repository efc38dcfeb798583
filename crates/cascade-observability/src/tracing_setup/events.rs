//! Structured log events for key engine operations.
//!
//! Each function emits a `tracing` event with structured fields.

/// A link was dropped while loading a graph document.
pub fn link_skipped(source: &str, target: &str, reason: &str) {
    tracing::warn!(
        event = "link_skipped",
        source = %source,
        target = %target,
        reason = %reason,
        "skipping link while loading graph"
    );
}

/// A cascade finished propagating.
pub fn cascade_propagated(trigger: &str, effects: usize, max_order: u32, visited: usize) {
    tracing::debug!(
        event = "cascade_propagated",
        trigger = %trigger,
        effects = effects,
        max_order = max_order,
        visited = visited,
        "cascade propagated"
    );
}

/// A Monte Carlo simulation finished.
pub fn simulation_completed(trigger: &str, runs: usize, entities: usize, duration_ms: u64) {
    tracing::info!(
        event = "simulation_completed",
        trigger = %trigger,
        runs = runs,
        entities = entities,
        duration_ms = duration_ms,
        "cascade simulation completed"
    );
}

/// Link weights were updated from observed outcomes.
pub fn links_learned(trigger: &str, matched: usize, links_updated: usize, direction_accuracy: f64) {
    tracing::info!(
        event = "links_learned",
        trigger = %trigger,
        matched = matched,
        links_updated = links_updated,
        direction_accuracy = direction_accuracy,
        "links updated from outcomes"
    );
}

/// A backtest suite finished.
pub fn backtest_completed(events: usize, predictions: usize, direction_accuracy: f64) {
    tracing::info!(
        event = "backtest_completed",
        events = events,
        predictions = predictions,
        direction_accuracy = direction_accuracy,
        "backtest suite completed"
    );
}

/// Actuals could not be obtained for an entity during a backtest.
pub fn actuals_unavailable(entity: &str, reason: &str) {
    tracing::warn!(
        event = "actuals_unavailable",
        entity = %entity,
        reason = %reason,
        "could not fetch actuals"
    );
}
