//! Per-entry traversal state for the propagation queue.

use cascade_core::config::PropagationConfig;
use cascade_core::constants::DEDUP_MAGNITUDE_DECIMALS;

use super::effect::ChainStep;

/// A pending visit: an entity reached with a given magnitude, day and
/// confidence along `chain`.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub entity: String,
    pub magnitude: f64,
    pub day: f64,
    pub confidence: f64,
    pub order: u32,
    pub chain: Vec<ChainStep>,
}

impl QueueEntry {
    pub fn visit_key(&self) -> VisitKey {
        VisitKey::new(&self.entity, self.magnitude)
    }
}

/// Deduplication key: entity plus magnitude rounded to three decimals.
///
/// An entity may be revisited at a materially different magnitude (a
/// different causal path) but never at a near-identical one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VisitKey {
    pub entity: String,
    pub magnitude_milli: i64,
}

impl VisitKey {
    pub fn new(entity: &str, magnitude: f64) -> Self {
        let factor = 10f64.powi(DEDUP_MAGNITUDE_DECIMALS);
        Self {
            entity: entity.to_string(),
            magnitude_milli: (magnitude * factor).round() as i64,
        }
    }
}

/// Why a node was not expanded further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    MaxOrder,
    LowConfidence,
    LowMagnitude,
    BeyondHorizon,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MaxOrder => "max_order",
            Self::LowConfidence => "low_confidence",
            Self::LowMagnitude => "low_magnitude",
            Self::BeyondHorizon => "beyond_horizon",
        };
        f.write_str(s)
    }
}

/// Lifecycle of a dequeued entry.
///
/// `Active` → `Emitted` (order > 0) → `Expanded` or `Pruned(reason)`.
/// The seed skips `Emitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Active,
    Emitted,
    Expanded,
    Pruned(StopReason),
}

impl NodeState {
    /// State after emission bookkeeping for an entry of `order`.
    pub fn after_visit(order: u32) -> Self {
        if order > 0 {
            Self::Emitted
        } else {
            Self::Active
        }
    }

    /// Terminal state given the expansion check.
    pub fn settle(entry: &QueueEntry, config: &PropagationConfig) -> Self {
        match stop_reason(entry, config) {
            Some(reason) => Self::Pruned(reason),
            None => Self::Expanded,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Expanded | Self::Pruned(_))
    }
}

/// First condition that stops expansion of `entry`, checked in the order
/// max order, confidence, magnitude, horizon.
pub fn stop_reason(entry: &QueueEntry, config: &PropagationConfig) -> Option<StopReason> {
    if entry.order >= config.max_order {
        return Some(StopReason::MaxOrder);
    }
    if entry.confidence < config.min_confidence {
        return Some(StopReason::LowConfidence);
    }
    if entry.magnitude.abs() < config.min_magnitude {
        return Some(StopReason::LowMagnitude);
    }
    if entry.day > f64::from(config.horizon_days) {
        return Some(StopReason::BeyondHorizon);
    }
    None
}

/// Why a candidate child is not enqueued, if it is rejected.
/// The order check is implied: a parent is only expanded below `max_order`.
pub fn child_rejection(
    magnitude: f64,
    confidence: f64,
    day: f64,
    config: &PropagationConfig,
) -> Option<StopReason> {
    if magnitude.abs() < config.min_magnitude {
        return Some(StopReason::LowMagnitude);
    }
    if confidence < config.min_confidence {
        return Some(StopReason::LowConfidence);
    }
    if day > f64::from(config.horizon_days) {
        return Some(StopReason::BeyondHorizon);
    }
    None
}
