use serde::{Deserialize, Serialize};

use super::defaults;

/// Bounds for a single cascade traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Effects landing after this many days are neither expanded nor enqueued.
    pub horizon_days: u32,
    /// Paths whose cumulative confidence drops below this stop.
    pub min_confidence: f64,
    /// Paths whose absolute magnitude drops below this stop.
    pub min_magnitude: f64,
    /// Maximum hops from the trigger.
    pub max_order: u32,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            horizon_days: defaults::DEFAULT_HORIZON_DAYS,
            min_confidence: defaults::DEFAULT_MIN_CONFIDENCE,
            min_magnitude: defaults::DEFAULT_MIN_MAGNITUDE,
            max_order: defaults::DEFAULT_MAX_ORDER,
        }
    }
}

impl PropagationConfig {
    /// Default thresholds with a different horizon.
    pub fn with_horizon(horizon_days: u32) -> Self {
        Self {
            horizon_days,
            ..Self::default()
        }
    }
}
