use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An observed real-world result for one entity, matched to predicted
/// effects by entity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub entity: String,
    /// Actual signed change (decimal).
    pub magnitude: f64,
    /// Days after the trigger when the move materialized.
    pub timing_days: f64,
    pub observed_at: DateTime<Utc>,
}

impl Outcome {
    pub fn new(entity: impl Into<String>, magnitude: f64, timing_days: f64) -> Self {
        Self {
            entity: entity.into(),
            magnitude,
            timing_days,
            observed_at: Utc::now(),
        }
    }

    pub fn with_observed_at(mut self, observed_at: DateTime<Utc>) -> Self {
        self.observed_at = observed_at;
        self
    }
}
