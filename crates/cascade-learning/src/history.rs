//! Learning state inspection and reset for individual links.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cascade_causal::graph::CausalLink;
use cascade_core::constants::INITIAL_HISTORICAL_ACCURACY;

/// Snapshot of what the learning loop has done to a link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkHistory {
    pub source: String,
    pub target: String,
    pub current_strength: f64,
    pub current_confidence: f64,
    pub current_delay: f64,
    pub observation_count: u64,
    pub historical_accuracy: f64,
    pub last_updated: Option<DateTime<Utc>>,
}

pub fn link_history(link: &CausalLink) -> LinkHistory {
    LinkHistory {
        source: link.source.clone(),
        target: link.target.clone(),
        current_strength: link.strength,
        current_confidence: link.confidence,
        current_delay: link.delay_mean,
        observation_count: link.observation_count,
        historical_accuracy: link.historical_accuracy,
        last_updated: link.last_updated,
    }
}

/// Forget the learning bookkeeping of a link. Strength, delay and
/// confidence keep their current values.
pub fn reset_link_learning(link: &mut CausalLink) {
    link.observation_count = 0;
    link.historical_accuracy = INITIAL_HISTORICAL_ACCURACY;
    link.last_updated = None;
}
