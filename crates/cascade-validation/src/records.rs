//! Prediction and actual records compared by the metrics.
//!
//! Records are deliberately looser than `Effect`/`Outcome`: predictions may
//! come from any model (an LLM baseline, a hand-written forecast) and actuals
//! may lack a timing.

use serde::{Deserialize, Serialize};

use cascade_causal::propagation::Effect;

fn default_confidence() -> f64 {
    0.5
}

fn default_order() -> u32 {
    1
}

/// A predicted move for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub entity: String,
    /// Predicted signed change (decimal).
    pub magnitude: f64,
    /// Predicted timing in days after the trigger.
    #[serde(default)]
    pub day: Option<f64>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default = "default_order")]
    pub order: u32,
}

impl PredictionRecord {
    pub fn new(entity: impl Into<String>, magnitude: f64) -> Self {
        Self {
            entity: entity.into(),
            magnitude,
            day: None,
            confidence: default_confidence(),
            order: default_order(),
        }
    }

    pub fn with_day(mut self, day: f64) -> Self {
        self.day = Some(day);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }
}

impl From<&Effect> for PredictionRecord {
    fn from(effect: &Effect) -> Self {
        Self {
            entity: effect.entity.clone(),
            magnitude: effect.magnitude,
            day: Some(effect.day),
            confidence: effect.confidence,
            order: effect.order,
        }
    }
}

/// An observed move for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualRecord {
    pub entity: String,
    /// Actual signed change (decimal).
    pub magnitude: f64,
    #[serde(default)]
    pub day: Option<f64>,
}

impl ActualRecord {
    pub fn new(entity: impl Into<String>, magnitude: f64) -> Self {
        Self {
            entity: entity.into(),
            magnitude,
            day: None,
        }
    }

    pub fn with_day(mut self, day: f64) -> Self {
        self.day = Some(day);
        self
    }
}

/// A prediction and the actual it was scored against.
pub type MatchedPair<'a> = (&'a PredictionRecord, &'a ActualRecord);

/// Pair each prediction with the first actual for the same entity.
/// Predictions without an actual are dropped.
pub fn match_records<'a>(
    predictions: &'a [PredictionRecord],
    actuals: &'a [ActualRecord],
) -> Vec<MatchedPair<'a>> {
    predictions
        .iter()
        .filter_map(|pred| {
            actuals
                .iter()
                .find(|actual| actual.entity == pred.entity)
                .map(|actual| (pred, actual))
        })
        .collect()
}
