//! Predicted effects and the cause chain that produced them.

use serde::{Deserialize, Serialize};

use cascade_core::models::Event;

use crate::graph::CausalLink;

/// One step of a cause chain: the triggering event, then each link walked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainStep {
    Trigger(Event),
    Link(CausalLink),
}

impl ChainStep {
    pub fn as_link(&self) -> Option<&CausalLink> {
        match self {
            Self::Link(link) => Some(link),
            Self::Trigger(_) => None,
        }
    }

    pub fn as_trigger(&self) -> Option<&Event> {
        match self {
            Self::Trigger(event) => Some(event),
            Self::Link(_) => None,
        }
    }
}

/// A predicted impact on one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub entity: String,
    /// Predicted signed change (decimal).
    pub magnitude: f64,
    /// Days after the trigger.
    pub day: f64,
    pub confidence: f64,
    /// The trigger followed by each link traversed, in order.
    pub cause_chain: Vec<ChainStep>,
    /// 1 = direct, 2 = second-order, ...
    pub order: u32,
    /// Relationship of the final link in the chain.
    #[serde(default)]
    pub relationship_type: String,
    #[serde(default)]
    pub explanation: String,
}

impl Effect {
    /// Uncertainty band around the magnitude. The half-width shrinks as
    /// confidence rises: `|m| * (1 - c) * 0.5`.
    pub fn magnitude_range(&self) -> (f64, f64) {
        let width = self.magnitude.abs() * (1.0 - self.confidence) * 0.5;
        (self.magnitude - width, self.magnitude + width)
    }

    pub fn magnitude_percent(&self) -> f64 {
        self.magnitude * 100.0
    }

    /// Links in the chain, skipping the trigger.
    pub fn links(&self) -> impl Iterator<Item = &CausalLink> + '_ {
        self.cause_chain.iter().filter_map(ChainStep::as_link)
    }

    pub fn trigger(&self) -> Option<&Event> {
        self.cause_chain.first().and_then(ChainStep::as_trigger)
    }

    /// Integer day bucket.
    pub fn day_index(&self) -> i64 {
        self.day.floor() as i64
    }
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.magnitude > 0.0 { "+" } else { "" };
        write!(
            f,
            "Effect({}: {sign}{:.1}%, day={:.1}, conf={:.2})",
            self.entity,
            self.magnitude_percent(),
            self.day,
            self.confidence
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(magnitude: f64, confidence: f64) -> Effect {
        Effect {
            entity: "B".into(),
            magnitude,
            day: 2.7,
            confidence,
            cause_chain: vec![
                ChainStep::Trigger(Event::new("A", -0.1)),
                ChainStep::Link(CausalLink::new("A", "B", "supplier_to", 0.5, 1.0, 0.0, 0.8)),
            ],
            order: 1,
            relationship_type: "supplier_to".into(),
            explanation: String::new(),
        }
    }

    #[test]
    fn range_widens_with_lower_confidence() {
        let (lo, hi) = effect(-0.04, 0.5).magnitude_range();
        assert!((lo + 0.05).abs() < 1e-12);
        assert!((hi + 0.03).abs() < 1e-12);

        let (lo, hi) = effect(-0.04, 1.0).magnitude_range();
        assert_eq!(lo, -0.04);
        assert_eq!(hi, -0.04);
    }

    #[test]
    fn links_skip_trigger() {
        let e = effect(0.01, 0.9);
        assert_eq!(e.links().count(), 1);
        assert_eq!(e.trigger().map(|t| t.entity.as_str()), Some("A"));
        assert_eq!(e.day_index(), 2);
    }

    #[test]
    fn chain_serializes_as_tagged_union() {
        let json = serde_json::to_value(&effect(0.01, 0.9)).unwrap();
        assert_eq!(json["cause_chain"][0]["kind"], "trigger");
        assert_eq!(json["cause_chain"][1]["kind"], "link");
    }
}
