//! The result of one propagation: the trigger plus every predicted effect.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use cascade_core::models::Event;

use super::effect::Effect;

/// Fixed reporting periods. Ranges are inclusive integer days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimelineBucket {
    Hours0To4,
    Day1,
    Days2To3,
    Days4To7,
    Days7To14,
    Days15To30,
}

impl TimelineBucket {
    pub const ALL: [TimelineBucket; 6] = [
        Self::Hours0To4,
        Self::Day1,
        Self::Days2To3,
        Self::Days4To7,
        Self::Days7To14,
        Self::Days15To30,
    ];

    pub fn day_range(self) -> (i64, i64) {
        match self {
            Self::Hours0To4 => (0, 0),
            Self::Day1 => (1, 1),
            Self::Days2To3 => (2, 3),
            Self::Days4To7 => (4, 7),
            Self::Days7To14 => (8, 14),
            Self::Days15To30 => (15, 30),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hours0To4 => "Hour 0-4",
            Self::Day1 => "Day 1",
            Self::Days2To3 => "Day 2-3",
            Self::Days4To7 => "Day 4-7",
            Self::Days7To14 => "Day 7-14",
            Self::Days15To30 => "Day 15-30",
        }
    }

    /// Bucket containing integer day `day`, if any.
    pub fn for_day(day: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|b| {
            let (start, end) = b.day_range();
            (start..=end).contains(&day)
        })
    }
}

impl std::fmt::Display for TimelineBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A trigger event and the effects it is predicted to cause.
///
/// Effects are sorted by `(day asc, confidence desc)`. All views are
/// computed from `effects` on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cascade {
    pub trigger: Event,
    pub effects: Vec<Effect>,
    pub horizon_days: u32,
}

impl Cascade {
    pub fn new(trigger: Event, effects: Vec<Effect>, horizon_days: u32) -> Self {
        Self {
            trigger,
            effects,
            horizon_days,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Effects whose day floors to `day`.
    pub fn effects_by_day(&self, day: i64) -> Vec<&Effect> {
        self.effects.iter().filter(|e| e.day_index() == day).collect()
    }

    pub fn effects_for_entity(&self, entity: &str) -> Vec<&Effect> {
        self.effects.iter().filter(|e| e.entity == entity).collect()
    }

    pub fn effects_by_order(&self, order: u32) -> Vec<&Effect> {
        self.effects.iter().filter(|e| e.order == order).collect()
    }

    pub fn first_order_effects(&self) -> Vec<&Effect> {
        self.effects_by_order(1)
    }

    pub fn second_order_effects(&self) -> Vec<&Effect> {
        self.effects_by_order(2)
    }

    pub fn third_order_effects(&self) -> Vec<&Effect> {
        self.effects_by_order(3)
    }

    /// Effect counts keyed by order.
    pub fn order_counts(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for effect in &self.effects {
            *counts.entry(effect.order).or_default() += 1;
        }
        counts
    }

    /// Effects grouped into the fixed reporting periods, each sorted by
    /// confidence descending. Empty periods are omitted, as are effects
    /// past day 30.
    pub fn timeline(&self) -> Vec<(TimelineBucket, Vec<&Effect>)> {
        let mut buckets: BTreeMap<TimelineBucket, Vec<&Effect>> = BTreeMap::new();
        for effect in &self.effects {
            if let Some(bucket) = TimelineBucket::for_day(effect.day_index()) {
                buckets.entry(bucket).or_default().push(effect);
            }
        }
        buckets
            .into_iter()
            .map(|(bucket, mut effects)| {
                effects.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
                (bucket, effects)
            })
            .collect()
    }

    /// Serializable report of the cascade.
    pub fn report(&self) -> CascadeReport {
        CascadeReport {
            trigger: TriggerSummary {
                entity: self.trigger.entity.clone(),
                magnitude_percent: self.trigger.magnitude_percent(),
                event_type: self.trigger.event_type.clone(),
                description: self.trigger.description.clone(),
            },
            horizon_days: self.horizon_days,
            total_effects: self.effects.len(),
            effects_by_order: OrderedMap(
                self.order_counts()
                    .into_iter()
                    .map(|(order, count)| (format!("order_{order}"), count))
                    .collect(),
            ),
            timeline: OrderedMap(
                self.timeline()
                    .into_iter()
                    .map(|(bucket, effects)| {
                        (
                            bucket.label().to_string(),
                            effects.into_iter().map(EffectReport::from).collect(),
                        )
                    })
                    .collect(),
            ),
        }
    }

    /// Text summary listing the top five effects of each period.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Cascade from {}", self.trigger),
            "=".repeat(50),
            format!("Horizon: {} days", self.horizon_days),
            format!("Total effects: {}", self.effects.len()),
            String::new(),
        ];

        for (bucket, effects) in self.timeline() {
            lines.push(format!("{bucket}:"));
            for effect in effects.iter().take(5) {
                let sign = if effect.magnitude > 0.0 { "+" } else { "" };
                lines.push(format!(
                    "  {}: {sign}{:.1}% (conf: {:.2})",
                    effect.entity,
                    effect.magnitude_percent(),
                    effect.confidence
                ));
            }
            if effects.len() > 5 {
                lines.push(format!("  ... and {} more", effects.len() - 5));
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }
}

/// Round half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Map that serializes its entries in stored order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(|(k, _)| k.as_str())
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerSummary {
    pub entity: String,
    pub magnitude_percent: f64,
    pub event_type: String,
    pub description: String,
}

/// Rounded, display-oriented form of an `Effect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectReport {
    pub entity: String,
    pub magnitude_percent: f64,
    /// `[low, high]` in percent.
    pub magnitude_range: [f64; 2],
    pub day: f64,
    pub confidence: f64,
    pub order: u32,
    pub relationship_type: String,
    pub explanation: String,
}

impl From<&Effect> for EffectReport {
    fn from(effect: &Effect) -> Self {
        let (low, high) = effect.magnitude_range();
        Self {
            entity: effect.entity.clone(),
            magnitude_percent: round_to(effect.magnitude_percent(), 2),
            magnitude_range: [round_to(low * 100.0, 2), round_to(high * 100.0, 2)],
            day: round_to(effect.day, 1),
            confidence: round_to(effect.confidence, 3),
            order: effect.order,
            relationship_type: effect.relationship_type.clone(),
            explanation: effect.explanation.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CascadeReport {
    pub trigger: TriggerSummary,
    pub horizon_days: u32,
    pub total_effects: usize,
    pub effects_by_order: OrderedMap<usize>,
    pub timeline: OrderedMap<Vec<EffectReport>>,
}
