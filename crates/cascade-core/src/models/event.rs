use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A triggering shock that starts a cascade.
///
/// `magnitude` is a signed decimal: an 8% earnings miss is `-0.08`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Entity ID where the event occurs.
    pub entity: String,
    /// Signed size of the shock (positive = beat, negative = miss).
    pub magnitude: f64,
    /// Kind of event, e.g. "earnings".
    #[serde(default = "default_event_type")]
    pub event_type: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
}

fn default_event_type() -> String {
    "earnings".to_string()
}

impl Event {
    pub fn new(entity: impl Into<String>, magnitude: f64) -> Self {
        Self {
            entity: entity.into(),
            magnitude,
            event_type: default_event_type(),
            timestamp: Utc::now(),
            description: String::new(),
        }
    }

    /// An earnings surprise expressed in percent (`-8.0` for an 8% miss).
    pub fn earnings(ticker: &str, surprise_percent: f64, description: &str) -> Self {
        let description = if description.is_empty() {
            let verb = if surprise_percent > 0.0 { "beat" } else { "miss" };
            format!("{ticker} earnings {verb} of {:.1}%", surprise_percent.abs())
        } else {
            description.to_string()
        };
        Self {
            entity: ticker.to_string(),
            magnitude: surprise_percent / 100.0,
            event_type: "earnings".to_string(),
            timestamp: Utc::now(),
            description,
        }
    }

    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Magnitude as a percentage.
    pub fn magnitude_percent(&self) -> f64 {
        self.magnitude * 100.0
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.magnitude > 0.0 { "+" } else { "" };
        write!(f, "Event({}: {sign}{:.1}%)", self.entity, self.magnitude_percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earnings_converts_percent_to_decimal() {
        let event = Event::earnings("AAPL", -8.0, "");
        assert!((event.magnitude + 0.08).abs() < 1e-12);
        assert_eq!(event.event_type, "earnings");
        assert_eq!(event.description, "AAPL earnings miss of 8.0%");
    }

    #[test]
    fn earnings_keeps_explicit_description() {
        let event = Event::earnings("NVDA", 25.0, "AI beat");
        assert_eq!(event.description, "AI beat");
        assert_eq!(event.to_string(), "Event(NVDA: +25.0%)");
    }
}
