//! Directed, weighted, time-delayed causal edges.

use chrono::{DateTime, NaiveDateTime, Utc};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Deserializer, Serialize};

use cascade_core::constants::INITIAL_HISTORICAL_ACCURACY;

/// Uniqueness key of a link inside a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey {
    pub source: String,
    pub target: String,
    pub relationship_type: String,
}

/// A causal link `source → target`.
///
/// Encodes how much of a move carries over (`strength`, `direction`), when it
/// lands (`delay_mean`, `delay_std`, in days), how much we trust it
/// (`confidence`), why it exists (`evidence`), and what the learning loop
/// has observed so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalLink {
    pub source: String,
    pub target: String,
    /// Domain relationship, e.g. "supplier_to", "sector_member".
    pub relationship_type: String,
    /// Fraction of the source move that propagates, 0.0 to 1.0.
    pub strength: f64,
    pub delay_mean: f64,
    pub delay_std: f64,
    /// Confidence in the link's existence and parameters, 0.0 to 1.0.
    pub confidence: f64,
    /// 1.0 = same direction, -1.0 = opposite direction.
    #[serde(default = "default_direction")]
    pub direction: f64,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default = "default_historical_accuracy")]
    pub historical_accuracy: f64,
    #[serde(default)]
    pub observation_count: u64,
    /// Where the link came from: "manual", "sec_filing", "correlation", ...
    #[serde(default = "default_source_type")]
    pub source_type: String,
    /// RFC 3339, or a naive ISO-8601 timestamp read as UTC.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Parse an RFC 3339 timestamp, falling back to a zone-less ISO-8601
/// timestamp interpreted as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc()))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| {
        parse_timestamp(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{s}'")))
    })
    .transpose()
}

fn clamp_or(value: f64, low: f64, high: f64) -> f64 {
    if value.is_nan() {
        low
    } else {
        value.clamp(low, high)
    }
}

fn default_direction() -> f64 {
    1.0
}

fn default_historical_accuracy() -> f64 {
    INITIAL_HISTORICAL_ACCURACY
}

fn default_source_type() -> String {
    "manual".to_string()
}

impl CausalLink {
    /// Create a link with clamped parameters and default learning state.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relationship_type: impl Into<String>,
        strength: f64,
        delay_mean: f64,
        delay_std: f64,
        confidence: f64,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relationship_type: relationship_type.into(),
            strength: strength.clamp(0.0, 1.0),
            delay_mean: delay_mean.max(0.0),
            delay_std: delay_std.max(0.0),
            confidence: confidence.clamp(0.0, 1.0),
            direction: default_direction(),
            evidence: Vec::new(),
            historical_accuracy: default_historical_accuracy(),
            observation_count: 0,
            source_type: default_source_type(),
            last_updated: None,
        }
    }

    /// Clamp strength and confidence to `[0, 1]`, direction to `[-1, 1]`,
    /// and delays to `>= 0`. NaN parameters become the lower bound.
    pub fn clamped(mut self) -> Self {
        self.strength = clamp_or(self.strength, 0.0, 1.0);
        self.confidence = clamp_or(self.confidence, 0.0, 1.0);
        self.direction = clamp_or(self.direction, -1.0, 1.0);
        self.delay_mean = clamp_or(self.delay_mean, 0.0, f64::INFINITY);
        self.delay_std = clamp_or(self.delay_std, 0.0, f64::INFINITY);
        self
    }

    pub fn with_direction(mut self, direction: f64) -> Self {
        self.direction = direction.clamp(-1.0, 1.0);
        self
    }

    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_source_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = source_type.into();
        self
    }

    pub fn key(&self) -> LinkKey {
        LinkKey {
            source: self.source.clone(),
            target: self.target.clone(),
            relationship_type: self.relationship_type.clone(),
        }
    }

    /// Magnitude arriving at the target for a source move of `input`.
    pub fn propagate_magnitude(&self, input: f64) -> f64 {
        input * self.strength * self.direction
    }

    /// Confidence of the target effect given the source confidence.
    pub fn propagate_confidence(&self, input: f64) -> f64 {
        input * self.confidence
    }

    /// Draw a delay from Normal(delay_mean, delay_std), clamped to >= 0.
    /// Returns `delay_mean` exactly when `delay_std` is zero.
    pub fn sample_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.delay_std == 0.0 {
            return self.delay_mean;
        }
        match Normal::new(self.delay_mean, self.delay_std) {
            Ok(normal) => normal.sample(rng).max(0.0),
            Err(_) => self.delay_mean.max(0.0),
        }
    }
}

impl std::fmt::Display for CausalLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CausalLink({} --[{}]--> {}, strength={:.2}, delay={:.1}, conf={:.2})",
            self.source,
            self.relationship_type,
            self.target,
            self.strength,
            self.delay_mean,
            self.confidence
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn new_clamps_parameters() {
        let link = CausalLink::new("A", "B", "supplier_to", 1.7, -2.0, -1.0, -0.3)
            .with_direction(-4.0);
        assert_eq!(link.strength, 1.0);
        assert_eq!(link.delay_mean, 0.0);
        assert_eq!(link.delay_std, 0.0);
        assert_eq!(link.confidence, 0.0);
        assert_eq!(link.direction, -1.0);
    }

    #[test]
    fn zero_std_delay_is_exact() {
        let link = CausalLink::new("A", "B", "x", 0.5, 2.5, 0.0, 0.8);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            assert_eq!(link.sample_delay(&mut rng), 2.5);
        }
    }

    #[test]
    fn sampled_delay_is_never_negative() {
        let link = CausalLink::new("A", "B", "x", 0.5, 0.1, 5.0, 0.8);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1_000 {
            assert!(link.sample_delay(&mut rng) >= 0.0);
        }
    }

    #[test]
    fn optional_fields_default_on_deserialize() {
        let link: CausalLink = serde_json::from_str(
            r#"{"source":"A","target":"B","relationship_type":"x",
                "strength":0.4,"delay_mean":1.0,"delay_std":0.5,"confidence":0.7}"#,
        )
        .unwrap();
        assert_eq!(link.direction, 1.0);
        assert_eq!(link.historical_accuracy, 0.5);
        assert_eq!(link.observation_count, 0);
        assert_eq!(link.source_type, "manual");
        assert!(link.last_updated.is_none());
    }

    #[test]
    fn clamped_pulls_parameters_into_range() {
        let mut link = CausalLink::new("A", "B", "x", 0.5, 1.0, 0.5, 0.5);
        link.strength = 3.0;
        link.confidence = 1.7;
        link.direction = -4.0;
        link.delay_std = f64::NAN;
        let link = link.clamped();
        assert_eq!(link.strength, 1.0);
        assert_eq!(link.confidence, 1.0);
        assert_eq!(link.direction, -1.0);
        assert_eq!(link.delay_std, 0.0);
    }

    #[test]
    fn naive_timestamps_read_as_utc() {
        let link: CausalLink = serde_json::from_str(
            r#"{"source":"A","target":"B","relationship_type":"x","strength":0.4,
                "delay_mean":1.0,"delay_std":0.5,"confidence":0.7,
                "last_updated":"2024-01-05T10:11:12.123456"}"#,
        )
        .unwrap();
        let ts = link.last_updated.unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-05T10:11:12.123456+00:00");

        assert_eq!(
            parse_timestamp("2024-01-05T10:11:12+02:00").unwrap().to_rfc3339(),
            "2024-01-05T08:11:12+00:00"
        );
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn required_fields_are_enforced() {
        let result = serde_json::from_str::<CausalLink>(
            r#"{"source":"A","target":"B","relationship_type":"x","strength":0.4}"#,
        );
        assert!(result.is_err());
    }
}
