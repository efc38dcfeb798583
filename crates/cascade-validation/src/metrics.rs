//! Accuracy metrics over prediction/actual pairs.
//!
//! Every function here is total: empty inputs or zero overlap produce
//! zero-valued results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cascade_core::config::defaults::DEFAULT_CALIBRATION_BINS;
use cascade_core::config::ValidationConfig;
use cascade_learning::same_direction;

use crate::calibration::calibration_from_pairs;
use crate::records::{match_records, ActualRecord, MatchedPair, PredictionRecord};

/// Accuracy of a set of predictions against actuals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    /// Fraction of matched pairs whose signs agree.
    pub direction_accuracy: f64,
    /// Mean absolute magnitude error.
    pub magnitude_mae: f64,
    /// Mean absolute percentage error, over pairs with a nonzero actual.
    pub magnitude_mape: f64,
    /// Mean absolute timing error in days, over pairs where both carry a day.
    pub timing_mae: f64,
    pub calibration_error: f64,
    /// Number of matched pairs.
    pub n_predictions: usize,
}

impl AccuracyMetrics {
    pub fn summary(&self) -> String {
        [
            format!("Accuracy Metrics (n={}):", self.n_predictions),
            format!("  Direction accuracy: {}", percent(self.direction_accuracy, 1)),
            format!("  Magnitude MAE: {}", percent(self.magnitude_mae, 2)),
            format!("  Magnitude MAPE: {}", percent(self.magnitude_mape, 1)),
            format!("  Timing MAE: {:.1} days", self.timing_mae),
            format!("  Calibration error: {:.3}", self.calibration_error),
        ]
        .join("\n")
    }
}

pub(crate) fn percent(fraction: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, fraction * 100.0)
}

fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub fn direction_accuracy(predictions: &[PredictionRecord], actuals: &[ActualRecord]) -> f64 {
    pairs_direction_accuracy(&match_records(predictions, actuals))
}

pub fn magnitude_mae(predictions: &[PredictionRecord], actuals: &[ActualRecord]) -> f64 {
    pairs_magnitude_mae(&match_records(predictions, actuals))
}

pub fn magnitude_mape(predictions: &[PredictionRecord], actuals: &[ActualRecord]) -> f64 {
    pairs_magnitude_mape(&match_records(predictions, actuals))
}

pub fn timing_mae(predictions: &[PredictionRecord], actuals: &[ActualRecord]) -> f64 {
    pairs_timing_mae(&match_records(predictions, actuals))
}

fn pairs_direction_accuracy(pairs: &[MatchedPair<'_>]) -> f64 {
    mean(
        pairs
            .iter()
            .map(|(p, a)| f64::from(u8::from(same_direction(p.magnitude, a.magnitude)))),
    )
}

fn pairs_magnitude_mae(pairs: &[MatchedPair<'_>]) -> f64 {
    mean(pairs.iter().map(|(p, a)| (p.magnitude - a.magnitude).abs()))
}

fn pairs_magnitude_mape(pairs: &[MatchedPair<'_>]) -> f64 {
    mean(
        pairs
            .iter()
            .filter(|(_, a)| a.magnitude != 0.0)
            .map(|(p, a)| (p.magnitude - a.magnitude).abs() / a.magnitude.abs()),
    )
}

fn pairs_timing_mae(pairs: &[MatchedPair<'_>]) -> f64 {
    mean(
        pairs
            .iter()
            .filter_map(|(p, a)| Some((p.day? - a.day?).abs())),
    )
}

/// All accuracy metrics, with calibration over the default bin count.
pub fn calculate_accuracy(
    predictions: &[PredictionRecord],
    actuals: &[ActualRecord],
) -> AccuracyMetrics {
    accuracy_from_pairs(&match_records(predictions, actuals), DEFAULT_CALIBRATION_BINS)
}

/// All accuracy metrics, with calibration over `config.calibration_bins`.
pub fn calculate_accuracy_with_config(
    predictions: &[PredictionRecord],
    actuals: &[ActualRecord],
    config: &ValidationConfig,
) -> AccuracyMetrics {
    accuracy_from_pairs(&match_records(predictions, actuals), config.calibration_bins)
}

/// All accuracy metrics over pairs that were already matched, e.g. within
/// each backtested event before pooling.
pub fn accuracy_from_pairs(pairs: &[MatchedPair<'_>], num_bins: usize) -> AccuracyMetrics {
    if pairs.is_empty() {
        return AccuracyMetrics::default();
    }
    AccuracyMetrics {
        direction_accuracy: pairs_direction_accuracy(pairs),
        magnitude_mae: pairs_magnitude_mae(pairs),
        magnitude_mape: pairs_magnitude_mape(pairs),
        timing_mae: pairs_timing_mae(pairs),
        calibration_error: calibration_from_pairs(pairs, num_bins).error,
        n_predictions: pairs.len(),
    }
}

/// Metrics for each prediction order present in `predictions`.
pub fn calculate_metrics_by_order(
    predictions: &[PredictionRecord],
    actuals: &[ActualRecord],
) -> BTreeMap<u32, AccuracyMetrics> {
    let mut by_order = metrics_by_order_from_pairs(
        &match_records(predictions, actuals),
        DEFAULT_CALIBRATION_BINS,
    );
    // Orders with no matched actual still get a (zeroed) entry.
    for pred in predictions {
        by_order.entry(pred.order).or_default();
    }
    by_order
}

/// Per-order metrics over already-matched pairs.
pub fn metrics_by_order_from_pairs(
    pairs: &[MatchedPair<'_>],
    num_bins: usize,
) -> BTreeMap<u32, AccuracyMetrics> {
    let mut grouped: BTreeMap<u32, Vec<MatchedPair<'_>>> = BTreeMap::new();
    for &pair in pairs {
        grouped.entry(pair.0.order).or_default().push(pair);
    }
    grouped
        .into_iter()
        .map(|(order, group)| (order, accuracy_from_pairs(&group, num_bins)))
        .collect()
}
