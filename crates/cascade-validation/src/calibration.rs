//! Confidence calibration: do 80%-confidence predictions come true 80% of
//! the time?

use serde::{Deserialize, Serialize};

use cascade_learning::same_direction;

use crate::metrics::percent;
use crate::records::{match_records, ActualRecord, MatchedPair, PredictionRecord};

/// One equal-width confidence bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBin {
    pub low: f64,
    pub high: f64,
    /// Bin midpoint.
    pub expected: f64,
    /// Fraction of direction-correct predictions in the bin.
    pub actual: f64,
    pub count: usize,
    pub error: f64,
}

impl CalibrationBin {
    pub fn label(&self) -> String {
        format!("{:.1}-{:.1}", self.low, self.high)
    }
}

/// Calibration error plus the non-empty bins it was computed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    /// Mean `|expected - actual|` over non-empty bins.
    pub error: f64,
    pub bins: Vec<CalibrationBin>,
}

impl CalibrationReport {
    pub fn bin_containing(&self, confidence: f64) -> Option<&CalibrationBin> {
        self.bins
            .iter()
            .find(|b| b.low <= confidence && confidence <= b.high)
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Calibration Error: {:.3}", self.error),
            "Calibration by Confidence Bin:".to_string(),
        ];
        for bin in &self.bins {
            lines.push(format!(
                "  {}: expected {}, actual {} (n={})",
                bin.label(),
                percent(bin.expected, 1),
                percent(bin.actual, 1),
                bin.count
            ));
        }
        lines.join("\n")
    }
}

/// Bin for `confidence` among `num_bins` bins `[i/n, (i+1)/n)`; the last bin
/// also takes 1.0. Confidences outside `[0, 1]` fall in no bin.
fn bin_index(confidence: f64, num_bins: usize) -> Option<usize> {
    if !(0.0..=1.0).contains(&confidence) {
        return None;
    }
    let n = num_bins as f64;
    (0..num_bins).find(|&i| {
        let low = i as f64 / n;
        let high = (i + 1) as f64 / n;
        low <= confidence && (confidence < high || i + 1 == num_bins)
    })
}

/// Bucket matched predictions by confidence and compare each bin's midpoint
/// with its observed direction accuracy.
pub fn calculate_calibration(
    predictions: &[PredictionRecord],
    actuals: &[ActualRecord],
    num_bins: usize,
) -> CalibrationReport {
    calibration_from_pairs(&match_records(predictions, actuals), num_bins)
}

/// Calibration over pairs that were already matched.
pub fn calibration_from_pairs(pairs: &[MatchedPair<'_>], num_bins: usize) -> CalibrationReport {
    if num_bins == 0 {
        return CalibrationReport::default();
    }

    // (correct, total) per bin
    let mut tallies = vec![(0usize, 0usize); num_bins];
    for (pred, actual) in pairs {
        if let Some(i) = bin_index(pred.confidence, num_bins) {
            tallies[i].1 += 1;
            if same_direction(pred.magnitude, actual.magnitude) {
                tallies[i].0 += 1;
            }
        }
    }

    let n = num_bins as f64;
    let bins: Vec<CalibrationBin> = tallies
        .into_iter()
        .enumerate()
        .filter(|(_, (_, total))| *total > 0)
        .map(|(i, (correct, total))| {
            let low = i as f64 / n;
            let high = (i + 1) as f64 / n;
            let expected = (low + high) / 2.0;
            let actual = correct as f64 / total as f64;
            CalibrationBin {
                low,
                high,
                expected,
                actual,
                count: total,
                error: (expected - actual).abs(),
            }
        })
        .collect();

    let error = if bins.is_empty() {
        0.0
    } else {
        bins.iter().map(|b| b.error).sum::<f64>() / bins.len() as f64
    };
    CalibrationReport { error, bins }
}
