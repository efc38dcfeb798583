use std::collections::BTreeMap;

use crate::calibration::CalibrationReport;
use crate::metrics::{percent, AccuracyMetrics};

fn ordinal_suffix(order: u32) -> &'static str {
    match order {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Plain-text accuracy report with optional per-order and calibration
/// sections.
pub fn format_metrics_report(
    metrics: &AccuracyMetrics,
    by_order: Option<&BTreeMap<u32, AccuracyMetrics>>,
    calibration: Option<&CalibrationReport>,
) -> String {
    let rule = "=".repeat(60);
    let mut lines = vec![
        rule.clone(),
        "PREDICTION ACCURACY REPORT".to_string(),
        rule,
        String::new(),
        metrics.summary(),
    ];

    if let Some(by_order) = by_order.filter(|m| !m.is_empty()) {
        lines.push(String::new());
        lines.push("Accuracy by Order:".to_string());
        lines.push("-".repeat(40));
        for (order, m) in by_order {
            lines.push(format!(
                "  {order}{} order: Direction {}, Magnitude MAE {}, n={}",
                ordinal_suffix(*order),
                percent(m.direction_accuracy, 1),
                percent(m.magnitude_mae, 2),
                m.n_predictions
            ));
        }
    }

    if let Some(calibration) = calibration {
        lines.push(String::new());
        lines.push(calibration.summary());
    }

    lines.join("\n")
}
