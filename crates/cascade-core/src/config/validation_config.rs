use serde::{Deserialize, Serialize};

use super::defaults;

/// Metrics and backtest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Number of equal-width confidence bins over [0, 1].
    pub calibration_bins: usize,
    /// Number of effects explained per cascade.
    pub explain_top_n: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            calibration_bins: defaults::DEFAULT_CALIBRATION_BINS,
            explain_top_n: defaults::DEFAULT_EXPLAIN_TOP_N,
        }
    }
}
