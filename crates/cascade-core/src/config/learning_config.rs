use serde::{Deserialize, Serialize};

use super::defaults;

/// Learning-loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Rate applied when learning from a single cascade's outcomes.
    pub learning_rate: f64,
    /// Rate applied when replaying a batch of historical backtests.
    pub backtest_learning_rate: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: defaults::DEFAULT_LEARNING_RATE,
            backtest_learning_rate: defaults::DEFAULT_BACKTEST_LEARNING_RATE,
        }
    }
}
