use serde::{Deserialize, Serialize};

use super::defaults;

/// Configuration for a Monte Carlo cascade simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of independent propagation runs.
    pub num_simulations: usize,
    /// Horizon applied to every run.
    pub horizon_days: u32,
    /// Random seed (None = random).
    pub seed: Option<u64>,
    /// Fan runs out over the rayon pool.
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_simulations: defaults::DEFAULT_NUM_SIMULATIONS,
            horizon_days: defaults::DEFAULT_HORIZON_DAYS,
            seed: None,
            parallel: defaults::DEFAULT_SIMULATION_PARALLEL,
        }
    }
}
