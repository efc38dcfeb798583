//! Shock propagation: effects, cascades, the BFS engine, and Monte Carlo
//! simulation over delay uncertainty.

mod cascade;
mod effect;
mod propagate;
mod simulate;
pub mod state;

pub use cascade::{Cascade, CascadeReport, EffectReport, OrderedMap, TimelineBucket, TriggerSummary};
pub use effect::{ChainStep, Effect};
pub use propagate::{explain_effects, propagate, propagate_with_explanation, propagate_with_rng};
pub use simulate::{simulate_cascade, simulate_cascade_with, EntityDistribution, SimulationSummary};
pub use state::{NodeState, StopReason};

use rand::Rng;

use cascade_core::config::{PropagationConfig, SimulationConfig};
use cascade_core::models::Event;

use crate::graph::CausalGraph;

/// Propagation facade holding a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct PropagationEngine {
    config: PropagationConfig,
}

impl PropagationEngine {
    pub fn new(config: PropagationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    pub fn propagate(&self, event: &Event, graph: &CausalGraph) -> Cascade {
        propagate(event, graph, &self.config)
    }

    pub fn propagate_with_rng<R: Rng + ?Sized>(
        &self,
        event: &Event,
        graph: &CausalGraph,
        rng: &mut R,
    ) -> Cascade {
        propagate_with_rng(event, graph, &self.config, rng)
    }

    pub fn propagate_with_explanation(&self, event: &Event, graph: &CausalGraph) -> Cascade {
        propagate_with_explanation(event, graph, &self.config)
    }

    /// Simulate with this engine's horizon and thresholds.
    pub fn simulate(
        &self,
        event: &Event,
        graph: &CausalGraph,
        num_simulations: usize,
        seed: Option<u64>,
    ) -> SimulationSummary {
        let config = SimulationConfig {
            num_simulations,
            horizon_days: self.config.horizon_days,
            seed,
            ..SimulationConfig::default()
        };
        simulate_cascade_with(event, graph, &config, &self.config)
    }
}
