//! Monte Carlo simulation over stochastic link delays.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use cascade_core::config::{PropagationConfig, SimulationConfig};
use cascade_core::models::Event;
use cascade_observability::events;

use crate::graph::CausalGraph;

use super::propagate::propagate_with_rng;

/// Magnitude distribution of one entity across simulation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDistribution {
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub p5: f64,
    pub p95: f64,
    /// Effects observed for this entity across all runs.
    pub occurrences: usize,
    /// Fraction of runs in which the entity appeared at least once.
    pub probability: f64,
}

/// Aggregated result of `simulate_cascade`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub trigger: String,
    pub num_simulations: usize,
    /// Seed the run seeds were derived from.
    pub seed: u64,
    pub entities: BTreeMap<String, EntityDistribution>,
    pub duration_ms: u64,
}

impl SimulationSummary {
    pub fn get(&self, entity: &str) -> Option<&EntityDistribution> {
        self.entities.get(entity)
    }
}

/// Samples gathered in a single run: every magnitude seen per entity.
type RunSamples = HashMap<String, Vec<f64>>;

/// Run `propagate` `num_simulations` times and aggregate per entity.
///
/// Run `i` uses `StdRng::seed_from_u64(seed_base + i)`, so a fixed seed
/// gives the same summary whether or not runs execute in parallel.
pub fn simulate_cascade(
    event: &Event,
    graph: &CausalGraph,
    config: &SimulationConfig,
) -> SimulationSummary {
    let propagation = PropagationConfig::with_horizon(config.horizon_days);
    simulate_cascade_with(event, graph, config, &propagation)
}

/// As [`simulate_cascade`], but every run propagates with `propagation`'s
/// thresholds. `config.horizon_days` is ignored in favour of
/// `propagation.horizon_days`.
pub fn simulate_cascade_with(
    event: &Event,
    graph: &CausalGraph,
    config: &SimulationConfig,
    propagation: &PropagationConfig,
) -> SimulationSummary {
    let start = Instant::now();
    let seed_base = config
        .seed
        .unwrap_or_else(|| rand::thread_rng().next_u64());

    let run_once = |run: usize| -> RunSamples {
        let mut rng = StdRng::seed_from_u64(seed_base.wrapping_add(run as u64));
        let cascade = propagate_with_rng(event, graph, propagation, &mut rng);
        let mut samples = RunSamples::new();
        for effect in cascade.effects {
            samples.entry(effect.entity).or_default().push(effect.magnitude);
        }
        samples
    };

    let runs: Vec<RunSamples> = if config.parallel {
        (0..config.num_simulations).into_par_iter().map(run_once).collect()
    } else {
        (0..config.num_simulations).map(run_once).collect()
    };

    let entities = aggregate(&runs, config.num_simulations);
    let duration_ms = start.elapsed().as_millis() as u64;
    events::simulation_completed(&event.entity, config.num_simulations, entities.len(), duration_ms);

    SimulationSummary {
        trigger: event.entity.clone(),
        num_simulations: config.num_simulations,
        seed: seed_base,
        entities,
        duration_ms,
    }
}

fn aggregate(runs: &[RunSamples], num_simulations: usize) -> BTreeMap<String, EntityDistribution> {
    let mut magnitudes: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    let mut runs_present: HashMap<&str, usize> = HashMap::new();
    for run in runs {
        for (entity, values) in run {
            magnitudes
                .entry(entity.as_str())
                .or_default()
                .extend(values.iter().copied());
            *runs_present.entry(entity.as_str()).or_default() += 1;
        }
    }

    magnitudes
        .into_iter()
        .map(|(entity, mut values)| {
            values.sort_by(f64::total_cmp);
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let present = runs_present.get(entity).copied().unwrap_or(0);
            let distribution = EntityDistribution {
                mean,
                std: variance.sqrt(),
                p5: percentile(&values, 5.0),
                p95: percentile(&values, 95.0),
                occurrences: values.len(),
                probability: present as f64 / num_simulations as f64,
            };
            (entity.to_string(), distribution)
        })
        .collect()
}

/// Percentile of sorted data with linear interpolation between closest
/// ranks. `sorted` must be non-empty.
pub(crate) fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates() {
        let data: Vec<f64> = (0..=10).map(f64::from).collect();
        assert!((percentile(&data, 5.0) - 0.5).abs() < 1e-12);
        assert!((percentile(&data, 95.0) - 9.5).abs() < 1e-12);
        assert_eq!(percentile(&[3.0], 95.0), 3.0);
    }

    #[test]
    fn aggregate_counts_runs_and_occurrences() {
        let mut a = RunSamples::new();
        a.insert("X".into(), vec![0.1, 0.3]);
        let mut b = RunSamples::new();
        b.insert("Y".into(), vec![0.2]);
        let summary = aggregate(&[a, b], 4);

        let x = &summary["X"];
        assert_eq!(x.occurrences, 2);
        assert!((x.probability - 0.25).abs() < 1e-12);
        assert!((x.mean - 0.2).abs() < 1e-12);
        assert!((x.std - 0.1).abs() < 1e-12);
    }
}
