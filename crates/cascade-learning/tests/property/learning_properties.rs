//! Property tests for cascade-learning: learned parameters stay in range.

use proptest::prelude::*;

use cascade_causal::graph::{CausalGraph, CausalLink, Entity};
use cascade_causal::propagation::propagate_with_rng;
use cascade_core::config::PropagationConfig;
use cascade_core::models::{Event, Outcome};
use cascade_learning::learn_from_outcomes;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn build_graph(n: usize, edges: &[(usize, usize, f64, f64, f64)]) -> CausalGraph {
    let mut graph = CausalGraph::new();
    for i in 0..n {
        graph.add_entity(Entity::new(format!("n{i}"), "company", format!("Node {i}")));
    }
    for &(src, tgt, strength, confidence, delay) in edges {
        if src < n && tgt < n && src != tgt {
            let link = CausalLink::new(
                format!("n{src}"),
                format!("n{tgt}"),
                "supplier_to",
                strength,
                delay,
                delay / 3.0,
                confidence,
            );
            graph.add_link(link).unwrap();
        }
    }
    graph
}

proptest! {
    #[test]
    fn learned_links_stay_in_range(
        edges in prop::collection::vec((0_usize..8, 0_usize..8, 0.0_f64..1.0, 0.2_f64..1.0, 0.0_f64..5.0), 1..24),
        rounds in prop::collection::vec(
            prop::collection::vec((0_usize..8, -0.3_f64..0.3, 0.0_f64..20.0), 0..8),
            1..6,
        ),
        learning_rate in 0.01_f64..1.0,
        trigger in -0.3_f64..0.3,
    ) {
        let mut graph = build_graph(8, &edges);
        let config = PropagationConfig { min_confidence: 0.01, ..PropagationConfig::default() };
        let mut rng = StdRng::seed_from_u64(17);

        for round in &rounds {
            let cascade = propagate_with_rng(&Event::new("n0", trigger), &graph, &config, &mut rng);
            let outcomes: Vec<Outcome> = round
                .iter()
                .map(|&(i, magnitude, timing)| Outcome::new(format!("n{i}"), magnitude, timing))
                .collect();
            learn_from_outcomes(&cascade, &outcomes, &mut graph, learning_rate);
        }

        for link in graph.iter_links().filter(|l| l.observation_count > 0) {
            prop_assert!((0.01..=0.99).contains(&link.strength), "strength {}", link.strength);
            prop_assert!((0.1..=0.99).contains(&link.confidence), "confidence {}", link.confidence);
            prop_assert!(link.delay_mean >= 0.1, "delay_mean {}", link.delay_mean);
            prop_assert!((0.0..=1.0).contains(&link.historical_accuracy));
        }
    }
}
