//! Property tests for cascade-causal: decay, termination, subgraph idempotence.

use proptest::prelude::*;

use cascade_causal::graph::{CausalGraph, CausalLink, Entity};
use cascade_causal::propagation::propagate_with_rng;
use cascade_core::config::PropagationConfig;
use cascade_core::models::Event;
use rand::rngs::StdRng;
use rand::SeedableRng;

type EdgeSpec = (usize, usize, f64, f64, f64, bool);

/// Build a random graph (cycles allowed) with `n` nodes.
fn build_random_graph(n: usize, edges: &[EdgeSpec]) -> CausalGraph {
    let mut graph = CausalGraph::new();
    for i in 0..n {
        graph.add_entity(Entity::new(format!("n{i}"), "company", format!("Node {i}")));
    }
    for &(src, tgt, strength, confidence, delay, inverse) in edges {
        if src < n && tgt < n && src != tgt {
            let link = CausalLink::new(
                format!("n{src}"),
                format!("n{tgt}"),
                "supplier_to",
                strength,
                delay,
                delay / 2.0,
                confidence,
            )
            .with_direction(if inverse { -1.0 } else { 1.0 });
            graph.add_link(link).unwrap();
        }
    }
    graph
}

fn edge_strategy(n: usize) -> impl Strategy<Value = Vec<EdgeSpec>> {
    prop::collection::vec(
        (0..n, 0..n, 0.0_f64..1.0, 0.0_f64..1.0, 0.0_f64..4.0, any::<bool>()),
        0..n * 3,
    )
}

proptest! {
    #[test]
    fn effects_decay_monotonically(
        edges in edge_strategy(12),
        magnitude in -0.5_f64..0.5,
        seed in any::<u64>(),
    ) {
        let graph = build_random_graph(12, &edges);
        let event = Event::new("n0", magnitude);
        let mut rng = StdRng::seed_from_u64(seed);
        let cascade = propagate_with_rng(&event, &graph, &PropagationConfig::default(), &mut rng);

        for effect in &cascade.effects {
            prop_assert!(effect.magnitude.abs() <= magnitude.abs() + 1e-12);
            prop_assert!(effect.confidence <= 1.0);
            prop_assert_eq!(effect.links().count() as u32, effect.order);

            // Walk the chain: each hop shrinks magnitude and confidence.
            let mut m = magnitude.abs();
            let mut c = 1.0_f64;
            for link in effect.links() {
                let next_m = m * link.strength;
                let next_c = c * link.confidence;
                prop_assert!(next_m <= m + 1e-12);
                prop_assert!(next_c <= c + 1e-12);
                m = next_m;
                c = next_c;
            }
            prop_assert!((m - effect.magnitude.abs()).abs() < 1e-9);
            prop_assert!((c - effect.confidence).abs() < 1e-9);
        }
    }
}

proptest! {
    #[test]
    fn propagation_terminates_on_cyclic_graphs(
        edges in edge_strategy(8),
        max_order in 1_u32..12,
    ) {
        let graph = build_random_graph(8, &edges);
        let config = PropagationConfig { max_order, ..PropagationConfig::default() };
        let mut rng = StdRng::seed_from_u64(1);
        let cascade = propagate_with_rng(&Event::new("n0", 0.3), &graph, &config, &mut rng);

        for effect in &cascade.effects {
            prop_assert!(effect.order >= 1 && effect.order <= max_order);
            prop_assert!(effect.day <= f64::from(config.horizon_days));
        }
    }
}

proptest! {
    #[test]
    fn subgraph_is_idempotent(
        edges in edge_strategy(10),
        picks in prop::collection::vec(0_usize..14, 0..10),
    ) {
        let graph = build_random_graph(10, &edges);
        let ids: Vec<String> = picks.iter().map(|i| format!("n{i}")).collect();

        let once = graph.subgraph(&ids);
        let kept: Vec<String> = once.entity_ids().map(str::to_string).collect();
        let twice = graph.subgraph(&kept);

        prop_assert_eq!(&twice, &once);
        prop_assert_eq!(once.subgraph(&kept), once);
    }
}

proptest! {
    #[test]
    fn outgoing_and_incoming_agree(edges in edge_strategy(10)) {
        let graph = build_random_graph(10, &edges);
        let out_total: usize = graph.entity_ids().map(|id| graph.get_outgoing(id).len()).sum();
        let in_total: usize = graph.entity_ids().map(|id| graph.get_incoming(id).len()).sum();
        prop_assert_eq!(out_total, graph.num_links());
        prop_assert_eq!(in_total, graph.num_links());
    }
}
