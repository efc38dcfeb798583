//! Tests for cascade propagation, cascade views, and reports.

use cascade_causal::graph::{CausalGraph, CausalLink, Entity, GraphDocument};
use cascade_causal::propagation::{
    propagate, propagate_with_explanation, propagate_with_rng, Cascade, ChainStep, Effect,
    PropagationEngine, TimelineBucket,
};
use cascade_core::config::PropagationConfig;
use cascade_core::models::Event;
use rand::rngs::StdRng;
use rand::SeedableRng;
use test_fixtures::{load_fixture, ABC_CHAIN, SEMICONDUCTOR};

fn fixture_graph(path: &str) -> CausalGraph {
    CausalGraph::from_document(load_fixture::<GraphDocument>(path))
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn abc_chain_scenario() {
    let graph = fixture_graph(ABC_CHAIN);
    let event = Event::new("A", -0.08);
    let cascade = propagate(&event, &graph, &PropagationConfig::default());

    assert_eq!(cascade.effects.len(), 2);

    let b = &cascade.effects[0];
    assert_eq!(b.entity, "B");
    assert_eq!(b.order, 1);
    assert!(approx(b.magnitude, -0.04));
    assert!(approx(b.confidence, 0.8));
    assert!(approx(b.day, 1.0));
    assert_eq!(b.relationship_type, "supplier_to");

    let c = &cascade.effects[1];
    assert_eq!(c.entity, "C");
    assert_eq!(c.order, 2);
    assert!(approx(c.magnitude, 0.016));
    assert!(approx(c.confidence, 0.6));
    assert!(approx(c.day, 2.0));
    assert_eq!(c.relationship_type, "competes_with");

    // Each hop multiplies confidence by the link confidence.
    assert!(approx(c.confidence / b.confidence, 0.75));
}

#[test]
fn cause_chain_starts_with_trigger() {
    let graph = fixture_graph(ABC_CHAIN);
    let cascade = propagate(&Event::new("A", -0.08), &graph, &PropagationConfig::default());
    let c = &cascade.effects_for_entity("C")[0];

    assert_eq!(c.cause_chain.len(), 3);
    assert!(matches!(&c.cause_chain[0], ChainStep::Trigger(e) if e.entity == "A"));
    let hops: Vec<(&str, &str)> = c
        .links()
        .map(|l| (l.source.as_str(), l.target.as_str()))
        .collect();
    assert_eq!(hops, vec![("A", "B"), ("B", "C")]);
}

#[test]
fn zero_std_propagation_is_deterministic() {
    let graph = fixture_graph(ABC_CHAIN);
    let event = Event::new("A", 0.12);
    let config = PropagationConfig::default();
    let first = propagate(&event, &graph, &config);
    let second = propagate(&event, &graph, &config);
    assert_eq!(first.effects, second.effects);
}

#[test]
fn seeded_rng_reproduces_stochastic_cascade() {
    let graph = fixture_graph(SEMICONDUCTOR);
    let event = Event::new("NVDA", -0.1);
    let config = PropagationConfig::default();

    let a = propagate_with_rng(&event, &graph, &config, &mut StdRng::seed_from_u64(42));
    let b = propagate_with_rng(&event, &graph, &config, &mut StdRng::seed_from_u64(42));
    assert!(!a.is_empty());
    assert_eq!(a.effects, b.effects);
}

#[test]
fn effects_are_sorted_by_day_then_confidence() {
    let graph = fixture_graph(SEMICONDUCTOR);
    let cascade = propagate_with_rng(
        &Event::new("NVDA", -0.1),
        &graph,
        &PropagationConfig::default(),
        &mut StdRng::seed_from_u64(7),
    );
    for pair in cascade.effects.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.day < b.day || (a.day == b.day && a.confidence >= b.confidence));
    }
}

#[test]
fn trigger_is_never_an_effect_at_its_own_magnitude() {
    let mut graph = CausalGraph::new();
    graph.add_entity(Entity::new("A", "company", "A"));
    graph.add_entity(Entity::new("B", "company", "B"));
    graph
        .add_link(CausalLink::new("A", "B", "x", 1.0, 0.0, 0.0, 1.0))
        .unwrap();
    graph
        .add_link(CausalLink::new("B", "A", "x", 1.0, 0.0, 0.0, 1.0))
        .unwrap();

    let cascade = propagate(&Event::new("A", 0.1), &graph, &PropagationConfig::default());
    // A is revisited at the same rounded magnitude as the seed, so it is deduplicated.
    assert_eq!(cascade.effects.len(), 1);
    assert_eq!(cascade.effects[0].entity, "B");
}

fn diamond(a_to_c: f64, c_to_d: f64) -> CausalGraph {
    let mut graph = CausalGraph::new();
    for id in ["A", "B", "C", "D"] {
        graph.add_entity(Entity::new(id, "company", id));
    }
    let links = [
        ("A", "B", 0.5),
        ("A", "C", a_to_c),
        ("B", "D", 0.5),
        ("C", "D", c_to_d),
    ];
    for (s, t, strength) in links {
        graph
            .add_link(CausalLink::new(s, t, "supplier_to", strength, 0.0, 0.0, 1.0))
            .unwrap();
    }
    graph
}

#[test]
fn entity_reached_at_different_magnitudes_is_emitted_per_path() {
    let graph = diamond(0.8, 0.5);
    let cascade = propagate(&Event::new("A", -0.1), &graph, &PropagationConfig::default());

    let d: Vec<f64> = cascade
        .effects_for_entity("D")
        .iter()
        .map(|e| e.magnitude)
        .collect();
    assert_eq!(d.len(), 2);
    assert!(approx(d[0], -0.025));
    assert!(approx(d[1], -0.04));
    assert!(cascade.effects_for_entity("D").iter().all(|e| e.order == 2));
}

#[test]
fn paths_landing_on_the_same_rounded_magnitude_merge() {
    let graph = diamond(0.5, 0.5);
    let cascade = propagate(&Event::new("A", -0.1), &graph, &PropagationConfig::default());

    let d = cascade.effects_for_entity("D");
    assert_eq!(d.len(), 1);
    assert!(approx(d[0].magnitude, -0.025));
    // The first path in target order wins: A -> B -> D.
    let via: Vec<&str> = d[0].links().map(|l| l.source.as_str()).collect();
    assert_eq!(via, vec!["A", "B"]);
}

#[test]
fn out_of_range_links_from_json_still_decay() {
    let json = r#"{
        "entities": [
            {"id": "A", "entity_type": "company", "name": "A"},
            {"id": "B", "entity_type": "company", "name": "B"}
        ],
        "links": [
            {"source": "A", "target": "B", "relationship_type": "x", "strength": 3.0,
             "delay_mean": 0.0, "delay_std": 0.0, "confidence": 1.7, "direction": -4.0}
        ]
    }"#;
    let graph = CausalGraph::from_json(json).unwrap();
    let cascade = propagate(&Event::new("A", 0.1), &graph, &PropagationConfig::default());

    assert_eq!(cascade.effects.len(), 1);
    let b = &cascade.effects[0];
    assert!(approx(b.magnitude, -0.1));
    assert!(b.magnitude.abs() <= 0.1);
    assert!(b.confidence <= 1.0);
}

#[test]
fn cyclic_graph_terminates_with_loose_thresholds() {
    let mut graph = CausalGraph::new();
    for id in ["A", "B", "C"] {
        graph.add_entity(Entity::new(id, "company", id));
    }
    for (s, t) in [("A", "B"), ("B", "C"), ("C", "A"), ("B", "A")] {
        graph
            .add_link(CausalLink::new(s, t, "x", 0.9, 0.0, 0.0, 0.99))
            .unwrap();
    }
    let config = PropagationConfig {
        horizon_days: 30,
        min_confidence: 0.0,
        min_magnitude: 0.0,
        max_order: 10_000,
    };
    let cascade = propagate(&Event::new("A", 0.1), &graph, &config);
    assert!(!cascade.is_empty());
    assert!(cascade.effects.iter().all(|e| e.magnitude.abs() <= 0.1));
}

#[test]
fn thresholds_bound_the_cascade() {
    let graph = fixture_graph(ABC_CHAIN);
    let event = Event::new("A", -0.08);

    let one_hop = PropagationConfig {
        max_order: 1,
        ..PropagationConfig::default()
    };
    let cascade = propagate(&event, &graph, &one_hop);
    assert_eq!(cascade.effects.len(), 1);
    assert_eq!(cascade.effects[0].entity, "B");

    let strict_confidence = PropagationConfig {
        min_confidence: 0.7,
        ..PropagationConfig::default()
    };
    assert_eq!(propagate(&event, &graph, &strict_confidence).effects.len(), 1);

    let strict_magnitude = PropagationConfig {
        min_magnitude: 0.02,
        ..PropagationConfig::default()
    };
    assert_eq!(propagate(&event, &graph, &strict_magnitude).effects.len(), 1);

    let short_horizon = PropagationConfig::with_horizon(1);
    let cascade = propagate(&event, &graph, &short_horizon);
    assert_eq!(cascade.effects.len(), 1);
    assert_eq!(cascade.horizon_days, 1);
}

#[test]
fn unknown_trigger_entity_yields_empty_cascade() {
    let graph = fixture_graph(ABC_CHAIN);
    let cascade = propagate(&Event::new("ZZZ", 0.5), &graph, &PropagationConfig::default());
    assert!(cascade.is_empty());
    assert_eq!(cascade.trigger.entity, "ZZZ");
}

#[test]
fn explanations_render_chain() {
    let graph = fixture_graph(ABC_CHAIN);
    let cascade =
        propagate_with_explanation(&Event::new("A", -0.08), &graph, &PropagationConfig::default());

    assert_eq!(
        cascade.effects[0].explanation,
        "A earnings miss of 8.0% → Alpha Corp → Beta Inc (supplier to)"
    );
    assert_eq!(
        cascade.effects[1].explanation,
        "A earnings miss of 8.0% → Alpha Corp → Beta Inc (supplier to) → \
         Beta Inc → Gamma Ltd (competes with)"
    );

    let engine = PropagationEngine::new(PropagationConfig {
        min_confidence: 0.05,
        ..PropagationConfig::default()
    });
    let mut low = graph.clone();
    low.get_link_mut("A", "B").unwrap().confidence = 0.4;
    let cascade = engine.propagate_with_explanation(&Event::new("A", 0.08), &low);
    assert!(cascade.effects[0]
        .explanation
        .ends_with(" [lower confidence due to indirect relationship]"));
    assert!(cascade.effects[0].explanation.starts_with("A earnings beat of 8.0%"));
}

fn effect_at(entity: &str, day: f64, confidence: f64, order: u32) -> Effect {
    Effect {
        entity: entity.to_string(),
        magnitude: -0.02,
        day,
        confidence,
        cause_chain: Vec::new(),
        order,
        relationship_type: String::new(),
        explanation: String::new(),
    }
}

fn sample_cascade() -> Cascade {
    Cascade::new(
        Event::new("T", -0.1),
        vec![
            effect_at("a", 0.2, 0.9, 1),
            effect_at("b", 1.5, 0.8, 1),
            effect_at("c", 2.0, 0.5, 2),
            effect_at("d", 3.9, 0.7, 2),
            effect_at("e", 7.5, 0.6, 2),
            effect_at("f", 8.0, 0.3, 3),
            effect_at("g", 14.9, 0.4, 3),
            effect_at("h", 20.0, 0.2, 4),
            effect_at("i", 31.0, 0.2, 4),
        ],
        30,
    )
}

#[test]
fn timeline_uses_fixed_buckets() {
    let cascade = sample_cascade();
    let timeline = cascade.timeline();

    let shape: Vec<(TimelineBucket, Vec<&str>)> = timeline
        .iter()
        .map(|(bucket, effects)| (*bucket, effects.iter().map(|e| e.entity.as_str()).collect()))
        .collect();
    assert_eq!(
        shape,
        vec![
            (TimelineBucket::Hours0To4, vec!["a"]),
            (TimelineBucket::Day1, vec!["b"]),
            (TimelineBucket::Days2To3, vec!["d", "c"]),
            (TimelineBucket::Days4To7, vec!["e"]),
            (TimelineBucket::Days7To14, vec!["g", "f"]),
            (TimelineBucket::Days15To30, vec!["h"]),
        ]
    );
}

#[test]
fn timeline_omits_empty_buckets() {
    let cascade = Cascade::new(
        Event::new("T", 0.1),
        vec![effect_at("x", 5.0, 0.5, 1)],
        14,
    );
    let timeline = cascade.timeline();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].0.label(), "Day 4-7");
}

#[test]
fn cascade_views() {
    let cascade = sample_cascade();
    assert_eq!(cascade.effects_by_day(2).len(), 1);
    assert_eq!(cascade.effects_by_day(3).len(), 1);
    assert_eq!(cascade.effects_for_entity("e").len(), 1);
    assert_eq!(cascade.first_order_effects().len(), 2);
    assert_eq!(cascade.second_order_effects().len(), 3);
    assert_eq!(cascade.third_order_effects().len(), 2);
    assert_eq!(cascade.effects_by_order(4).len(), 2);
    assert!(cascade.effects_by_order(9).is_empty());
}

#[test]
fn report_serializes_in_display_order() {
    let graph = fixture_graph(ABC_CHAIN);
    let cascade = propagate(
        &Event::earnings("A", -8.0, ""),
        &graph,
        &PropagationConfig::default(),
    );
    let report = cascade.report();
    assert_eq!(report.total_effects, 2);
    assert_eq!(report.effects_by_order.get("order_1"), Some(&1));
    assert_eq!(report.effects_by_order.get("order_2"), Some(&1));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["trigger"]["entity"], "A");
    assert_eq!(json["trigger"]["description"], "A earnings miss of 8.0%");
    assert_eq!(json["horizon_days"], 14);

    let text = serde_json::to_string(&report).unwrap();
    let day1 = text.find("\"Day 1\"").unwrap();
    let day23 = text.find("\"Day 2-3\"").unwrap();
    assert!(day1 < day23);

    let c = &json["timeline"]["Day 2-3"][0];
    assert_eq!(c["entity"], "C");
    assert!((c["magnitude_percent"].as_f64().unwrap() - 1.6).abs() < 1e-9);
    assert!((c["magnitude_range"][0].as_f64().unwrap() - 1.28).abs() < 1e-9);
    assert!((c["magnitude_range"][1].as_f64().unwrap() - 1.92).abs() < 1e-9);
    assert!((c["confidence"].as_f64().unwrap() - 0.6).abs() < 1e-9);
}

#[test]
fn summary_lists_top_five_per_period() {
    let effects = (0..7)
        .map(|i| effect_at(&format!("e{i}"), 1.2, 0.9 - f64::from(i) * 0.1, 1))
        .collect();
    let cascade = Cascade::new(Event::new("T", -0.1), effects, 14);
    let summary = cascade.summary();

    assert!(summary.starts_with("Cascade from Event(T: -10.0%)"));
    assert!(summary.contains("Total effects: 7"));
    assert!(summary.contains("Day 1:"));
    assert!(summary.contains("  e0: -2.0% (conf: 0.90)"));
    assert!(!summary.contains("  e5:"));
    assert!(summary.contains("  ... and 2 more"));
}
