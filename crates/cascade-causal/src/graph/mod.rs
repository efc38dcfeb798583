//! Causal graph model: entities, links, and the petgraph-backed container.

mod causal_graph;
mod entity;
mod link;
mod serialization;

pub use causal_graph::{CausalGraph, CausalStableGraph};
pub use entity::{Attributes, Entity};
pub use link::{CausalLink, LinkKey};
pub use serialization::GraphDocument;

use cascade_observability::events;

/// Union of several graphs.
///
/// The first occurrence of an entity id wins. Links are applied in order, so
/// a later link replaces an earlier one with the same key. Links whose
/// endpoints are missing from the union are skipped.
pub fn merge_graphs(graphs: &[&CausalGraph]) -> CausalGraph {
    let mut merged = CausalGraph::new();
    for graph in graphs {
        for entity in graph.entities() {
            if !merged.contains_entity(&entity.id) {
                merged.add_entity(entity.clone());
            }
        }
    }
    for graph in graphs {
        for link in graph.iter_links() {
            if let Err(e) = merged.add_link(link.clone()) {
                events::link_skipped(&link.source, &link.target, &e.to_string());
            }
        }
    }
    merged
}
