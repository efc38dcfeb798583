//! petgraph::StableGraph wrapper keyed by entity id.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};

use cascade_core::errors::{EndpointRole, GraphError};

use super::entity::Entity;
use super::link::{CausalLink, LinkKey};

/// The underlying directed graph type.
pub type CausalStableGraph = StableGraph<Entity, CausalLink, Directed>;

/// Entities plus the causal links between them.
///
/// Adjacency is stored once in the petgraph structure and read in both
/// directions, so the outgoing and incoming views can never disagree.
/// petgraph prepends new edges to a node's adjacency list, so iterating a
/// node's edges and reversing yields insertion order.
#[derive(Debug, Clone, Default)]
pub struct CausalGraph {
    graph: CausalStableGraph,
    node_index: HashMap<String, NodeIndex>,
}

impl CausalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, or replace the stored entity with the same id.
    /// Links touching the entity are kept.
    pub fn add_entity(&mut self, entity: Entity) {
        if let Some(&idx) = self.node_index.get(&entity.id) {
            self.graph[idx] = entity;
            return;
        }
        let id = entity.id.clone();
        let idx = self.graph.add_node(entity);
        self.node_index.insert(id, idx);
    }

    /// Add a link between two existing entities.
    ///
    /// Replaces any link with the same `(source, target, relationship_type)`.
    /// Parameters are clamped into range on the way in.
    pub fn add_link(&mut self, link: CausalLink) -> Result<(), GraphError> {
        let source = self.require_endpoint(&link, EndpointRole::Source)?;
        let target = self.require_endpoint(&link, EndpointRole::Target)?;
        self.insert_link(source, target, link.clamped());
        Ok(())
    }

    fn require_endpoint(
        &self,
        link: &CausalLink,
        role: EndpointRole,
    ) -> Result<NodeIndex, GraphError> {
        let id = match role {
            EndpointRole::Source => &link.source,
            EndpointRole::Target => &link.target,
        };
        self.node_index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::MissingEndpoint {
                source_id: link.source.clone(),
                target_id: link.target.clone(),
                missing: id.clone(),
                role,
            })
    }

    fn insert_link(&mut self, source: NodeIndex, target: NodeIndex, link: CausalLink) {
        let existing = self
            .graph
            .edges_directed(source, Direction::Outgoing)
            .find(|e| {
                e.target() == target && e.weight().relationship_type == link.relationship_type
            })
            .map(|e| e.id());
        if let Some(edge) = existing {
            self.graph.remove_edge(edge);
        }
        self.graph.add_edge(source, target, link);
    }

    pub fn get_entity(&self, entity_id: &str) -> Option<&Entity> {
        self.node_index.get(entity_id).map(|&idx| &self.graph[idx])
    }

    pub fn contains_entity(&self, entity_id: &str) -> bool {
        self.node_index.contains_key(entity_id)
    }

    /// Entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.entities().map(|e| e.id.as_str())
    }

    /// Edge ids touching `node` in one direction, oldest first.
    fn edge_ids(&self, node: NodeIndex, direction: Direction) -> Vec<EdgeIndex> {
        let mut ids: Vec<EdgeIndex> = self
            .graph
            .edges_directed(node, direction)
            .map(|e| e.id())
            .collect();
        ids.reverse();
        ids
    }

    fn links_in_insertion_order(&self, entity_id: &str, direction: Direction) -> Vec<&CausalLink> {
        let Some(&idx) = self.node_index.get(entity_id) else {
            return Vec::new();
        };
        self.edge_ids(idx, direction)
            .into_iter()
            .filter_map(|edge| self.graph.edge_weight(edge))
            .collect()
    }

    /// Outgoing links sorted by target id.
    ///
    /// The sort is stable, so links to the same target keep insertion order.
    /// Propagation relies on this ordering for reproducible cascades.
    pub fn get_outgoing(&self, entity_id: &str) -> Vec<&CausalLink> {
        let mut links = self.links_in_insertion_order(entity_id, Direction::Outgoing);
        links.sort_by(|a, b| a.target.cmp(&b.target));
        links
    }

    /// Incoming links in insertion order.
    pub fn get_incoming(&self, entity_id: &str) -> Vec<&CausalLink> {
        self.links_in_insertion_order(entity_id, Direction::Incoming)
    }

    fn find_link_edge(&self, source: &str, target: &str) -> Option<EdgeIndex> {
        let src = *self.node_index.get(source)?;
        let tgt = *self.node_index.get(target)?;
        self.edge_ids(src, Direction::Outgoing)
            .into_iter()
            .find(|&edge| {
                self.graph
                    .edge_endpoints(edge)
                    .is_some_and(|(_, t)| t == tgt)
            })
    }

    /// First link from `source` to `target` in insertion order, whatever its
    /// relationship type.
    pub fn get_link(&self, source: &str, target: &str) -> Option<&CausalLink> {
        let edge = self.find_link_edge(source, target)?;
        self.graph.edge_weight(edge)
    }

    /// Mutable access to the link `get_link` would return.
    pub fn get_link_mut(&mut self, source: &str, target: &str) -> Option<&mut CausalLink> {
        let edge = self.find_link_edge(source, target)?;
        self.graph.edge_weight_mut(edge)
    }

    /// The link with exactly this `(source, target, relationship_type)`.
    pub fn get_link_by_key(&self, key: &LinkKey) -> Option<&CausalLink> {
        let edge = self.find_keyed_edge(key)?;
        self.graph.edge_weight(edge)
    }

    pub fn get_link_by_key_mut(&mut self, key: &LinkKey) -> Option<&mut CausalLink> {
        let edge = self.find_keyed_edge(key)?;
        self.graph.edge_weight_mut(edge)
    }

    fn find_keyed_edge(&self, key: &LinkKey) -> Option<EdgeIndex> {
        let src = *self.node_index.get(&key.source)?;
        self.graph
            .edges_directed(src, Direction::Outgoing)
            .find(|e| {
                e.weight().target == key.target
                    && e.weight().relationship_type == key.relationship_type
            })
            .map(|e| e.id())
    }

    pub fn get_entities_by_type(&self, entity_type: &str) -> Vec<&Entity> {
        self.entities()
            .filter(|e| e.entity_type == entity_type)
            .collect()
    }

    pub fn get_entities_by_attribute(&self, key: &str, value: &serde_json::Value) -> Vec<&Entity> {
        self.entities()
            .filter(|e| e.attributes.get(key) == Some(value))
            .collect()
    }

    /// All links, grouped by source in entity insertion order.
    pub fn iter_links(&self) -> impl Iterator<Item = &CausalLink> + '_ {
        self.graph.node_indices().flat_map(move |idx| {
            self.edge_ids(idx, Direction::Outgoing)
                .into_iter()
                .filter_map(move |edge| self.graph.edge_weight(edge))
        })
    }

    pub fn num_entities(&self) -> usize {
        self.graph.node_count()
    }

    pub fn num_links(&self) -> usize {
        self.graph.edge_count()
    }

    /// Entity ids within `depth` hops of `entity_id`, following links in
    /// both directions. The origin itself is excluded.
    pub fn get_neighbors(&self, entity_id: &str, depth: usize) -> HashSet<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
        if let Some((origin, _)) = self.node_index.get_key_value(entity_id) {
            seen.insert(origin.as_str());
            queue.push_back((origin.as_str(), 0));
        }

        while let Some((current, hops)) = queue.pop_front() {
            if hops >= depth {
                continue;
            }
            let next = self
                .get_outgoing(current)
                .into_iter()
                .map(|l| l.target.as_str())
                .chain(self.get_incoming(current).into_iter().map(|l| l.source.as_str()));
            for neighbor in next {
                if seen.insert(neighbor) {
                    queue.push_back((neighbor, hops + 1));
                }
            }
        }

        seen.remove(entity_id);
        seen.into_iter().map(str::to_string).collect()
    }

    /// Induced subgraph over `entity_ids`: the listed entities that exist here
    /// and every link whose endpoints are both listed.
    pub fn subgraph<I, S>(&self, entity_ids: I) -> CausalGraph
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted: HashSet<String> = entity_ids
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut sub = CausalGraph::new();
        for entity in self.entities().filter(|e| wanted.contains(&e.id)) {
            sub.add_entity(entity.clone());
        }

        let included: Vec<String> = sub.entity_ids().map(str::to_string).collect();
        for id in &included {
            for link in self.get_outgoing(id) {
                if let (Some(&src), Some(&tgt)) =
                    (sub.node_index.get(&link.source), sub.node_index.get(&link.target))
                {
                    sub.insert_link(src, tgt, link.clone());
                }
            }
        }
        sub
    }

    /// Multi-line summary of entity and relationship type counts.
    pub fn summary(&self) -> String {
        let mut entity_types: BTreeMap<&str, usize> = BTreeMap::new();
        for entity in self.entities() {
            *entity_types.entry(entity.entity_type.as_str()).or_default() += 1;
        }
        let mut relationship_types: BTreeMap<&str, usize> = BTreeMap::new();
        for link in self.iter_links() {
            *relationship_types
                .entry(link.relationship_type.as_str())
                .or_default() += 1;
        }

        let mut lines = vec![
            "Causal Graph Summary".to_string(),
            "=".repeat(40),
            format!("Total Entities: {}", self.num_entities()),
            format!("Total Links: {}", self.num_links()),
            String::new(),
            "Entities by Type:".to_string(),
        ];
        for (entity_type, count) in entity_types {
            lines.push(format!("  {entity_type}: {count}"));
        }
        lines.push(String::new());
        lines.push("Links by Type:".to_string());
        for (relationship, count) in relationship_types {
            lines.push(format!("  {relationship}: {count}"));
        }
        lines.join("\n")
    }

    /// Links sorted by key, for order-insensitive comparison.
    fn sorted_links(&self) -> Vec<&CausalLink> {
        let mut links: Vec<&CausalLink> = self.iter_links().collect();
        links.sort_by(|a, b| {
            (&a.source, &a.target, &a.relationship_type).cmp(&(
                &b.source,
                &b.target,
                &b.relationship_type,
            ))
        });
        links
    }
}

/// Graphs are equal when they hold the same entity ids and the same links,
/// regardless of insertion order.
impl PartialEq for CausalGraph {
    fn eq(&self, other: &Self) -> bool {
        if self.num_entities() != other.num_entities() || self.num_links() != other.num_links() {
            return false;
        }
        let ids: HashSet<&str> = self.entity_ids().collect();
        if !other.entity_ids().all(|id| ids.contains(id)) {
            return false;
        }
        self.sorted_links() == other.sorted_links()
    }
}

impl std::fmt::Display for CausalGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CausalGraph(entities={}, links={})",
            self.num_entities(),
            self.num_links()
        )
    }
}
