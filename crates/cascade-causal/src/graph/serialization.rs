//! JSON document form of a causal graph.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use cascade_core::errors::GraphError;
use cascade_observability::events;

use super::causal_graph::CausalGraph;
use super::entity::Entity;
use super::link::CausalLink;

/// Serialized graph: `{"entities": [Entity], "links": [CausalLink]}`.
///
/// Links carry every `CausalLink` field under its own name; `last_updated`
/// is an ISO-8601 timestamp or null.
///
/// Link records are decoded one at a time. A record missing a required
/// field fails the whole document; any other malformed record is skipped
/// with a warning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default, deserialize_with = "deserialize_links")]
    pub links: Vec<CausalLink>,
}

const REQUIRED_LINK_FIELDS: [&str; 7] = [
    "source",
    "target",
    "relationship_type",
    "strength",
    "delay_mean",
    "delay_std",
    "confidence",
];

fn deserialize_links<'de, D>(deserializer: D) -> Result<Vec<CausalLink>, D::Error>
where
    D: Deserializer<'de>,
{
    let records: Vec<serde_json::Value> = Vec::deserialize(deserializer)?;
    let mut links = Vec::with_capacity(records.len());
    for record in records {
        if let Some(field) = REQUIRED_LINK_FIELDS
            .iter()
            .find(|field| record.get(**field).is_none())
        {
            return Err(serde::de::Error::missing_field(*field));
        }
        let endpoint = |key: &str| {
            record
                .get(key)
                .and_then(serde_json::Value::as_str)
                .unwrap_or("?")
                .to_string()
        };
        let (source, target) = (endpoint("source"), endpoint("target"));
        match serde_json::from_value::<CausalLink>(record) {
            Ok(link) => links.push(link),
            Err(e) => events::link_skipped(&source, &target, &e.to_string()),
        }
    }
    Ok(links)
}

impl CausalGraph {
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            entities: self.entities().cloned().collect(),
            links: self.iter_links().cloned().collect(),
        }
    }

    /// Rebuild a graph from a document. Links whose endpoints are not in the
    /// document are skipped with a warning.
    pub fn from_document(document: GraphDocument) -> Self {
        let mut graph = CausalGraph::new();
        for entity in document.entities {
            graph.add_entity(entity);
        }
        for link in document.links {
            let (source, target) = (link.source.clone(), link.target.clone());
            if let Err(e) = graph.add_link(link) {
                events::link_skipped(&source, &target, &e.to_string());
            }
        }
        graph
    }

    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let document: GraphDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(document))
    }

    pub fn save(&self, path: &Path) -> Result<(), GraphError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| GraphError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let json = std::fs::read_to_string(path).map_err(|e| GraphError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }
}
