/// Which end of a link failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    Source,
    Target,
}

impl std::fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// Causal graph errors.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("{role} entity '{missing}' not found in graph (link {source_id} -> {target_id})")]
    MissingEndpoint {
        source_id: String,
        target_id: String,
        missing: String,
        role: EndpointRole,
    },

    #[error("graph serialization failed: {message}")]
    Serialization { message: String },

    #[error("graph file error at {path}: {message}")]
    Io { path: String, message: String },
}

impl From<serde_json::Error> for GraphError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}
