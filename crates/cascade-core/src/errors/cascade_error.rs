use super::{ConfigError, GraphError, OutcomeError};

/// Top-level error for the Cascade engine.
#[derive(Debug, thiserror::Error)]
pub enum CascadeError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Outcome(#[from] OutcomeError),
}

pub type CascadeResult<T> = Result<T, CascadeError>;
