use thiserror::Error;

/// Central error type for trendgraph operations.
#[derive(Error, Debug)]
pub enum TrendGraphError {
    /// The repository source was unreachable, timed out, or returned a malformed body.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// A repository record violated the analyzer's input contract.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// An assembled graph broke a structural invariant. Indicates an analyzer bug.
    #[error("Inconsistent graph: {0}")]
    InconsistentGraph(String),

    #[error("Similarity computation failed: {0}")]
    SimilarityComputation(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrendGraphError {
    /// Stable snake_case tag for this error, used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            TrendGraphError::Fetch(_) => "fetch_error",
            TrendGraphError::InvalidRecord(_) => "invalid_record",
            TrendGraphError::InconsistentGraph(_) => "inconsistent_graph",
            TrendGraphError::SimilarityComputation(_) => "similarity_computation_error",
            TrendGraphError::InvalidRequest(_) => "invalid_request",
            TrendGraphError::ConfigError(_) => "config_error",
            TrendGraphError::SerializationError(_) => "serialization_error",
            TrendGraphError::IoError(_) => "io_error",
            TrendGraphError::Internal(_) => "internal_error",
        }
    }
}

/// Convenience type alias for trendgraph results.
pub type TrendGraphResult<T> = Result<T, TrendGraphError>;
