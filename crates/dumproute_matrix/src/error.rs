use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("travel-time matrix is missing an entry for node pair ({from}, {to})")]
    MatrixIncomplete { from: usize, to: usize },

    #[error("routing engine unavailable: {reason}")]
    RoutingEngineUnavailable { reason: String },

    #[error("failed to read or write matrix cache at {path}: {source}")]
    Cache {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize matrix: {0}")]
    Serde(#[from] serde_json::Error),
}
