use thiserror::Error;

/// The fatal error kinds that surface at the CLI boundary. `InputMalformed`
/// and `SemanticInvalid` are fatal for the problem that triggered them; an
/// incomplete travel-time matrix is logged and folded into route
/// infeasibility instead, so it never produces one of these variants, only
/// `--calculateTM`'s `RoutingEngineUnavailable` and the two input errors do.
#[derive(Error, Debug)]
pub enum ProblemError {
    #[error("{file}:{line}: {reason}")]
    InputMalformed { file: String, line: usize, reason: String },

    #[error("{file}: {reason}")]
    SemanticInvalid { file: String, reason: String },

    #[error("routing engine unavailable while building matrix: {0}")]
    RoutingEngineUnavailable(#[from] dumproute_matrix::MatrixError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
