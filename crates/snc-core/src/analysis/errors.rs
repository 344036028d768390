//! Error types for analysis and optimization.

use thiserror::Error;

use crate::network::NetworkError;
use crate::symbolic_math::MathError;

impl From<NetworkError> for AnalysisError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::ArrivalNotAvailable { vertex, message } => {
                AnalysisError::ArrivalNotAvailable(format!("{}: {}", vertex, message))
            }
            NetworkError::Math(math) => AnalysisError::from(math),
            other => AnalysisError::Network(other),
        }
    }
}

impl From<MathError> for AnalysisError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::ServerOverload(msg) => AnalysisError::ServerOverload(msg),
            other => AnalysisError::Math(other),
        }
    }
}

/// Errors returned by the analysis and optimization entry points.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// No serveable vertex is left before the point of interest was reached.
    /// The network is not feed-forward (or the flow never reaches the vertex).
    #[error("deadlock: {0}")]
    Deadlock(String),

    #[error("arrival not available: {0}")]
    ArrivalNotAvailable(String),

    /// A vertex on the way to the point of interest is overloaded.
    #[error("server overload: {0}")]
    ServerOverload(String),

    /// Every point of the search space was infeasible.
    #[error("no feasible point: {0}")]
    NoFeasiblePoint(String),

    /// Invalid optimizer configuration or request (granularity, target, bound kind).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Network(NetworkError),

    #[error(transparent)]
    Math(MathError),
}
