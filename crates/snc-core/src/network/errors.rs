//! Error types for network construction and mutation.

use thiserror::Error;

use crate::ids::{FlowId, VertexId};
use crate::symbolic_math::MathError;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    /// A vertex was asked to serve while one of its arrivals is still unknown.
    #[error("arrival not available at {vertex}: {message}")]
    ArrivalNotAvailable { vertex: VertexId, message: String },

    /// An invalid mutation (unknown ID, malformed route, non-convolutable pair, ...).
    #[error("network action failed: {0}")]
    NetworkAction(String),

    #[error(transparent)]
    Math(#[from] MathError),
}

impl NetworkError {
    pub(crate) fn unknown_vertex(id: VertexId) -> Self {
        NetworkError::NetworkAction(format!("vertex {} does not exist", id))
    }

    pub(crate) fn unknown_flow(id: FlowId) -> Self {
        NetworkError::NetworkAction(format!("flow {} does not exist", id))
    }
}
