//! Feed-forward analysis of a network.
//!
//! This module provides:
//! - **simple**: the stack-based traversal that serves vertices until the arrival of the
//!   flow of interest at the vertex of interest is known
//! - **bound**: the final combination of that arrival with the vertex's service
//! - **errors**: error types shared by analysis and optimization

pub mod bound;
pub mod errors;
pub mod simple;

pub use bound::calculate_bound;
pub use errors::AnalysisError;
pub use simple::SimpleAnalysis;

use crate::ids::{FlowId, VertexId};
use crate::network::Network;
use crate::symbolic_math::Arrival;

/// The performance bound requested from an analysis or optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundType {
    /// Violation probability of a backlog target.
    Backlog,
    /// Violation probability of a delay target.
    Delay,
    /// Bound on the departures of the flow of interest.
    Output,
    /// Smallest backlog violated with at most a given probability.
    InverseBacklog,
    /// Smallest delay violated with at most a given probability.
    InverseDelay,
}

impl BoundType {
    /// The bound the analysis has to produce for this request.
    pub fn analysis_bound(self) -> BoundType {
        match self {
            BoundType::InverseBacklog => BoundType::Backlog,
            BoundType::InverseDelay => BoundType::Delay,
            other => other,
        }
    }
}

/// Available analysis algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnalysisType {
    #[default]
    Simple,
}

/// An analysis of one flow at one vertex.
pub trait Analyzer {
    /// Runs the analysis, consuming the analyzer's network state.
    fn analyze(&mut self) -> Result<Arrival, AnalysisError>;
}

/// Builds the analyzer for `analysis_type` over `network`.
///
/// The analyzer takes ownership of the network and mutates it; pass a
/// [`Network::deep_copy`] to keep the original.
pub fn create_analyzer(
    analysis_type: AnalysisType,
    network: Network,
    flow_of_interest: FlowId,
    vertex_of_interest: VertexId,
    bound_type: BoundType,
) -> Box<dyn Analyzer> {
    match analysis_type {
        AnalysisType::Simple => Box::new(SimpleAnalysis::new(
            network,
            flow_of_interest,
            vertex_of_interest,
            bound_type,
        )),
    }
}
