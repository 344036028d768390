//! Stack-based feed-forward analysis.
//!
//! Vertices whose arrivals are all known are pushed on a stack. Popping a vertex serves
//! its prioritised flow and forwards the output to the next hop, which is pushed once it
//! knows all of its arrivals. The traversal stops when the flow of interest is the next
//! flow to be served at the vertex of interest. An exhausted stack means some vertex
//! waits on an arrival that depends on itself: the network is not feed-forward.

use crate::analysis::bound::calculate_bound;
use crate::analysis::{AnalysisError, Analyzer, BoundType};
use crate::ids::{FlowId, VertexId};
use crate::network::Network;
use crate::symbolic_math::Arrival;

pub struct SimpleAnalysis {
    network: Network,
    flow_of_interest: FlowId,
    vertex_of_interest: VertexId,
    bound_type: BoundType,
}

impl SimpleAnalysis {
    pub fn new(
        network: Network,
        flow_of_interest: FlowId,
        vertex_of_interest: VertexId,
        bound_type: BoundType,
    ) -> Self {
        Self {
            network,
            flow_of_interest,
            vertex_of_interest,
            bound_type,
        }
    }

    /// The network as left by the traversal.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// The point of interest must exist and lie on the flow's route; otherwise the
    /// traversal can never reach it.
    fn validate(&self) -> Result<(), AnalysisError> {
        let Some(flow) = self.network.flow(self.flow_of_interest) else {
            return Err(AnalysisError::Deadlock(format!(
                "flow {} is not in the network",
                self.flow_of_interest
            )));
        };
        if self.network.vertex(self.vertex_of_interest).is_none() {
            return Err(AnalysisError::Deadlock(format!(
                "vertex {} is not in the network",
                self.vertex_of_interest
            )));
        }
        if flow.position_of(self.vertex_of_interest).is_none() {
            return Err(AnalysisError::Deadlock(format!(
                "flow {} does not cross {}",
                self.flow_of_interest, self.vertex_of_interest
            )));
        }
        Ok(())
    }

    fn push_if_serveable(&self, stack: &mut Vec<VertexId>, vertex: VertexId) {
        let serveable = self
            .network
            .vertex(vertex)
            .map_or(false, |v| v.can_serve());
        if serveable && !stack.contains(&vertex) {
            #[cfg(feature = "tracing")]
            tracing::trace!("Pushed {}", vertex);
            stack.push(vertex);
        }
    }
}

impl Analyzer for SimpleAnalysis {
    fn analyze(&mut self) -> Result<Arrival, AnalysisError> {
        self.validate()?;

        let mut stack: Vec<VertexId> = self
            .network
            .vertices()
            .filter(|v| v.can_serve())
            .map(|v| v.id())
            .collect();
        if stack.is_empty() {
            return Err(AnalysisError::Deadlock(
                "no vertex knows all of its arrivals".to_string(),
            ));
        }

        while let Some(current) = stack.pop() {
            let Some(vertex) = self.network.vertex(current) else {
                continue;
            };
            if !vertex.can_serve() {
                continue;
            }

            if current == self.vertex_of_interest
                && vertex.prioritized_flow() == Some(self.flow_of_interest)
            {
                let arrival = vertex.arrival_of(self.flow_of_interest).cloned().ok_or_else(|| {
                    AnalysisError::ArrivalNotAvailable(format!(
                        "{} at {}",
                        self.flow_of_interest, current
                    ))
                })?;
                let service = vertex.service().clone();

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "Reached {} at {}, calculating {:?} bound",
                    self.flow_of_interest,
                    current,
                    self.bound_type
                );

                return calculate_bound(
                    &arrival,
                    &service,
                    self.bound_type,
                    self.network.hoelders_mut(),
                );
            }

            let (_served, next) = self.network.compute_leftover_service(current)?;
            if let Some(next) = next {
                self.push_if_serveable(&mut stack, next);
            }
            self.push_if_serveable(&mut stack, current);
        }

        Err(AnalysisError::Deadlock(format!(
            "arrival of {} at {} cannot be calculated; the network is not feed-forward",
            self.flow_of_interest, self.vertex_of_interest
        )))
    }
}
