//! Service elements.

use std::collections::BTreeMap;

use crate::ids::{FlowId, HoelderId, VertexId};
use crate::network::errors::NetworkError;
use crate::symbolic_math::combine;
use crate::symbolic_math::{Arrival, HoelderRegistry, MathError, Service};

/// A flow registered at a vertex.
#[derive(Debug, Clone)]
pub struct QueuedFlow {
    pub priority: i32,
    /// Arrival of the flow at this vertex, once known.
    pub arrival: Option<Arrival>,
}

/// Result of serving a vertex.
#[derive(Debug, Clone)]
pub enum ServeOutcome {
    /// `flow` was served; `output` bounds its departures.
    Served { flow: FlowId, output: Arrival },
    /// The vertex carries no flow, or some arrival is still unknown.
    NotReady,
    /// The prioritised flow's combined rate is a non-negative constant.
    Overloaded { flow: FlowId },
}

impl ServeOutcome {
    /// Converts the outcome of a serve at `vertex` into a result.
    pub fn into_result(self, vertex: VertexId) -> Result<(FlowId, Arrival), NetworkError> {
        match self {
            ServeOutcome::Served { flow, output } => Ok((flow, output)),
            ServeOutcome::NotReady => Err(NetworkError::ArrivalNotAvailable {
                vertex,
                message: "not every arrival at the vertex is known".to_string(),
            }),
            ServeOutcome::Overloaded { flow } => Err(NetworkError::Math(MathError::ServerOverload(
                format!("{} overloads {}", flow, vertex),
            ))),
        }
    }
}

/// A server with a service bound and the flows crossing it.
#[derive(Debug, Clone)]
pub struct Vertex {
    id: VertexId,
    alias: String,
    service: Service,
    flows: BTreeMap<FlowId, QueuedFlow>,
}

impl Vertex {
    pub(crate) fn new(id: VertexId, alias: String, service: Service) -> Self {
        Self {
            id,
            alias,
            service,
            flows: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    pub(crate) fn set_service(&mut self, service: Service) {
        self.service = service;
    }

    pub fn flows(&self) -> &BTreeMap<FlowId, QueuedFlow> {
        &self.flows
    }

    pub fn carries(&self, flow: FlowId) -> bool {
        self.flows.contains_key(&flow)
    }

    pub fn priority_of(&self, flow: FlowId) -> Option<i32> {
        self.flows.get(&flow).map(|q| q.priority)
    }

    pub fn arrival_of(&self, flow: FlowId) -> Option<&Arrival> {
        self.flows.get(&flow).and_then(|q| q.arrival.as_ref())
    }

    pub(crate) fn add_flow(&mut self, flow: FlowId, priority: i32) {
        self.flows.insert(
            flow,
            QueuedFlow {
                priority,
                arrival: None,
            },
        );
    }

    pub(crate) fn remove_flow(&mut self, flow: FlowId) -> Option<QueuedFlow> {
        self.flows.remove(&flow)
    }

    /// Sets the arrival of a flow already registered here. Returns false otherwise.
    pub(crate) fn learn_arrival(&mut self, flow: FlowId, arrival: Arrival) -> bool {
        match self.flows.get_mut(&flow) {
            Some(queued) => {
                queued.arrival = Some(arrival);
                true
            }
            None => false,
        }
    }

    /// True iff the vertex carries a flow and knows every arrival.
    pub fn can_serve(&self) -> bool {
        !self.flows.is_empty() && self.flows.values().all(|q| q.arrival.is_some())
    }

    /// The flow served next: lowest priority value, ties broken by lowest flow ID.
    pub fn prioritized_flow(&self) -> Option<FlowId> {
        self.flows
            .iter()
            .min_by_key(|(id, q)| (q.priority, **id))
            .map(|(id, _)| *id)
    }

    /// Serves the prioritised flow.
    ///
    /// On success the flow leaves the vertex and the service becomes the leftover service
    /// for the remaining flows. `NotReady` and `Overloaded` leave the vertex untouched.
    /// A Hölder parameter is minted from `hoelders` only if the arrival and the service
    /// are statistically dependent.
    pub fn serve(&mut self, hoelders: &mut HoelderRegistry) -> ServeOutcome {
        if !self.can_serve() {
            return ServeOutcome::NotReady;
        }
        let Some(flow) = self.prioritized_flow() else {
            return ServeOutcome::NotReady;
        };
        let Some(arrival) = self.arrival_of(flow).cloned() else {
            return ServeOutcome::NotReady;
        };

        let combined = combine::combined_rho(&arrival, &self.service, None);
        if matches!(combined.constant_value(), Some(rate) if rate >= 0.0) {
            return ServeOutcome::Overloaded { flow };
        }

        let hoelder: Option<HoelderId> =
            combine::is_dependent(&arrival, &self.service).then(|| hoelders.create());

        let output = combine::output_bound(&arrival, &self.service, hoelder);
        let leftover = combine::leftover_service(&arrival, &self.service, hoelder);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Served {} at {} ({})",
            flow,
            self.id,
            if hoelder.is_some() { "dependent" } else { "independent" }
        );

        self.service = leftover;
        self.flows.remove(&flow);
        ServeOutcome::Served { flow, output }
    }
}
