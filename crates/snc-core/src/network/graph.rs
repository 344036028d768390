//! # Network
//!
//! Arena of vertices and flows plus the Hölder parameters minted while serving them.
//!
//! ## Design
//!
//! - Vertices and flows live in ordered maps keyed by monotonic IDs, so iteration (and
//!   therefore analysis) is deterministic
//! - Flows reference vertices by ID; each vertex keeps the priority and the known arrival
//!   of every flow crossing it
//! - Every mutation validates before touching state: a failed call leaves the network as
//!   it was
//! - Listeners are notified synchronously after a successful mutation
//!
//! ## Example
//!
//! ```rust
//! use snc_core::network::Network;
//! use snc_core::symbolic_math::{constant_rate_arrival, constant_rate_service};
//!
//! let mut network = Network::new();
//! let v1 = network.add_vertex(constant_rate_service(5.0).unwrap(), "v1");
//! let v2 = network.add_vertex(constant_rate_service(4.0).unwrap(), "v2");
//! let flow = network
//!     .add_flow(constant_rate_arrival(1.0).unwrap(), &[v1, v2], &[0, 0], "f")
//!     .unwrap();
//! assert!(network.vertex(v1).unwrap().can_serve());
//! assert_eq!(network.flow(flow).unwrap().route(), &[v1, v2]);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::ids::{FlowId, HoelderId, VertexId};
use crate::network::errors::NetworkError;
use crate::network::flow::{Flow, Route};
use crate::network::listener::NetworkListener;
use crate::network::vertex::{ServeOutcome, Vertex};
use crate::symbolic_math::combine;
use crate::symbolic_math::{Arrival, Dependencies, HoelderRegistry, Service};

pub struct Network {
    vertices: BTreeMap<VertexId, Vertex>,
    flows: BTreeMap<FlowId, Flow>,
    hoelders: HoelderRegistry,
    next_vertex_id: u32,
    next_flow_id: u32,
    listeners: Vec<Rc<dyn NetworkListener>>,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            vertices: BTreeMap::new(),
            flows: BTreeMap::new(),
            hoelders: HoelderRegistry::default(),
            next_vertex_id: 1,
            next_flow_id: 1,
            listeners: Vec::new(),
        }
    }
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Independent copy of the network without listeners.
    ///
    /// Symbolic functions are immutable and shared; everything mutable is cloned.
    pub fn deep_copy(&self) -> Network {
        Network {
            vertices: self.vertices.clone(),
            flows: self.flows.clone(),
            hoelders: self.hoelders.clone(),
            next_vertex_id: self.next_vertex_id,
            next_flow_id: self.next_flow_id,
            listeners: Vec::new(),
        }
    }

    // ----- listeners -----

    pub fn add_listener(&mut self, listener: Rc<dyn NetworkListener>) {
        self.listeners.push(listener);
    }

    fn notify(&self, event: impl Fn(&dyn NetworkListener)) {
        for listener in &self.listeners {
            event(listener.as_ref());
        }
    }

    // ----- accessors -----

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn flow(&self, id: FlowId) -> Option<&Flow> {
        self.flows.get(&id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn flows(&self) -> impl Iterator<Item = &Flow> {
        self.flows.values()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    pub fn vertex_by_alias(&self, alias: &str) -> Option<&Vertex> {
        self.vertices.values().find(|v| v.alias() == alias)
    }

    pub fn flow_by_alias(&self, alias: &str) -> Option<&Flow> {
        self.flows.values().find(|f| f.alias() == alias)
    }

    pub fn hoelders(&self) -> &HoelderRegistry {
        &self.hoelders
    }

    /// Mints a fresh parameter ID.
    pub fn create_hoelder(&mut self) -> HoelderId {
        self.hoelders.create()
    }

    pub(crate) fn hoelders_mut(&mut self) -> &mut HoelderRegistry {
        &mut self.hoelders
    }

    fn vertex_mut(&mut self, id: VertexId) -> Result<&mut Vertex, NetworkError> {
        self.vertices
            .get_mut(&id)
            .ok_or_else(|| NetworkError::unknown_vertex(id))
    }

    fn flow_mut(&mut self, id: FlowId) -> Result<&mut Flow, NetworkError> {
        self.flows
            .get_mut(&id)
            .ok_or_else(|| NetworkError::unknown_flow(id))
    }

    // ----- mutations -----

    /// Adds a vertex. Its service gains the vertex itself as a dependency.
    pub fn add_vertex(&mut self, service: Service, alias: impl Into<String>) -> VertexId {
        let id = VertexId(self.next_vertex_id);
        self.next_vertex_id += 1;
        let service = with_vertex_dependency(service, id);
        self.vertices.insert(id, Vertex::new(id, alias.into(), service));
        self.notify(|l| l.vertex_added(id));
        id
    }

    /// Adds a flow along `route` with one priority per hop.
    ///
    /// The initial arrival becomes known at the first hop and depends on the new flow.
    pub fn add_flow(
        &mut self,
        initial_arrival: Arrival,
        route: &[VertexId],
        priorities: &[i32],
        alias: impl Into<String>,
    ) -> Result<FlowId, NetworkError> {
        let alias = alias.into();
        if let Some(missing) = route.iter().find(|v| !self.vertices.contains_key(v)) {
            return Err(NetworkError::NetworkAction(format!(
                "flow {} routes through unknown vertex {}",
                alias, missing
            )));
        }
        for (i, vertex) in route.iter().enumerate() {
            if route[..i].contains(vertex) {
                return Err(NetworkError::NetworkAction(format!(
                    "flow {} visits {} twice",
                    alias, vertex
                )));
            }
        }

        let id = FlowId(self.next_flow_id);
        let arrival = with_flow_dependency(initial_arrival, id);
        let flow = Flow::new(
            id,
            alias,
            route.iter().copied().collect::<Route>(),
            priorities.iter().copied().collect(),
            arrival.clone(),
        )?;
        self.next_flow_id += 1;

        for (vertex, priority) in route.iter().zip(priorities) {
            if let Some(v) = self.vertices.get_mut(vertex) {
                v.add_flow(id, *priority);
            }
        }
        if let Some(first) = self.vertices.get_mut(&route[0]) {
            first.learn_arrival(id, arrival);
        }
        self.flows.insert(id, flow);

        #[cfg(feature = "tracing")]
        tracing::debug!("Added flow {} over {} hop(s)", id, route.len());

        self.notify(|l| l.flow_added(id));
        Ok(id)
    }

    pub fn remove_flow(&mut self, id: FlowId) -> Result<(), NetworkError> {
        let flow = self
            .flows
            .remove(&id)
            .ok_or_else(|| NetworkError::unknown_flow(id))?;
        for vertex in flow.route() {
            if let Some(v) = self.vertices.get_mut(vertex) {
                v.remove_flow(id);
            }
        }
        self.notify(|l| l.flow_removed(id));
        Ok(())
    }

    /// Removes a vertex and splices it out of every route.
    ///
    /// Flows left without any hop are removed as well.
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<(), NetworkError> {
        let vertex = self
            .vertices
            .remove(&id)
            .ok_or_else(|| NetworkError::unknown_vertex(id))?;

        let mut emptied = Vec::new();
        let mut changed = Vec::new();
        for flow_id in vertex.flows().keys() {
            let Some(flow) = self.flows.get_mut(flow_id) else {
                continue;
            };
            flow.remove_vertex(id);
            if flow.is_empty() {
                emptied.push(*flow_id);
                continue;
            }
            if let (Some(first), Some(initial)) = (flow.first_vertex(), flow.initial_arrival()) {
                let initial = initial.clone();
                if let Some(v) = self.vertices.get_mut(&first) {
                    v.learn_arrival(*flow_id, initial);
                }
            }
            changed.push(*flow_id);
        }
        for flow_id in &emptied {
            self.flows.remove(flow_id);
        }

        for flow_id in &changed {
            self.notify(|l| l.flow_changed(*flow_id));
        }
        for flow_id in &emptied {
            self.notify(|l| l.flow_removed(*flow_id));
        }
        self.notify(|l| l.vertex_removed(id));
        Ok(())
    }

    /// Extends a flow's route by one hop.
    pub fn append_vertex(
        &mut self,
        flow: FlowId,
        vertex: VertexId,
        priority: i32,
    ) -> Result<(), NetworkError> {
        if !self.vertices.contains_key(&vertex) {
            return Err(NetworkError::unknown_vertex(vertex));
        }
        let f = self.flow_mut(flow)?;
        if f.route().contains(&vertex) {
            return Err(NetworkError::NetworkAction(format!(
                "flow {} already visits {}",
                flow, vertex
            )));
        }
        f.append_vertex(vertex, priority);
        self.vertex_mut(vertex)?.add_flow(flow, priority);
        self.notify(|l| l.flow_changed(flow));
        Ok(())
    }

    /// Replaces the arrival of a flow at its first hop.
    pub fn set_initial_arrival(&mut self, flow: FlowId, arrival: Arrival) -> Result<(), NetworkError> {
        let arrival = with_flow_dependency(arrival, flow);
        let f = self.flow_mut(flow)?;
        f.set_initial_arrival(arrival.clone());
        let first = f.first_vertex();
        if let Some(v) = first.and_then(|id| self.vertices.get_mut(&id)) {
            v.learn_arrival(flow, arrival);
        }
        self.notify(|l| l.flow_changed(flow));
        Ok(())
    }

    pub fn set_service(&mut self, vertex: VertexId, service: Service) -> Result<(), NetworkError> {
        let service = with_vertex_dependency(service, vertex);
        self.vertex_mut(vertex)?.set_service(service);
        self.notify(|l| l.vertex_changed(vertex));
        Ok(())
    }

    /// Serves the prioritised flow at `vertex`, minting Hölder IDs from this network.
    pub fn serve_vertex(&mut self, vertex: VertexId) -> Result<ServeOutcome, NetworkError> {
        let v = self
            .vertices
            .get_mut(&vertex)
            .ok_or_else(|| NetworkError::unknown_vertex(vertex))?;
        Ok(v.serve(&mut self.hoelders))
    }

    /// Lets `flow` learn its output bound and hands it to the next hop.
    ///
    /// Returns the hop that received the arrival, or `None` if the flow left the network.
    pub fn deliver(&mut self, flow: FlowId, output: Arrival) -> Result<Option<VertexId>, NetworkError> {
        let next = self.flow_mut(flow)?.learn_arrival(output.clone());
        if let Some(next) = next {
            self.vertex_mut(next)?.learn_arrival(flow, output);
        }
        Ok(next)
    }

    /// Serves `vertex`, forwards the output of the served flow and returns
    /// `(served flow, next hop)`.
    ///
    /// Fails with `ArrivalNotAvailable` if the vertex cannot serve yet, leaving it intact.
    pub fn compute_leftover_service(
        &mut self,
        vertex: VertexId,
    ) -> Result<(FlowId, Option<VertexId>), NetworkError> {
        let (flow, output) = self.serve_vertex(vertex)?.into_result(vertex)?;
        let next = self.deliver(flow, output)?;
        self.notify(|l| l.vertex_changed(vertex));
        self.notify(|l| l.flow_changed(flow));
        Ok((flow, next))
    }

    /// True if `second` directly follows `first` on `flow` and neither vertex carries any
    /// other flow.
    pub fn are_convolutable(&self, first: VertexId, second: VertexId, flow: FlowId) -> bool {
        let (Some(f), Some(v1), Some(v2)) = (
            self.flows.get(&flow),
            self.vertices.get(&first),
            self.vertices.get(&second),
        ) else {
            return false;
        };
        let only_this_flow = |v: &Vertex| v.flows().len() == 1 && v.carries(flow);
        f.successor(first) == Some(second) && only_this_flow(v1) && only_this_flow(v2)
    }

    /// Merges two consecutive vertices of `flow` into one whose service is their
    /// concatenation. Returns the ID of the merged vertex.
    pub fn convolute(
        &mut self,
        first: VertexId,
        second: VertexId,
        flow: FlowId,
    ) -> Result<VertexId, NetworkError> {
        if !self.are_convolutable(first, second, flow) {
            return Err(NetworkError::NetworkAction(format!(
                "{} and {} cannot be convoluted along {}",
                first, second, flow
            )));
        }
        let (Some(v1), Some(v2)) = (self.vertices.get(&first), self.vertices.get(&second)) else {
            return Err(NetworkError::unknown_vertex(first));
        };
        let alias = format!("{}+{}", v1.alias(), v2.alias());
        let priority = v1.priority_of(flow).unwrap_or(0);
        let arrival = v1.arrival_of(flow).cloned();
        let service = combine::concatenate(v1.service(), v2.service());

        let merged = VertexId(self.next_vertex_id);
        self.next_vertex_id += 1;
        let mut vertex = Vertex::new(merged, alias, with_vertex_dependency(service, merged));
        vertex.add_flow(flow, priority);
        if let Some(arrival) = arrival {
            vertex.learn_arrival(flow, arrival);
        }

        self.flow_mut(flow)?.replace_pair(first, second, merged)?;
        self.vertices.remove(&first);
        self.vertices.remove(&second);
        self.vertices.insert(merged, vertex);

        #[cfg(feature = "tracing")]
        tracing::debug!("Convoluted {} and {} into {}", first, second, merged);

        self.notify(|l| l.vertex_removed(first));
        self.notify(|l| l.vertex_removed(second));
        self.notify(|l| l.vertex_added(merged));
        self.notify(|l| l.flow_changed(flow));
        Ok(merged)
    }

    /// Removes everything and resets the ID counters.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.flows.clear();
        self.hoelders = HoelderRegistry::default();
        self.next_vertex_id = 1;
        self.next_flow_id = 1;
        self.notify(|l| l.cleared());
    }
}

fn with_vertex_dependency(mut service: Service, vertex: VertexId) -> Service {
    service.dependencies = service
        .dependencies
        .union(&Dependencies::of_vertex(vertex));
    service
}

fn with_flow_dependency(mut arrival: Arrival, flow: FlowId) -> Arrival {
    arrival.dependencies = arrival.dependencies.union(&Dependencies::of_flow(flow));
    arrival
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("vertices", &self.vertices)
            .field("flows", &self.flows)
            .field("hoelders", &self.hoelders)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Network: {} vertices, {} flows",
            self.vertices.len(),
            self.flows.len()
        )?;
        for vertex in self.vertices.values() {
            writeln!(
                f,
                "  {} '{}': service {} | flows {:?}",
                vertex.id(),
                vertex.alias(),
                vertex.service(),
                vertex.flows().keys().map(|id| id.0).collect::<Vec<_>>()
            )?;
        }
        for flow in self.flows.values() {
            let route: Vec<String> = flow
                .route()
                .iter()
                .zip(flow.priorities())
                .map(|(v, p)| format!("{}:{}", v, p))
                .collect();
            writeln!(f, "  {} '{}': {}", flow.id(), flow.alias(), route.join(" -> "))?;
        }
        Ok(())
    }
}
