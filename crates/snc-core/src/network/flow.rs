//! Flows and their routes.

use smallvec::SmallVec;

use crate::ids::{FlowId, VertexId};
use crate::network::errors::NetworkError;
use crate::symbolic_math::Arrival;

/// Inline capacity for routes; most analysed networks are short tandems.
pub type Route = SmallVec<[VertexId; 8]>;

/// A flow crossing a sequence of vertices.
///
/// `route`, `priorities` and `arrivals` are parallel: position `i` describes the flow at
/// its `i`-th hop. Initially only the first arrival is known; the analysis appends
/// output bounds as it serves the flow hop by hop.
#[derive(Debug, Clone)]
pub struct Flow {
    id: FlowId,
    alias: String,
    route: Route,
    priorities: SmallVec<[i32; 8]>,
    arrivals: Vec<Option<Arrival>>,
    /// Next position whose arrival is still to be learned.
    known: usize,
}

impl Flow {
    pub(crate) fn new(
        id: FlowId,
        alias: String,
        route: Route,
        priorities: SmallVec<[i32; 8]>,
        initial_arrival: Arrival,
    ) -> Result<Self, NetworkError> {
        if route.is_empty() {
            return Err(NetworkError::NetworkAction(format!(
                "flow {} needs a non-empty route",
                alias
            )));
        }
        if route.len() != priorities.len() {
            return Err(NetworkError::NetworkAction(format!(
                "flow {}: route has {} hop(s) but {} priorit(ies) were given",
                alias,
                route.len(),
                priorities.len()
            )));
        }
        let mut arrivals = vec![None; route.len()];
        arrivals[0] = Some(initial_arrival);
        Ok(Self {
            id,
            alias,
            route,
            priorities,
            arrivals,
            known: 1,
        })
    }

    pub fn id(&self) -> FlowId {
        self.id
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn route(&self) -> &[VertexId] {
        &self.route
    }

    pub fn priorities(&self) -> &[i32] {
        &self.priorities
    }

    pub fn arrivals(&self) -> &[Option<Arrival>] {
        &self.arrivals
    }

    pub fn initial_arrival(&self) -> Option<&Arrival> {
        self.arrivals.first().and_then(Option::as_ref)
    }

    pub fn first_vertex(&self) -> Option<VertexId> {
        self.route.first().copied()
    }

    pub fn position_of(&self, vertex: VertexId) -> Option<usize> {
        self.route.iter().position(|v| *v == vertex)
    }

    /// Vertex following `vertex` on the route.
    pub fn successor(&self, vertex: VertexId) -> Option<VertexId> {
        self.position_of(vertex)
            .and_then(|pos| self.route.get(pos + 1))
            .copied()
    }

    /// Vertex whose arrival is learned next, if any.
    pub fn next_unknown(&self) -> Option<VertexId> {
        self.route.get(self.known).copied()
    }

    pub(crate) fn set_initial_arrival(&mut self, arrival: Arrival) {
        self.arrivals[0] = Some(arrival);
    }

    /// Records the arrival at the next unknown position and advances the cursor.
    ///
    /// Returns the vertex the arrival belongs to, or `None` once the flow has left the
    /// network (the output of the last hop is dropped).
    pub(crate) fn learn_arrival(&mut self, arrival: Arrival) -> Option<VertexId> {
        let vertex = self.route.get(self.known).copied()?;
        self.arrivals[self.known] = Some(arrival);
        self.known += 1;
        Some(vertex)
    }

    pub(crate) fn append_vertex(&mut self, vertex: VertexId, priority: i32) {
        self.route.push(vertex);
        self.priorities.push(priority);
        self.arrivals.push(None);
    }

    /// Removes every occurrence of `vertex` from the route.
    ///
    /// If the first hop goes, its initial arrival moves to the new first hop.
    pub(crate) fn remove_vertex(&mut self, vertex: VertexId) {
        let initial = self.arrivals.first().cloned().flatten();
        let first_removed = self.route.first() == Some(&vertex);

        let mut i = 0;
        while i < self.route.len() {
            if self.route[i] == vertex {
                self.route.remove(i);
                self.priorities.remove(i);
                self.arrivals.remove(i);
                if i < self.known {
                    self.known -= 1;
                }
            } else {
                i += 1;
            }
        }

        if first_removed && !self.arrivals.is_empty() {
            self.arrivals[0] = initial;
        }
        self.known = self.known.max(1).min(self.route.len().max(1));
    }

    /// Replaces the hops `first` and `second` (consecutive) with `merged`.
    pub(crate) fn replace_pair(
        &mut self,
        first: VertexId,
        second: VertexId,
        merged: VertexId,
    ) -> Result<(), NetworkError> {
        let pos = self
            .position_of(first)
            .filter(|pos| self.route.get(pos + 1) == Some(&second))
            .ok_or_else(|| {
                NetworkError::NetworkAction(format!(
                    "{} does not directly follow {} on flow {}",
                    second, first, self.alias
                ))
            })?;
        self.route[pos] = merged;
        self.route.remove(pos + 1);
        self.priorities.remove(pos + 1);
        self.arrivals.remove(pos + 1);
        if pos + 1 < self.known {
            self.known -= 1;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.route.is_empty()
    }
}
