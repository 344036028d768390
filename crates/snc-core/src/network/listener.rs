//! Change notifications for observers of a [`Network`](super::Network).

use crate::ids::{FlowId, VertexId};

/// Observer of network mutations.
///
/// Callbacks run synchronously after the mutation has been applied and cannot veto it.
/// Every method defaults to a no-op so observers implement only what they need.
pub trait NetworkListener {
    fn vertex_added(&self, _vertex: VertexId) {}
    fn vertex_removed(&self, _vertex: VertexId) {}
    fn vertex_changed(&self, _vertex: VertexId) {}
    fn flow_added(&self, _flow: FlowId) {}
    fn flow_removed(&self, _flow: FlowId) {}
    fn flow_changed(&self, _flow: FlowId) {}
    fn cleared(&self) {}
}
