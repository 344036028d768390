use std::cell::RefCell;
use std::rc::Rc;

use snc_core::network::{NetworkListener, ServeOutcome};
use snc_core::symbolic_math::{constant_rate_arrival, constant_rate_service, ebb_arrival};
use snc_core::{
    analyze, AnalysisType, BoundType, Calculator, FlowId, Network, NetworkError, VertexId,
};
use snc_tests::{ebb_tandem, shared_upstream, tandem};

#[derive(Default)]
struct Log {
    events: RefCell<Vec<String>>,
}

impl NetworkListener for Log {
    fn vertex_added(&self, vertex: VertexId) {
        self.events.borrow_mut().push(format!("+{}", vertex));
    }
    fn vertex_removed(&self, vertex: VertexId) {
        self.events.borrow_mut().push(format!("-{}", vertex));
    }
    fn flow_added(&self, flow: FlowId) {
        self.events.borrow_mut().push(format!("+{}", flow));
    }
    fn flow_removed(&self, flow: FlowId) {
        self.events.borrow_mut().push(format!("-{}", flow));
    }
    fn flow_changed(&self, flow: FlowId) {
        self.events.borrow_mut().push(format!("~{}", flow));
    }
    fn cleared(&self) {
        self.events.borrow_mut().push("clear".to_string());
    }
}

#[test]
fn serve_with_unknown_arrival_leaves_vertex_unchanged() {
    let (mut network, [a, b], [_, v2]) = shared_upstream();
    let before = network.vertex(v2).unwrap().flows().len();

    assert!(matches!(network.serve_vertex(v2), Ok(ServeOutcome::NotReady)));
    assert!(matches!(
        network.compute_leftover_service(v2),
        Err(NetworkError::ArrivalNotAvailable { vertex, .. }) if vertex == v2
    ));

    let vertex = network.vertex(v2).unwrap();
    assert_eq!(vertex.flows().len(), before);
    assert!(vertex.arrival_of(a).is_none());
    assert!(vertex.arrival_of(b).is_none());
    assert!(network.hoelders().is_empty());
}

#[test]
fn serving_in_route_order_forwards_every_output() {
    let (mut network, [a, b], [v1, v2]) = shared_upstream();

    assert_eq!(network.compute_leftover_service(v1).unwrap(), (a, Some(v2)));
    assert_eq!(network.compute_leftover_service(v1).unwrap(), (b, Some(v2)));
    assert!(network.vertex(v2).unwrap().can_serve());

    assert_eq!(network.compute_leftover_service(v2).unwrap(), (a, None));
    assert_eq!(network.compute_leftover_service(v2).unwrap(), (b, None));
    assert_eq!(network.hoelders().len(), 1);
    assert!(network.vertex(v2).unwrap().flows().is_empty());
}

#[test]
fn convoluted_tandem_can_still_be_analyzed() {
    let mut t = tandem(&[5.0, 4.0], ebb_arrival(1.0, 2.0, 1.0).unwrap());
    let (v1, v2) = (t.vertices[0], t.vertices[1]);
    assert!(t.network.are_convolutable(v1, v2, t.flow));

    let merged = t.network.convolute(v1, v2, t.flow).unwrap();
    assert_eq!(t.network.vertex(merged).unwrap().alias(), "v1+v2");
    assert_eq!(t.network.flow(t.flow).unwrap().route(), &[merged][..]);

    let bound = analyze(t.flow, merged, AnalysisType::Simple, BoundType::Delay, &t.network).unwrap();
    assert_eq!(bound.rho.constant_value(), Some(-4.0));
}

#[test]
fn shared_vertices_are_not_convolutable() {
    let (mut network, [a, _], [v1, v2]) = shared_upstream();
    assert!(!network.are_convolutable(v1, v2, a));
    assert!(matches!(
        network.convolute(v1, v2, a),
        Err(NetworkError::NetworkAction(_))
    ));
}

#[test]
fn removing_the_first_hop_moves_the_initial_arrival() {
    let mut t = ebb_tandem();
    let [v1, v2, v3] = [t.vertices[0], t.vertices[1], t.vertices[2]];
    t.network.remove_vertex(v1).unwrap();

    let flow = t.network.flow(t.flow).unwrap();
    assert_eq!(flow.route(), &[v2, v3][..]);
    assert!(t.network.vertex(v2).unwrap().arrival_of(t.flow).is_some());

    let bound = analyze(t.flow, v3, AnalysisType::Simple, BoundType::Output, &t.network).unwrap();
    assert!(!bound.dependencies.services.contains(&v1));
}

#[test]
fn listeners_follow_the_calculator_network() {
    let log = Rc::new(Log::default());
    let mut calculator = Calculator::new();
    calculator.add_listener(log.clone());

    let network = calculator.network_mut();
    let v1 = network.add_vertex(constant_rate_service(3.0).unwrap(), "v1");
    let f = network
        .add_flow(constant_rate_arrival(1.0).unwrap(), &[v1], &[0], "f")
        .unwrap();
    network.remove_vertex(v1).unwrap();
    assert_eq!(
        log.events.take(),
        vec![
            format!("+{}", v1),
            format!("+{}", f),
            format!("-{}", f),
            format!("-{}", v1)
        ]
    );

    calculator.set_network(Network::new());
    calculator
        .network_mut()
        .add_vertex(constant_rate_service(1.0).unwrap(), "w");
    calculator.network_mut().clear();
    assert_eq!(log.events.take(), vec!["+v1".to_string(), "clear".to_string()]);
}

#[test]
fn deep_copy_does_not_share_listeners_or_state() {
    let log = Rc::new(Log::default());
    let mut t = ebb_tandem();
    t.network.add_listener(log.clone());

    let mut copy = t.network.deep_copy();
    copy.remove_flow(t.flow).unwrap();

    assert!(log.events.borrow().is_empty());
    assert_eq!(t.network.flow_count(), 1);
    assert_eq!(copy.flow_count(), 0);
}
