use snc_core::symbolic_math::{
    constant_rate_arrival, constant_rate_service, parameters, ArrivalModel,
};
use snc_core::{
    analyze, AnalysisError, AnalysisType, BoundType, Calculator, FlowId, Network, VertexId,
};
use snc_tests::{cyclic, ebb_tandem, shared_upstream, tandem, SAMPLE_FILE};

#[test]
fn tandem_backlog_bound_is_finite_with_zero_rho() {
    let t = ebb_tandem();
    let bound = analyze(
        t.flow,
        t.last(),
        AnalysisType::Simple,
        BoundType::Backlog,
        &t.network,
    )
    .unwrap();

    assert_eq!(bound.rho.constant_value(), Some(0.0));
    let ids: Vec<_> = bound.parameters().into_iter().collect();
    assert_eq!(ids.len(), 1, "only the backlog variable is free");

    let value = bound
        .evaluate(0.5, 0.0, 0.0, &parameters([(ids[0], 5.0)]))
        .unwrap();
    assert!(value.is_finite() && !value.is_nan());
    assert!(value > 0.0);
}

#[test]
fn tandem_delay_rho_is_the_last_service_rate() {
    let t = ebb_tandem();
    let bound = analyze(t.flow, t.last(), AnalysisType::Simple, BoundType::Delay, &t.network)
        .unwrap();
    assert_eq!(bound.rho.constant_value(), Some(-3.0));
    assert!(bound.parameters().is_empty());
}

#[test]
fn tandem_output_keeps_the_arrival_rate() {
    let t = ebb_tandem();
    let bound = analyze(t.flow, t.last(), AnalysisType::Simple, BoundType::Output, &t.network)
        .unwrap();
    assert_eq!(bound.rho.constant_value(), Some(1.0));
    assert!(bound.dependencies.arrivals.contains(&t.flow));
    for vertex in &t.vertices {
        assert!(bound.dependencies.services.contains(vertex));
    }
}

#[test]
fn cyclic_network_deadlocks() {
    let (network, [a, _], [_, v2]) = cyclic();
    let result = analyze(a, v2, AnalysisType::Simple, BoundType::Backlog, &network);
    assert!(matches!(result, Err(AnalysisError::Deadlock(_))));
}

#[test]
fn shared_upstream_server_introduces_one_hoelder() {
    let (network, [_, b], [_, v2]) = shared_upstream();
    let bound = analyze(b, v2, AnalysisType::Simple, BoundType::Delay, &network).unwrap();
    assert_eq!(bound.parameters().len(), 1);
}

#[test]
fn independent_flows_need_no_hoelder() {
    let (network, [a, _], [v1, _]) = shared_upstream();
    let bound = analyze(a, v1, AnalysisType::Simple, BoundType::Delay, &network).unwrap();
    assert!(bound.parameters().is_empty());
}

#[test]
fn analysis_does_not_touch_the_network() {
    let (network, [_, b], [_, v2]) = shared_upstream();
    analyze(b, v2, AnalysisType::Simple, BoundType::Backlog, &network).unwrap();

    let vertex = network.vertex(v2).unwrap();
    assert_eq!(vertex.flows().len(), 2);
    assert!(vertex.arrival_of(b).is_none());
    assert!(network.hoelders().is_empty());
}

#[test]
fn unreachable_point_of_interest_deadlocks() {
    let t = ebb_tandem();
    let missing_flow = analyze(FlowId(99), t.last(), AnalysisType::Simple, BoundType::Delay, &t.network);
    assert!(matches!(missing_flow, Err(AnalysisError::Deadlock(_))));

    let missing_vertex = analyze(t.flow, VertexId(99), AnalysisType::Simple, BoundType::Delay, &t.network);
    assert!(matches!(missing_vertex, Err(AnalysisError::Deadlock(_))));
}

#[test]
fn vertex_off_the_flow_route_deadlocks() {
    let mut network = Network::new();
    let v1 = network.add_vertex(constant_rate_service(5.0).unwrap(), "v1");
    let v2 = network.add_vertex(constant_rate_service(5.0).unwrap(), "v2");
    let f = network
        .add_flow(constant_rate_arrival(1.0).unwrap(), &[v1], &[0], "f")
        .unwrap();

    let result = analyze(f, v2, AnalysisType::Simple, BoundType::Delay, &network);
    assert!(matches!(result, Err(AnalysisError::Deadlock(_))));
}

#[test]
fn overloaded_server_is_reported() {
    let t = tandem(&[1.0, 5.0], constant_rate_arrival(2.0).unwrap());
    let result = analyze(t.flow, t.last(), AnalysisType::Simple, BoundType::Backlog, &t.network);
    assert!(matches!(result, Err(AnalysisError::ServerOverload(_))));
}

#[test]
fn loaded_network_can_be_analyzed_at_every_hop() {
    let mut calculator = Calculator::new();
    calculator.set_network(snc_io::read_network(SAMPLE_FILE).unwrap());
    let network = calculator.network();

    for flow in network.flows() {
        for vertex in flow.route() {
            let bound = calculator
                .analyze(flow.id(), *vertex, AnalysisType::Simple, BoundType::Output)
                .unwrap();
            assert!(bound.dependencies.arrivals.contains(&flow.id()));
        }
    }

    let f3 = network.flow_by_alias("f3").unwrap();
    assert_eq!(
        f3.initial_arrival().and_then(ArrivalModel::recognize),
        Some(ArrivalModel::Exponential { lambda: 4.0 })
    );
}
