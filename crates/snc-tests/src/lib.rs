//! Shared network fixtures for the integration and property tests.

use snc_core::symbolic_math::{constant_rate_arrival, constant_rate_service, ebb_arrival, Arrival};
use snc_core::{FlowId, Network, VertexId};

/// A network file with every arrival model the format supports.
pub const SAMPLE_FILE: &str = "\
# three servers in tandem with cross traffic
I v1, FIFO, CR, 10
I v2, FIFO, CR, 8
I v3, FIFO, CR, 6

EOI
F f1, 3, v1:0, v2:0, v3:0, EBB, 1, 2, 0.5
F f2, 2, v1:1, v2:1, CONSTANT, 0.5
F f3, 1, v3:0, EXPONENTIAL, 4
F f4, 2, v2:2, v3:1, STATIONARYTB, 0.25, 2, 8
EOF
";

/// A network with a single flow crossing `rates.len()` constant-rate servers.
pub struct Tandem {
    pub network: Network,
    pub flow: FlowId,
    pub vertices: Vec<VertexId>,
}

impl Tandem {
    pub fn last(&self) -> VertexId {
        self.vertices[self.vertices.len() - 1]
    }
}

pub fn tandem(rates: &[f64], arrival: Arrival) -> Tandem {
    let mut network = Network::new();
    let vertices: Vec<VertexId> = rates
        .iter()
        .enumerate()
        .map(|(i, rate)| {
            network.add_vertex(
                constant_rate_service(*rate).expect("positive rate"),
                format!("v{}", i + 1),
            )
        })
        .collect();
    let priorities = vec![0; vertices.len()];
    let flow = network
        .add_flow(arrival, &vertices, &priorities, "f")
        .expect("valid route");
    Tandem {
        network,
        flow,
        vertices,
    }
}

/// Three servers at rates 5, 4 and 3 crossed by an EBB flow of rate 1.
pub fn ebb_tandem() -> Tandem {
    tandem(
        &[5.0, 4.0, 3.0],
        ebb_arrival(1.0, 2.0, 1.0).expect("valid EBB arrival"),
    )
}

/// Two flows `a` and `b` crossing `v1` then `v2`, so that `b` meets the leftover of `a`
/// twice.
pub fn shared_upstream() -> (Network, [FlowId; 2], [VertexId; 2]) {
    let mut network = Network::new();
    let v1 = network.add_vertex(constant_rate_service(10.0).expect("positive rate"), "v1");
    let v2 = network.add_vertex(constant_rate_service(8.0).expect("positive rate"), "v2");
    let a = network
        .add_flow(ebb_arrival(1.0, 3.0, 1.0).expect("valid"), &[v1, v2], &[0, 0], "a")
        .expect("valid route");
    let b = network
        .add_flow(ebb_arrival(2.0, 3.0, 1.0).expect("valid"), &[v1, v2], &[0, 0], "b")
        .expect("valid route");
    (network, [a, b], [v1, v2])
}

/// Two flows crossing the same two servers in opposite directions.
pub fn cyclic() -> (Network, [FlowId; 2], [VertexId; 2]) {
    let mut network = Network::new();
    let v1 = network.add_vertex(constant_rate_service(10.0).expect("positive rate"), "v1");
    let v2 = network.add_vertex(constant_rate_service(10.0).expect("positive rate"), "v2");
    let a = network
        .add_flow(constant_rate_arrival(1.0).expect("valid"), &[v1, v2], &[0, 0], "a")
        .expect("valid route");
    let b = network
        .add_flow(constant_rate_arrival(1.0).expect("valid"), &[v2, v1], &[0, 0], "b")
        .expect("valid route");
    (network, [a, b], [v1, v2])
}

/// Asserts `a` and `b` agree to within `tol`, relative to their magnitude.
pub fn assert_close(a: f64, b: f64, tol: f64) {
    let scale = a.abs().max(b.abs()).max(1.0);
    assert!(
        (a - b).abs() <= tol * scale,
        "expected {} to be within {} of {}",
        a,
        tol,
        b
    );
}
