use snc_core::symbolic_math::{constant_rate_service, poisson_arrival, ArrivalModel, SymbolicFunction};
use snc_core::Network;
use snc_io::{load, read_network, save, write_network, FileOperationError};
use snc_tests::{assert_close, SAMPLE_FILE};

const TOLERANCE: f64 = 1e-9;

fn model_fields(model: ArrivalModel) -> (u8, Vec<f64>) {
    match model {
        ArrivalModel::Constant { rate } => (0, vec![rate]),
        ArrivalModel::Ebb {
            rate,
            decay,
            prefactor,
        } => (1, vec![rate, decay, prefactor]),
        ArrivalModel::Exponential { lambda } => (2, vec![lambda]),
        ArrivalModel::StationaryTb {
            rate,
            bucket,
            max_theta,
        } => (3, vec![rate, bucket, max_theta.unwrap_or(f64::INFINITY)]),
    }
}

/// Compares two networks by alias, rate, route, priority and arrival parameters.
fn assert_equivalent(a: &Network, b: &Network) {
    assert_eq!(a.vertex_count(), b.vertex_count());
    assert_eq!(a.flow_count(), b.flow_count());

    for va in a.vertices() {
        let vb = b.vertex_by_alias(va.alias()).expect("vertex survives");
        assert_close(
            va.service().constant_rate().unwrap(),
            vb.service().constant_rate().unwrap(),
            TOLERANCE,
        );
    }

    for fa in a.flows() {
        let fb = b.flow_by_alias(fa.alias()).expect("flow survives");
        let route = |n: &Network, route: &[snc_core::VertexId]| -> Vec<String> {
            route
                .iter()
                .map(|v| n.vertex(*v).unwrap().alias().to_string())
                .collect()
        };
        assert_eq!(route(a, fa.route()), route(b, fb.route()));
        assert_eq!(fa.priorities(), fb.priorities());

        let ma = ArrivalModel::recognize(fa.initial_arrival().unwrap()).unwrap();
        let mb = ArrivalModel::recognize(fb.initial_arrival().unwrap()).unwrap();
        let (kind_a, params_a) = model_fields(ma);
        let (kind_b, params_b) = model_fields(mb);
        assert_eq!(kind_a, kind_b);
        for (x, y) in params_a.iter().zip(&params_b) {
            if x.is_finite() || y.is_finite() {
                assert_close(*x, *y, TOLERANCE);
            }
        }
    }
}

#[test]
fn sample_file_round_trips() {
    let original = read_network(SAMPLE_FILE).unwrap();
    let text = write_network(&original).unwrap();
    let reloaded = read_network(&text).unwrap();
    assert_equivalent(&original, &reloaded);

    // Writing is stable once comments and blank lines are gone
    assert_eq!(write_network(&reloaded).unwrap(), text);
}

#[test]
fn save_and_load_through_the_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network.snc");

    let original = read_network(SAMPLE_FILE).unwrap();
    save(&original, &path).unwrap();
    let reloaded = load(&path).unwrap();
    assert_equivalent(&original, &reloaded);
}

#[test]
fn fractional_parameters_survive_the_round_trip() {
    let text = "\
I a, FIFO, CR, 3.3333333333333335
EOI
F x, 1, a:7, EBB, 0.1, 1e-3, 2.5
F y, 1, a:-1, STATIONARYTB, 0.2, 0.125
EOF
";
    let original = read_network(text).unwrap();
    let reloaded = read_network(&write_network(&original).unwrap()).unwrap();
    assert_equivalent(&original, &reloaded);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load(dir.path().join("absent.snc"));
    assert!(matches!(result, Err(FileOperationError::Io(_))));
}

#[test]
fn poisson_arrivals_cannot_be_written() {
    let mut network = Network::new();
    let v = network.add_vertex(constant_rate_service(5.0).unwrap(), "v");
    let increment = SymbolicFunction::constant(1.0);
    network
        .add_flow(poisson_arrival(2.0, increment).unwrap(), &[v], &[0], "p")
        .unwrap();
    assert!(matches!(
        write_network(&network),
        Err(FileOperationError::Unsupported(_))
    ));
}

#[test]
fn parse_errors_report_their_line() {
    let text = "I a, FIFO, CR, 1\nEOI\nF f, 1, b:0, CONSTANT, 0.5\nEOF\n";
    match read_network(text) {
        Err(FileOperationError::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected a parse error, got {:?}", other),
    }
}
