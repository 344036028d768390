use snc_core::symbolic_math::{constant_rate_arrival, exponential_arrival};
use snc_core::{
    optimize, optimize_with_config, AnalysisError, AnalysisType, BoundType, OptimizationType,
    OptimizerConfig,
};
use snc_tests::{assert_close, ebb_tandem, shared_upstream, tandem, SAMPLE_FILE};

const THETA_STEP: f64 = 0.1;
const HOELDER_STEP: f64 = 0.5;

fn single_server_delay(delay: f64, optimizer: OptimizationType) -> f64 {
    let t = tandem(&[5.0], constant_rate_arrival(1.0).unwrap());
    optimize(
        t.flow,
        t.last(),
        THETA_STEP,
        HOELDER_STEP,
        AnalysisType::Simple,
        optimizer,
        BoundType::Delay,
        delay,
        &t.network,
    )
    .unwrap()
}

#[test]
fn delay_bound_does_not_increase_with_the_delay() {
    let delays = [0.0, 0.05, 0.1, 0.5, 1.0, 2.0];
    for optimizer in [OptimizationType::Simple, OptimizationType::Gradient] {
        let values: Vec<f64> = delays
            .iter()
            .map(|d| single_server_delay(*d, optimizer))
            .collect();
        for pair in values.windows(2) {
            assert!(pair[1] <= pair[0], "{:?}: {:?}", optimizer, values);
        }
        assert!(values.iter().all(|p| *p > 0.0 && *p <= 1.0));
    }
}

#[test]
fn backlog_bound_does_not_increase_with_the_backlog() {
    let t = ebb_tandem();
    let mut previous = f64::INFINITY;
    for backlog in [0.0, 1.0, 2.0, 5.0, 10.0] {
        let p = optimize(
            t.flow,
            t.last(),
            THETA_STEP,
            HOELDER_STEP,
            AnalysisType::Simple,
            OptimizationType::Simple,
            BoundType::Backlog,
            backlog,
            &t.network,
        )
        .unwrap();
        assert!(p <= previous);
        assert!(p > 0.0 && p <= 1.0);
        previous = p;
    }
    assert!(previous < 1.0);
}

#[test]
fn inverse_delay_meets_its_violation_probability() {
    let t = tandem(&[5.0], constant_rate_arrival(1.0).unwrap());
    let epsilon = 1e-3;
    let delay = optimize(
        t.flow,
        t.last(),
        THETA_STEP,
        HOELDER_STEP,
        AnalysisType::Simple,
        OptimizationType::Simple,
        BoundType::InverseDelay,
        epsilon,
        &t.network,
    )
    .unwrap();
    assert!(delay > 0.0);

    let probability = single_server_delay(delay, OptimizationType::Simple);
    assert!(probability <= epsilon, "{} > {}", probability, epsilon);
}

#[test]
fn inverse_backlog_is_monotone_in_the_probability() {
    let t = ebb_tandem();
    let backlog = |epsilon: f64| {
        optimize(
            t.flow,
            t.last(),
            THETA_STEP,
            HOELDER_STEP,
            AnalysisType::Simple,
            OptimizationType::Simple,
            BoundType::InverseBacklog,
            epsilon,
            &t.network,
        )
        .unwrap()
    };
    let loose = backlog(1e-2);
    let tight = backlog(1e-6);
    assert!(loose > 0.0);
    assert!(tight > loose);
}

#[test]
fn gradient_search_is_close_to_the_exhaustive_search() {
    let (network, [_, b], [_, v2]) = shared_upstream();
    let run = |optimizer| {
        optimize(
            b,
            v2,
            THETA_STEP,
            HOELDER_STEP,
            AnalysisType::Simple,
            optimizer,
            BoundType::Backlog,
            20.0,
            &network,
        )
        .unwrap()
    };
    let exhaustive = run(OptimizationType::Simple);
    let descent = run(OptimizationType::Gradient);
    assert!(exhaustive > 0.0 && exhaustive <= 1.0);
    assert!(descent > 0.0 && descent <= 1.0);
    assert!(descent >= exhaustive);
    assert_close(descent.log10(), exhaustive.log10(), 0.5);
}

#[test]
fn loaded_network_is_optimizable() {
    let network = snc_io::read_network(SAMPLE_FILE).unwrap();
    let f1 = network.flow_by_alias("f1").unwrap().id();
    let v3 = network.vertex_by_alias("v3").unwrap().id();

    let p = optimize(
        f1,
        v3,
        0.05,
        1.0,
        AnalysisType::Simple,
        OptimizationType::Gradient,
        BoundType::Backlog,
        10.0,
        &network,
    )
    .unwrap();
    assert!(p > 0.0 && p <= 1.0);
}

#[test]
fn unstable_server_has_no_feasible_point() {
    let t = tandem(&[0.1], exponential_arrival(1.0).unwrap());
    let result = optimize(
        t.flow,
        t.last(),
        THETA_STEP,
        HOELDER_STEP,
        AnalysisType::Simple,
        OptimizationType::Simple,
        BoundType::Delay,
        1.0,
        &t.network,
    );
    assert!(matches!(result, Err(AnalysisError::NoFeasiblePoint(_))));
}

#[test]
fn invalid_requests_are_rejected() {
    let t = ebb_tandem();
    let request = |bound, target, theta_step, config| {
        optimize_with_config(
            t.flow,
            t.last(),
            theta_step,
            HOELDER_STEP,
            AnalysisType::Simple,
            OptimizationType::Simple,
            bound,
            target,
            &t.network,
            config,
        )
    };
    let defaults = OptimizerConfig::default();

    for (bound, target, step) in [
        (BoundType::Backlog, -1.0, THETA_STEP),
        (BoundType::InverseDelay, 1.5, THETA_STEP),
        (BoundType::Output, 1.0, THETA_STEP),
        (BoundType::Delay, 1.0, 0.0),
    ] {
        assert!(matches!(
            request(bound, target, step, defaults),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    let broken = OptimizerConfig {
        max_hoelder: 1.0,
        ..defaults
    };
    assert!(matches!(
        request(BoundType::Delay, 1.0, THETA_STEP, broken),
        Err(AnalysisError::InvalidConfig(_))
    ));
}
