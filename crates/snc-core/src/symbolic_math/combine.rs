//! Combining arrivals with services.
//!
//! `⊕` below is the plain sum for independent operands and the Hölder composition
//! `f(θp)/p + g(θq)/q` for dependent ones, sharing one Hölder ID per combination.

use crate::ids::HoelderId;
use crate::symbolic_math::arrival::{Arrival, Service};
use crate::symbolic_math::function::{HoelderSide, SymbolicFunction};

/// True if the arrival and the service share a source of randomness.
pub fn is_dependent(arrival: &Arrival, service: &Service) -> bool {
    arrival.dependencies.intersects(&service.dependencies)
}

/// `(A.σ ⊕ S.σ) + B(A.ρ ⊕ S.ρ)`, the sigma shared by output, delay and backlog bounds.
pub fn bound_sigma(arrival: &Arrival, service: &Service, hoelder: Option<HoelderId>) -> SymbolicFunction {
    SymbolicFunction::additive(
        SymbolicFunction::compose(arrival.sigma.clone(), service.sigma.clone(), hoelder),
        SymbolicFunction::b_function(combined_rho(arrival, service, hoelder)),
    )
}

/// `A.ρ ⊕ S.ρ`. The vertex is stable for the arrival only if this is negative.
pub fn combined_rho(arrival: &Arrival, service: &Service, hoelder: Option<HoelderId>) -> SymbolicFunction {
    SymbolicFunction::compose(arrival.rho.clone(), service.rho.clone(), hoelder)
}

/// Bound on the departures of a flow after crossing a server.
pub fn output_bound(arrival: &Arrival, service: &Service, hoelder: Option<HoelderId>) -> Arrival {
    let rho = match hoelder {
        Some(id) => SymbolicFunction::scaled(arrival.rho.clone(), id, HoelderSide::P, false),
        None => arrival.rho.clone(),
    };
    Arrival::new(
        bound_sigma(arrival, service, hoelder),
        rho,
        arrival.dependencies.union(&service.dependencies),
    )
}

/// Service left to lower-priority flows once `arrival` has been served.
pub fn leftover_service(arrival: &Arrival, service: &Service, hoelder: Option<HoelderId>) -> Service {
    Service::new(
        SymbolicFunction::compose(arrival.sigma.clone(), service.sigma.clone(), hoelder),
        combined_rho(arrival, service, hoelder),
        arrival.dependencies.union(&service.dependencies),
    )
}

/// Service of two servers in tandem, seen as one server.
///
/// `rho = max(ρ1, ρ2)` and `sigma = σ1 + σ2 + B(min(ρ1 − ρ2, ρ2 − ρ1))`. Servers with
/// identical rates make the B-term overloaded at evaluation time.
pub fn concatenate(first: &Service, second: &Service) -> Service {
    let rho = SymbolicFunction::maximum(first.rho.clone(), second.rho.clone());
    let gap = SymbolicFunction::minimum(
        SymbolicFunction::difference(first.rho.clone(), second.rho.clone()),
        SymbolicFunction::difference(second.rho.clone(), first.rho.clone()),
    );
    let sigma = SymbolicFunction::additive(
        SymbolicFunction::additive(first.sigma.clone(), second.sigma.clone()),
        SymbolicFunction::b_function(gap),
    );
    Service::new(sigma, rho, first.dependencies.union(&second.dependencies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{FlowId, VertexId};
    use crate::symbolic_math::arrival::Dependencies;
    use crate::symbolic_math::errors::MathError;
    use crate::symbolic_math::hoelder::{parameters, Parameters};

    fn arrival(flow: u32, rate: f64) -> Arrival {
        Arrival::new(
            SymbolicFunction::zero(),
            SymbolicFunction::constant(rate),
            Dependencies::of_flow(FlowId(flow)),
        )
    }

    fn service(vertex: u32, rate: f64) -> Service {
        Service::new(
            SymbolicFunction::zero(),
            SymbolicFunction::constant(-rate),
            Dependencies::of_vertex(VertexId(vertex)),
        )
    }

    #[test]
    fn output_of_independent_pair() {
        let a = arrival(1, 1.0);
        let s = service(1, 3.0);
        assert!(!is_dependent(&a, &s));

        let out = output_bound(&a, &s, None);
        let theta: f64 = 0.5;
        let expected_sigma = -(1.0 - (theta * -2.0).exp()).ln() / theta;
        let sigma = out.sigma.value(theta, &Parameters::new()).unwrap();
        assert!((sigma - expected_sigma).abs() < 1e-12);
        assert_eq!(out.rho.value(theta, &Parameters::new()).unwrap(), 1.0);
        assert!(out.dependencies.arrivals.contains(&FlowId(1)));
        assert!(out.dependencies.services.contains(&VertexId(1)));
    }

    #[test]
    fn dependent_output_uses_one_hoelder() {
        let h = HoelderId(1);
        let a = arrival(1, 1.0);
        let s = service(1, 3.0);
        let out = output_bound(&a, &s, Some(h));
        let params = parameters([(h, 2.0)]);
        assert_eq!(out.sigma.parameters().len(), 1);
        assert_eq!(out.rho.parameters().len(), 1);
        assert!(out.evaluate(0.3, 0.0, 0.0, &params).is_ok());
    }

    #[test]
    fn leftover_subtracts_served_rate() {
        let left = leftover_service(&arrival(1, 1.0), &service(1, 3.0), None);
        assert_eq!(left.rho.constant_value(), Some(-2.0));
        assert_eq!(left.constant_rate(), Some(2.0));
    }

    #[test]
    fn concatenation_of_distinct_rates() {
        let joined = concatenate(&service(1, 3.0), &service(2, 5.0));
        assert_eq!(joined.rho.constant_value(), Some(-3.0));
        let theta: f64 = 1.0;
        let expected = -(1.0 - (-2.0 * theta).exp()).ln() / theta;
        let sigma = joined.sigma.value(theta, &Parameters::new()).unwrap();
        assert!((sigma - expected).abs() < 1e-12);
    }

    #[test]
    fn concatenation_of_equal_rates_overloads() {
        let joined = concatenate(&service(1, 3.0), &service(2, 3.0));
        assert!(matches!(
            joined.sigma.value(1.0, &Parameters::new()),
            Err(MathError::ServerOverload(_))
        ));
    }
}
