//! Arrival and service bounds.
//!
//! Both are a `(sigma, rho)` pair: the MGF of the cumulative process over an interval of
//! length `t` is bounded by `exp(θ·(σ(θ) + t·ρ(θ)))`. Services store a negative rho.

use std::collections::BTreeSet;
use std::fmt;

use crate::ids::{FlowId, HoelderId, VertexId};
use crate::symbolic_math::errors::MathError;
use crate::symbolic_math::function::SymbolicFunction;
use crate::symbolic_math::hoelder::Parameters;

/// Sources of randomness contained in a bound.
///
/// Two bounds are statistically dependent when they share a flow or a vertex.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    pub arrivals: BTreeSet<FlowId>,
    pub services: BTreeSet<VertexId>,
}

impl Dependencies {
    pub fn of_flow(flow: FlowId) -> Self {
        Self {
            arrivals: [flow].into_iter().collect(),
            services: BTreeSet::new(),
        }
    }

    pub fn of_vertex(vertex: VertexId) -> Self {
        Self {
            arrivals: BTreeSet::new(),
            services: [vertex].into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty() && self.services.is_empty()
    }

    /// True if both sets share at least one flow or vertex.
    pub fn intersects(&self, other: &Dependencies) -> bool {
        !self.arrivals.is_disjoint(&other.arrivals) || !self.services.is_disjoint(&other.services)
    }

    pub fn union(&self, other: &Dependencies) -> Dependencies {
        Dependencies {
            arrivals: self.arrivals.union(&other.arrivals).copied().collect(),
            services: self.services.union(&other.services).copied().collect(),
        }
    }
}

/// Bound on the arrivals of a flow at some point of its route.
#[derive(Debug, Clone)]
pub struct Arrival {
    pub sigma: SymbolicFunction,
    pub rho: SymbolicFunction,
    pub dependencies: Dependencies,
}

impl Arrival {
    pub fn new(sigma: SymbolicFunction, rho: SymbolicFunction, dependencies: Dependencies) -> Self {
        Self {
            sigma,
            rho,
            dependencies,
        }
    }

    /// Largest theta at which both sigma and rho are defined.
    pub fn theta_star(&self) -> f64 {
        self.sigma.max_theta().min(self.rho.max_theta())
    }

    /// Parameters of sigma and rho together.
    pub fn parameters(&self) -> BTreeSet<HoelderId> {
        self.sigma
            .parameters()
            .union(self.rho.parameters())
            .copied()
            .collect()
    }

    /// `exp(θ·(σ(θ) + delay·ρ(θ) − backlog))`.
    ///
    /// With the sigma/rho of a final bound this is the violation probability of the
    /// given delay and backlog. `params` must cover the parameters of both terms.
    pub fn evaluate(
        &self,
        theta: f64,
        delay: f64,
        backlog: f64,
        params: &Parameters,
    ) -> Result<f64, MathError> {
        let expected = self.parameters();
        if expected.len() != params.len() {
            return Err(MathError::ParameterMismatch(format!(
                "expected {} parameter(s), got {}",
                expected.len(),
                params.len()
            )));
        }
        let sigma = self.sigma.value_within(theta, params)?;
        let rho = self.rho.value_within(theta, params)?;
        Ok((theta * (sigma + delay * rho - backlog)).exp())
    }
}

impl fmt::Display for Arrival {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sigma: {}, rho: {}", self.sigma, self.rho)
    }
}

/// Bound on the service a vertex offers. Rho is negative for a stable server.
#[derive(Debug, Clone)]
pub struct Service {
    pub sigma: SymbolicFunction,
    pub rho: SymbolicFunction,
    pub dependencies: Dependencies,
}

impl Service {
    pub fn new(sigma: SymbolicFunction, rho: SymbolicFunction, dependencies: Dependencies) -> Self {
        Self {
            sigma,
            rho,
            dependencies,
        }
    }

    pub fn theta_star(&self) -> f64 {
        self.sigma.max_theta().min(self.rho.max_theta())
    }

    /// Guaranteed rate when sigma and rho are theta-independent (`-rho`).
    pub fn constant_rate(&self) -> Option<f64> {
        match (self.sigma.constant_value(), self.rho.constant_value()) {
            (Some(sigma), Some(rho)) if sigma == 0.0 => Some(-rho),
            _ => None,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sigma: {}, rho: {}", self.sigma, self.rho)
    }
}
