//! Objectives for the optimizer.
//!
//! Each bound wraps the symbolic [`Arrival`] produced by the analysis together with a
//! target and evaluates to a scalar at one point `(θ, Hölder exponents)`. The optimizer
//! minimises that scalar.

use crate::analysis::{AnalysisError, BoundType};
use crate::ids::HoelderId;
use crate::optimization::config::OptimizerConfig;
use crate::symbolic_math::{Arrival, Hoelder, MathError, Parameters};

/// A scalar objective over theta and the searchable Hölder exponents.
pub trait Optimizable {
    /// Objective value at one point. Errors mark the point infeasible.
    fn evaluate(&self, theta: f64, params: &Parameters) -> Result<f64, MathError>;

    /// Hölder exponents the optimizer has to search, in ascending order.
    fn hoelder_ids(&self) -> Vec<HoelderId>;

    /// Upper end of the theta domain (possibly infinite).
    fn maximum_theta(&self) -> f64;
}

fn searchable_ids(arrival: &Arrival) -> Vec<HoelderId> {
    let backlog = arrival.sigma.new_parameters();
    arrival
        .parameters()
        .into_iter()
        .filter(|id| !backlog.contains(id))
        .collect()
}

/// Backlog variable of a backlog bound, if the analysis introduced one.
fn backlog_id(arrival: &Arrival) -> Option<HoelderId> {
    arrival.sigma.new_parameters().iter().next().copied()
}

/// Violation probability `exp(θ·(σ + delay·ρ − backlog))` with the backlog either bound to
/// the backlog variable or subtracted directly.
fn violation_probability(
    arrival: &Arrival,
    theta: f64,
    params: &Parameters,
    delay: f64,
    backlog: f64,
) -> Result<f64, MathError> {
    match backlog_id(arrival) {
        Some(id) => {
            let mut full = params.clone();
            full.insert(id, Hoelder::new(id, backlog));
            arrival.evaluate(theta, delay, 0.0, &full)
        }
        None => arrival.evaluate(theta, delay, backlog, params),
    }
}

/// Probability that the backlog exceeds `backlog`.
pub struct BacklogBound {
    arrival: Arrival,
    backlog: f64,
}

impl BacklogBound {
    pub fn new(arrival: Arrival, backlog: f64) -> Self {
        Self { arrival, backlog }
    }
}

impl Optimizable for BacklogBound {
    fn evaluate(&self, theta: f64, params: &Parameters) -> Result<f64, MathError> {
        violation_probability(&self.arrival, theta, params, 0.0, self.backlog).map(|p| p.min(1.0))
    }

    fn hoelder_ids(&self) -> Vec<HoelderId> {
        searchable_ids(&self.arrival)
    }

    fn maximum_theta(&self) -> f64 {
        self.arrival.theta_star()
    }
}

/// Probability that the delay exceeds `delay`.
pub struct DelayBound {
    arrival: Arrival,
    delay: f64,
}

impl DelayBound {
    pub fn new(arrival: Arrival, delay: f64) -> Self {
        Self { arrival, delay }
    }
}

impl Optimizable for DelayBound {
    fn evaluate(&self, theta: f64, params: &Parameters) -> Result<f64, MathError> {
        violation_probability(&self.arrival, theta, params, self.delay, 0.0).map(|p| p.min(1.0))
    }

    fn hoelder_ids(&self) -> Vec<HoelderId> {
        searchable_ids(&self.arrival)
    }

    fn maximum_theta(&self) -> f64 {
        self.arrival.theta_star()
    }
}

/// Smallest backlog exceeded with probability at most `epsilon`.
pub struct InverseBacklogBound {
    arrival: Arrival,
    epsilon: f64,
    config: OptimizerConfig,
}

impl InverseBacklogBound {
    pub fn new(arrival: Arrival, epsilon: f64, config: OptimizerConfig) -> Self {
        Self {
            arrival,
            epsilon,
            config,
        }
    }
}

impl Optimizable for InverseBacklogBound {
    fn evaluate(&self, theta: f64, params: &Parameters) -> Result<f64, MathError> {
        smallest_target(self.epsilon, &self.config, |backlog| {
            violation_probability(&self.arrival, theta, params, 0.0, backlog)
        })
    }

    fn hoelder_ids(&self) -> Vec<HoelderId> {
        searchable_ids(&self.arrival)
    }

    fn maximum_theta(&self) -> f64 {
        self.arrival.theta_star()
    }
}

/// Smallest delay exceeded with probability at most `epsilon`.
pub struct InverseDelayBound {
    arrival: Arrival,
    epsilon: f64,
    config: OptimizerConfig,
}

impl InverseDelayBound {
    pub fn new(arrival: Arrival, epsilon: f64, config: OptimizerConfig) -> Self {
        Self {
            arrival,
            epsilon,
            config,
        }
    }
}

impl Optimizable for InverseDelayBound {
    fn evaluate(&self, theta: f64, params: &Parameters) -> Result<f64, MathError> {
        smallest_target(self.epsilon, &self.config, |delay| {
            violation_probability(&self.arrival, theta, params, delay, 0.0)
        })
    }

    fn hoelder_ids(&self) -> Vec<HoelderId> {
        searchable_ids(&self.arrival)
    }

    fn maximum_theta(&self) -> f64 {
        self.arrival.theta_star()
    }
}

/// Smallest `x ≥ 0` with `probability(x) ≤ epsilon`, for `probability` non-increasing in `x`.
///
/// Brackets the target by doubling, then bisects to the configured relative tolerance.
fn smallest_target<F>(epsilon: f64, config: &OptimizerConfig, probability: F) -> Result<f64, MathError>
where
    F: Fn(f64) -> Result<f64, MathError>,
{
    if probability(0.0)? <= epsilon {
        return Ok(0.0);
    }

    let mut low = 0.0;
    let mut high = 1.0;
    let mut bracketed = false;
    for _ in 0..config.max_bisection_iterations {
        if probability(high)? <= epsilon {
            bracketed = true;
            break;
        }
        low = high;
        high *= 2.0;
    }
    if !bracketed {
        return Err(MathError::ServerOverload(format!(
            "violation probability stays above {} for every target up to {}",
            epsilon, high
        )));
    }

    for _ in 0..config.max_bisection_iterations {
        if high - low <= config.bisection_tolerance * high.max(1.0) {
            break;
        }
        let mid = 0.5 * (low + high);
        if probability(mid)? <= epsilon {
            high = mid;
        } else {
            low = mid;
        }
    }
    Ok(high)
}

/// Wraps an analysed arrival into the objective for `bound_type`.
///
/// `target` is the backlog or delay for direct bounds and the violation probability for
/// inverse bounds. Output bounds cannot be optimised.
pub fn create_bound(
    bound_type: BoundType,
    arrival: Arrival,
    target: f64,
    config: OptimizerConfig,
) -> Result<Box<dyn Optimizable>, AnalysisError> {
    match bound_type {
        BoundType::Backlog | BoundType::Delay => {
            if !(target >= 0.0 && target.is_finite()) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "{:?} target must be finite and >= 0, got {}",
                    bound_type, target
                )));
            }
        }
        BoundType::InverseBacklog | BoundType::InverseDelay => {
            if !(target > 0.0 && target < 1.0) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "violation probability must lie in (0, 1), got {}",
                    target
                )));
            }
        }
        BoundType::Output => {
            return Err(AnalysisError::InvalidConfig(
                "output bounds cannot be optimized".into(),
            ))
        }
    }

    Ok(match bound_type {
        BoundType::Backlog => Box::new(BacklogBound::new(arrival, target)),
        BoundType::Delay => Box::new(DelayBound::new(arrival, target)),
        BoundType::InverseBacklog => Box::new(InverseBacklogBound::new(arrival, target, config)),
        _ => Box::new(InverseDelayBound::new(arrival, target, config)),
    })
}
