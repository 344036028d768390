//! # Bound Optimization
//!
//! Minimises an [`Optimizable`] bound over theta and the Hölder exponents introduced by
//! the analysis.
//!
//! ## Search space
//!
//! - theta on the grid `k·Δθ`, `k ≥ 1`, strictly below the bound's maximum theta (or up to
//!   [`OptimizerConfig::theta_cap`] when theta is unbounded)
//! - each Hölder exponent on the grid `1 + k·Δp`, `k ≥ 1`, up to
//!   [`OptimizerConfig::max_hoelder`]
//!
//! Points where evaluation fails (theta out of bound, overloaded B-term, invalid exponent)
//! or yields NaN are skipped. A search without a single feasible point fails with
//! [`AnalysisError::NoFeasiblePoint`].

pub mod bounds;
pub mod config;
pub mod gradient;
pub mod simple;

pub use bounds::{
    create_bound, BacklogBound, DelayBound, InverseBacklogBound, InverseDelayBound, Optimizable,
};
pub use config::OptimizerConfig;
pub use gradient::GradientOptimizer;
pub use simple::SimpleOptimizer;

use crate::analysis::AnalysisError;
use crate::ids::HoelderId;
use crate::symbolic_math::{parameters, Parameters};

/// Available optimization strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptimizationType {
    /// Exhaustive grid search.
    #[default]
    Simple,
    /// Coordinate descent on the grid.
    Gradient,
}

/// A strategy minimising a bound over its parameters.
pub trait Optimizer {
    /// Smallest value of `bound` found on the grid defined by the granularities.
    fn minimize(
        &self,
        bound: &dyn Optimizable,
        theta_granularity: f64,
        hoelder_granularity: f64,
    ) -> Result<f64, AnalysisError>;
}

/// Builds the optimizer for `optimization_type`.
pub fn create_optimizer(
    optimization_type: OptimizationType,
    config: OptimizerConfig,
) -> Result<Box<dyn Optimizer>, AnalysisError> {
    let config = config.validate()?;
    Ok(match optimization_type {
        OptimizationType::Simple => Box::new(SimpleOptimizer::new(config)),
        OptimizationType::Gradient => Box::new(GradientOptimizer::new(config)),
    })
}

/// The discretised parameter space of one bound.
#[derive(Debug, Clone)]
pub(crate) struct SearchSpace {
    pub thetas: Vec<f64>,
    pub exponents: Vec<f64>,
    pub ids: Vec<HoelderId>,
}

/// A point of a [`SearchSpace`]: a theta index followed by one exponent index per Hölder.
pub(crate) type GridPoint = Vec<usize>;

impl SearchSpace {
    pub fn new(
        bound: &dyn Optimizable,
        theta_granularity: f64,
        hoelder_granularity: f64,
        config: &OptimizerConfig,
    ) -> Result<Self, AnalysisError> {
        if !(theta_granularity > 0.0 && theta_granularity.is_finite()) {
            return Err(AnalysisError::InvalidConfig(format!(
                "theta granularity must be finite and > 0, got {}",
                theta_granularity
            )));
        }
        if !(hoelder_granularity > 0.0 && hoelder_granularity.is_finite()) {
            return Err(AnalysisError::InvalidConfig(format!(
                "Hölder granularity must be finite and > 0, got {}",
                hoelder_granularity
            )));
        }

        let max_theta = bound.maximum_theta();
        let (theta_limit, inclusive) = if max_theta.is_finite() {
            (max_theta, false)
        } else {
            (config.theta_cap, true)
        };
        let limit = config.max_grid_points as f64;
        if theta_limit / theta_granularity > limit
            || (config.max_hoelder - 1.0) / hoelder_granularity > limit
        {
            return Err(AnalysisError::InvalidConfig(format!(
                "granularities ({}, {}) exceed the limit of {} grid points",
                theta_granularity, hoelder_granularity, config.max_grid_points
            )));
        }
        let thetas = grid(theta_granularity, theta_limit, inclusive, 0.0);
        let exponents = grid(hoelder_granularity, config.max_hoelder, true, 1.0);
        let ids = bound.hoelder_ids();

        let size = (thetas.len() as u64)
            .saturating_mul((exponents.len() as u64).saturating_pow(ids.len() as u32));
        if size > config.max_grid_points {
            return Err(AnalysisError::InvalidConfig(format!(
                "search grid of {} points exceeds the limit of {}; use coarser granularities",
                size, config.max_grid_points
            )));
        }
        if thetas.is_empty() || (!ids.is_empty() && exponents.is_empty()) {
            return Err(AnalysisError::NoFeasiblePoint(
                "granularity too coarse for the parameter domain".into(),
            ));
        }

        Ok(Self {
            thetas,
            exponents,
            ids,
        })
    }

    pub fn dimensions(&self) -> usize {
        1 + self.ids.len()
    }

    /// Number of grid positions along dimension `dim`.
    pub fn extent(&self, dim: usize) -> usize {
        if dim == 0 {
            self.thetas.len()
        } else {
            self.exponents.len()
        }
    }

    pub fn theta(&self, point: &[usize]) -> f64 {
        self.thetas[point[0]]
    }

    pub fn parameters(&self, point: &[usize]) -> Parameters {
        parameters(
            self.ids
                .iter()
                .zip(&point[1..])
                .map(|(id, idx)| (*id, self.exponents[*idx])),
        )
    }

    /// Objective at `point`, or `None` if the point is infeasible.
    pub fn evaluate(&self, bound: &dyn Optimizable, point: &[usize]) -> Option<f64> {
        bound
            .evaluate(self.theta(point), &self.parameters(point))
            .ok()
            .filter(|v| !v.is_nan())
    }

    /// Advances `point` to the next grid point in lexicographic order.
    /// Returns false after the last point.
    pub fn advance(&self, point: &mut GridPoint) -> bool {
        for dim in (0..self.dimensions()).rev() {
            point[dim] += 1;
            if point[dim] < self.extent(dim) {
                return true;
            }
            point[dim] = 0;
        }
        false
    }
}

/// `offset + k·step` for `k = 1, 2, …` below (or up to, if `inclusive`) `limit`.
fn grid(step: f64, limit: f64, inclusive: bool, offset: f64) -> Vec<f64> {
    let mut values = Vec::new();
    let mut k = 1u64;
    loop {
        let value = offset + k as f64 * step;
        let inside = if inclusive {
            value <= limit + step * 1e-9
        } else {
            value < limit
        };
        if !inside {
            break;
        }
        values.push(value.min(limit));
        k += 1;
    }
    values
}
