//! Optimizer configuration.

use crate::analysis::AnalysisError;

/// Limits of the parameter search.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizerConfig {
    /// Upper end of the theta range when the bound itself does not limit theta.
    pub theta_cap: f64,
    /// Largest Hölder exponent tried. Must exceed 1.
    pub max_hoelder: f64,
    /// Refuse searches whose grid has more points than this.
    pub max_grid_points: u64,
    /// Relative tolerance of the bisection used by inverse bounds.
    pub bisection_tolerance: f64,
    /// Iteration limit for bracketing and for bisection of inverse bounds.
    pub max_bisection_iterations: usize,
    /// Iteration limit of the coordinate descent.
    pub max_descent_iterations: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            theta_cap: 50.0,
            max_hoelder: 10.0,
            max_grid_points: 5_000_000,
            bisection_tolerance: 1e-9,
            max_bisection_iterations: 200,
            max_descent_iterations: 10_000,
        }
    }
}

impl OptimizerConfig {
    pub fn validate(self) -> Result<Self, AnalysisError> {
        if !(self.theta_cap > 0.0 && self.theta_cap.is_finite()) {
            return Err(AnalysisError::InvalidConfig(
                "optimize: theta_cap must be finite and > 0".into(),
            ));
        }
        if !(self.max_hoelder > 1.0 && self.max_hoelder.is_finite()) {
            return Err(AnalysisError::InvalidConfig(
                "optimize: max_hoelder must be finite and > 1".into(),
            ));
        }
        if self.max_grid_points == 0 {
            return Err(AnalysisError::InvalidConfig(
                "optimize: max_grid_points must be > 0".into(),
            ));
        }
        if !(self.bisection_tolerance > 0.0 && self.bisection_tolerance.is_finite()) {
            return Err(AnalysisError::InvalidConfig(
                "optimize: bisection_tolerance must be finite and > 0".into(),
            ));
        }
        if self.max_bisection_iterations == 0 || self.max_descent_iterations == 0 {
            return Err(AnalysisError::InvalidConfig(
                "optimize: iteration limits must be > 0".into(),
            ));
        }
        Ok(self)
    }
}
