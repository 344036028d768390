//! Exhaustive grid search.

use crate::analysis::AnalysisError;
use crate::optimization::{Optimizable, Optimizer, OptimizerConfig, SearchSpace};

/// Evaluates every grid point and keeps the smallest feasible value.
#[derive(Debug, Clone, Default)]
pub struct SimpleOptimizer {
    config: OptimizerConfig,
}

impl SimpleOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }
}

impl Optimizer for SimpleOptimizer {
    fn minimize(
        &self,
        bound: &dyn Optimizable,
        theta_granularity: f64,
        hoelder_granularity: f64,
    ) -> Result<f64, AnalysisError> {
        let space = SearchSpace::new(bound, theta_granularity, hoelder_granularity, &self.config)?;

        let mut point = vec![0; space.dimensions()];
        let mut best: Option<(f64, f64)> = None;
        let mut evaluated = 0usize;
        loop {
            evaluated += 1;
            if let Some(value) = space.evaluate(bound, &point) {
                if best.map_or(true, |(b, _)| value < b) {
                    best = Some((value, space.theta(&point)));
                }
            }
            if !space.advance(&mut point) {
                break;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Grid search evaluated {} point(s), best {:?}",
            evaluated,
            best
        );

        best.map(|(value, _)| value).ok_or_else(|| {
            AnalysisError::NoFeasiblePoint(format!(
                "none of the {} grid point(s) is feasible",
                evaluated
            ))
        })
    }
}
