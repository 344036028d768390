//! Coordinate descent on the search grid.
//!
//! Starts from the best theta with every exponent near 2 (falling back to the first
//! feasible grid point), then moves one coordinate at a time by a step of `s` grid
//! positions while that improves the objective. When no move improves, `s` is halved; the
//! search ends once a step of one position brings no improvement.

use crate::analysis::AnalysisError;
use crate::optimization::{GridPoint, Optimizable, Optimizer, OptimizerConfig, SearchSpace};

#[derive(Debug, Clone, Default)]
pub struct GradientOptimizer {
    config: OptimizerConfig,
}

impl GradientOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    fn start(&self, space: &SearchSpace, bound: &dyn Optimizable) -> Option<(GridPoint, f64)> {
        let near_two = space
            .exponents
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - 2.0).abs().total_cmp(&(*b - 2.0).abs()))
            .map_or(0, |(idx, _)| idx);

        let mut point = vec![near_two; space.dimensions()];
        let mut best: Option<(GridPoint, f64)> = None;
        for theta_idx in 0..space.thetas.len() {
            point[0] = theta_idx;
            if let Some(value) = space.evaluate(bound, &point) {
                if best.as_ref().map_or(true, |(_, b)| value < *b) {
                    best = Some((point.clone(), value));
                }
            }
        }
        if best.is_some() {
            return best;
        }

        let mut point = vec![0; space.dimensions()];
        loop {
            if let Some(value) = space.evaluate(bound, &point) {
                return Some((point, value));
            }
            if !space.advance(&mut point) {
                return None;
            }
        }
    }
}

impl Optimizer for GradientOptimizer {
    fn minimize(
        &self,
        bound: &dyn Optimizable,
        theta_granularity: f64,
        hoelder_granularity: f64,
    ) -> Result<f64, AnalysisError> {
        let space = SearchSpace::new(bound, theta_granularity, hoelder_granularity, &self.config)?;
        let (mut current, mut best) = self.start(&space, bound).ok_or_else(|| {
            AnalysisError::NoFeasiblePoint("no grid point is feasible".to_string())
        })?;

        let widest = (0..space.dimensions())
            .map(|dim| space.extent(dim))
            .max()
            .unwrap_or(1);
        let mut step = (widest / 4).max(1);
        let mut iterations = 0;

        while iterations < self.config.max_descent_iterations {
            iterations += 1;
            let mut improved = false;
            for dim in 0..space.dimensions() {
                let extent = space.extent(dim);
                let candidates = [
                    current[dim].checked_sub(step),
                    Some(current[dim] + step).filter(|idx| *idx < extent),
                ];
                for idx in candidates.into_iter().flatten() {
                    let mut candidate = current.clone();
                    candidate[dim] = idx;
                    if let Some(value) = space.evaluate(bound, &candidate) {
                        if value < best {
                            best = value;
                            current = candidate;
                            improved = true;
                        }
                    }
                }
            }
            if !improved {
                if step == 1 {
                    break;
                }
                step /= 2;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Coordinate descent finished after {} iteration(s) at theta = {}, value = {}",
            iterations,
            space.theta(&current),
            best
        );

        Ok(best)
    }
}
