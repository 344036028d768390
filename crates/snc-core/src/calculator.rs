//! Entry points tying analysis and optimization together.
//!
//! Both entry points work on a [`Network::deep_copy`]; the caller's network is never
//! mutated by an analysis.

use std::rc::Rc;

use crate::analysis::{create_analyzer, AnalysisError, AnalysisType, BoundType};
use crate::ids::{FlowId, VertexId};
use crate::network::{Network, NetworkListener};
use crate::optimization::{create_bound, create_optimizer, OptimizationType, OptimizerConfig};
use crate::symbolic_math::Arrival;

/// Symbolic bound for `flow` at `vertex`.
pub fn analyze(
    flow: FlowId,
    vertex: VertexId,
    analysis_type: AnalysisType,
    bound_type: BoundType,
    network: &Network,
) -> Result<Arrival, AnalysisError> {
    #[cfg(feature = "tracing")]
    tracing::info!("Analyzing {:?} bound of {} at {}", bound_type, flow, vertex);

    let mut analyzer = create_analyzer(analysis_type, network.deep_copy(), flow, vertex, bound_type);
    analyzer.analyze()
}

/// Numeric bound for `flow` at `vertex` with the default optimizer configuration.
///
/// `target` is the backlog or delay for direct bounds and the violation probability for
/// inverse bounds.
#[allow(clippy::too_many_arguments)]
pub fn optimize(
    flow: FlowId,
    vertex: VertexId,
    theta_granularity: f64,
    hoelder_granularity: f64,
    analysis_type: AnalysisType,
    optimization_type: OptimizationType,
    bound_type: BoundType,
    target: f64,
    network: &Network,
) -> Result<f64, AnalysisError> {
    optimize_with_config(
        flow,
        vertex,
        theta_granularity,
        hoelder_granularity,
        analysis_type,
        optimization_type,
        bound_type,
        target,
        network,
        OptimizerConfig::default(),
    )
}

/// [`optimize`] with explicit limits.
#[allow(clippy::too_many_arguments)]
pub fn optimize_with_config(
    flow: FlowId,
    vertex: VertexId,
    theta_granularity: f64,
    hoelder_granularity: f64,
    analysis_type: AnalysisType,
    optimization_type: OptimizationType,
    bound_type: BoundType,
    target: f64,
    network: &Network,
    config: OptimizerConfig,
) -> Result<f64, AnalysisError> {
    let optimizer = create_optimizer(optimization_type, config)?;
    let arrival = analyze(flow, vertex, analysis_type, bound_type.analysis_bound(), network)?;
    let bound = create_bound(bound_type, arrival, target, config)?;
    let value = optimizer.minimize(bound.as_ref(), theta_granularity, hoelder_granularity)?;

    #[cfg(feature = "tracing")]
    tracing::info!("Optimized {:?} bound: {}", bound_type, value);

    Ok(value)
}

/// Owns the current network and the listeners attached to it.
#[derive(Default)]
pub struct Calculator {
    network: Network,
    listeners: Vec<Rc<dyn NetworkListener>>,
    config: OptimizerConfig,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OptimizerConfig) -> Result<Self, AnalysisError> {
        Ok(Self {
            config: config.validate()?,
            ..Self::default()
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// Replaces the current network; registered listeners move to the new one.
    pub fn set_network(&mut self, mut network: Network) {
        for listener in &self.listeners {
            network.add_listener(Rc::clone(listener));
        }
        self.network = network;
    }

    pub fn add_listener(&mut self, listener: Rc<dyn NetworkListener>) {
        self.network.add_listener(Rc::clone(&listener));
        self.listeners.push(listener);
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn analyze(
        &self,
        flow: FlowId,
        vertex: VertexId,
        analysis_type: AnalysisType,
        bound_type: BoundType,
    ) -> Result<Arrival, AnalysisError> {
        analyze(flow, vertex, analysis_type, bound_type, &self.network)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn optimize(
        &self,
        flow: FlowId,
        vertex: VertexId,
        theta_granularity: f64,
        hoelder_granularity: f64,
        analysis_type: AnalysisType,
        optimization_type: OptimizationType,
        bound_type: BoundType,
        target: f64,
    ) -> Result<f64, AnalysisError> {
        optimize_with_config(
            flow,
            vertex,
            theta_granularity,
            hoelder_granularity,
            analysis_type,
            optimization_type,
            bound_type,
            target,
            &self.network,
            self.config,
        )
    }
}
