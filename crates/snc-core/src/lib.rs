//! # SNC Core
//!
//! Core engine of the stochastic network calculator.
//!
//! - **symbolic_math**: theta-parameterised MGF bounds as immutable expression trees
//! - **network**: vertices, flows and the mutations that serve them
//! - **analysis**: feed-forward traversal computing the bound at a point of interest
//! - **optimization**: grid and coordinate search over theta and Hölder exponents
//! - **calculator**: analysis/optimization entry points working on network snapshots

#![forbid(unsafe_code)]

pub mod analysis;
pub mod calculator;
pub mod ids;
pub mod network;
pub mod optimization;
pub mod symbolic_math;

// Re-export commonly used types
pub use analysis::{AnalysisError, AnalysisType, BoundType};
pub use calculator::{analyze, optimize, optimize_with_config, Calculator};
pub use ids::{FlowId, HoelderId, VertexId};
pub use network::{Network, NetworkError, ServeOutcome};
pub use optimization::{OptimizationType, OptimizerConfig};
pub use symbolic_math::{Arrival, MathError, Service, SymbolicFunction};
