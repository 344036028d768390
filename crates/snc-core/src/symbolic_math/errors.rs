//! Error types for symbolic function construction and evaluation.

use thiserror::Error;

/// Errors raised while building or evaluating symbolic MGF bounds.
///
/// Evaluation errors are local to a single `(theta, parameters)` point: the optimizer
/// treats them as an infeasible sample and moves on, the analyzer never swallows them.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    /// Invalid construction parameter (e.g. non-positive rate, decay or bucket size).
    #[error("bad initialization: {message} (got {value})")]
    BadInitialization { message: String, value: f64 },

    /// The parameter assignment does not match the function's free-parameter set.
    #[error("parameter mismatch: {0}")]
    ParameterMismatch(String),

    /// Theta lies outside the function's valid domain `(0, max_theta]`.
    #[error("theta out of bound: theta = {theta}, maximum = {max_theta}")]
    ThetaOutOfBound { theta: f64, max_theta: f64 },

    /// The bound implies an overloaded server (non-positive logarithm argument).
    #[error("server overload: {0}")]
    ServerOverload(String),
}

impl MathError {
    pub(crate) fn bad_init(message: impl Into<String>, value: f64) -> Self {
        Self::BadInitialization {
            message: message.into(),
            value,
        }
    }
}
