//! # Symbolic Functions
//!
//! Theta-dependent functions forming immutable expression trees. Every sigma/rho term of
//! an MGF bound is a [`SymbolicFunction`]; composites are built bottom-up by the network
//! mutations and the analysis and evaluated many times by the optimizer.
//!
//! ## Design
//!
//! - One sum type ([`FunctionKind`]) with exhaustive `match` for evaluation
//! - Children are shared through `Arc`; nodes never change after construction
//! - `max_theta` and the free-parameter set are computed once, at construction
//! - Evaluation validates the parameter assignment once at the root; children receive
//!   the same assignment and only read the IDs of their own subtree
//!
//! ## Example
//!
//! ```rust
//! use snc_core::symbolic_math::{Parameters, SymbolicFunction};
//!
//! let sigma = SymbolicFunction::ebb_sigma(2.0, 1.0).unwrap();
//! let rho = SymbolicFunction::constant(-3.0);
//! let bound = SymbolicFunction::additive(sigma, SymbolicFunction::b_function(rho));
//! let value = bound.value(0.5, &Parameters::new()).unwrap();
//! assert!(value.is_finite());
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::ids::HoelderId;
use crate::symbolic_math::errors::MathError;
use crate::symbolic_math::hoelder::{Hoelder, Parameters};

/// Which exponent of a Hölder pair a [`FunctionKind::Scaled`] node uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HoelderSide {
    /// The exponent `p` itself (left operand of a Hölder composition).
    P,
    /// The conjugate `q = p / (p - 1)` (right operand of a Hölder composition).
    Q,
}

/// The node variants of the expression tree.
#[derive(Debug, Clone)]
pub enum FunctionKind {
    /// `c` for every theta.
    Constant(f64),
    /// `-ln(1 - θ/λ) / θ`: exponentially distributed increments with rate `λ`.
    ExponentialSigma { lambda: f64 },
    /// `ln(prefactor)/decay - ln(1 - θ/decay) / θ`: exponentially bounded burstiness.
    EbbSigma { decay: f64, prefactor: f64 },
    /// `ln(½e^{θB} + ½e^{-θB}) / θ`: stationary traffic shaped by a token bucket `B`.
    StationaryTbSigma { bucket: f64, max_theta: f64 },
    /// `μ/θ · (exp(θ·f(θ)) - 1)`: Poisson arrivals with increment MGF bound `f`.
    PoissonRho {
        increment: SymbolicFunction,
        mu: f64,
    },
    /// `f(θ) + g(θ)`, or `f(θp)/p + g(θq)/q` when a Hölder parameter is attached.
    Additive {
        left: SymbolicFunction,
        right: SymbolicFunction,
        hoelder: Option<HoelderId>,
    },
    /// `f(θ·x)` or `f(θ/x)`, `x` being one exponent of a Hölder pair.
    Scaled {
        inner: SymbolicFunction,
        hoelder: HoelderId,
        side: HoelderSide,
        invert: bool,
    },
    /// `-ln(1 - exp(θ·f(θ))) / θ`, defined only where `f(θ) < 0`.
    BFunction(SymbolicFunction),
    /// `-x`, where `x` is the value bound to the parameter (a backlog target).
    NewParameter(HoelderId),
    /// `max(f(θ), g(θ))`.
    Maximum(SymbolicFunction, SymbolicFunction),
    /// `min(f(θ), g(θ))`.
    Minimum(SymbolicFunction, SymbolicFunction),
    /// `f(θ) - g(θ)`.
    Difference(SymbolicFunction, SymbolicFunction),
}

#[derive(Debug)]
struct Node {
    kind: FunctionKind,
    max_theta: f64,
    parameters: BTreeSet<HoelderId>,
    new_parameters: BTreeSet<HoelderId>,
}

/// An immutable, cheaply clonable theta-dependent function.
#[derive(Debug, Clone)]
pub struct SymbolicFunction(Arc<Node>);

impl SymbolicFunction {
    fn from_kind(kind: FunctionKind) -> Self {
        let (max_theta, parameters, new_parameters) = match &kind {
            FunctionKind::Constant(_) => (f64::INFINITY, BTreeSet::new(), BTreeSet::new()),
            FunctionKind::ExponentialSigma { lambda } => (*lambda, BTreeSet::new(), BTreeSet::new()),
            FunctionKind::EbbSigma { decay, .. } => (*decay, BTreeSet::new(), BTreeSet::new()),
            FunctionKind::StationaryTbSigma { max_theta, .. } => {
                (*max_theta, BTreeSet::new(), BTreeSet::new())
            }
            FunctionKind::PoissonRho { increment, .. } | FunctionKind::BFunction(increment) => (
                increment.max_theta(),
                increment.parameters().clone(),
                increment.new_parameters().clone(),
            ),
            FunctionKind::Additive {
                left,
                right,
                hoelder,
            } => {
                let mut params = union(left.parameters(), right.parameters());
                params.extend(hoelder.iter().copied());
                (
                    left.max_theta().min(right.max_theta()),
                    params,
                    union(left.new_parameters(), right.new_parameters()),
                )
            }
            FunctionKind::Scaled { inner, hoelder, .. } => {
                let mut params = inner.parameters().clone();
                params.insert(*hoelder);
                (inner.max_theta(), params, inner.new_parameters().clone())
            }
            FunctionKind::NewParameter(id) => {
                let ids: BTreeSet<HoelderId> = [*id].into_iter().collect();
                (f64::INFINITY, ids.clone(), ids)
            }
            FunctionKind::Maximum(left, right)
            | FunctionKind::Minimum(left, right)
            | FunctionKind::Difference(left, right) => (
                left.max_theta().min(right.max_theta()),
                union(left.parameters(), right.parameters()),
                union(left.new_parameters(), right.new_parameters()),
            ),
        };
        Self(Arc::new(Node {
            kind,
            max_theta,
            parameters,
            new_parameters,
        }))
    }

    // ----- atoms -----

    /// A theta-independent constant.
    pub fn constant(value: f64) -> Self {
        Self::from_kind(FunctionKind::Constant(value))
    }

    /// The constant zero function.
    pub fn zero() -> Self {
        Self::constant(0.0)
    }

    /// Sigma of an exponentially-bounded-burstiness (EBB) arrival.
    pub fn ebb_sigma(decay: f64, prefactor: f64) -> Result<Self, MathError> {
        if !(decay > 0.0 && decay.is_finite()) {
            return Err(MathError::bad_init("EBB decay must be positive", decay));
        }
        if !(prefactor > 0.0 && prefactor.is_finite()) {
            return Err(MathError::bad_init("EBB prefactor must be positive", prefactor));
        }
        Ok(Self::from_kind(FunctionKind::EbbSigma { decay, prefactor }))
    }

    /// MGF bound of exponentially distributed increments with rate `lambda`.
    pub fn exponential_sigma(lambda: f64) -> Result<Self, MathError> {
        if !(lambda > 0.0 && lambda.is_finite()) {
            return Err(MathError::bad_init(
                "rate of exponential increments must be positive",
                lambda,
            ));
        }
        Ok(Self::from_kind(FunctionKind::ExponentialSigma { lambda }))
    }

    /// Sigma of stationary arrivals passed through a token bucket of size `bucket`.
    ///
    /// The MGF of the unshaped arrivals decides how large theta may get; it cannot be
    /// derived from the bucket, so it is given explicitly (`None` means unbounded).
    pub fn stationary_tb_sigma(bucket: f64, max_theta: Option<f64>) -> Result<Self, MathError> {
        if !(bucket > 0.0 && bucket.is_finite()) {
            return Err(MathError::bad_init(
                "bucket size of arrivals must be positive",
                bucket,
            ));
        }
        let max_theta = max_theta.unwrap_or(f64::INFINITY);
        if !(max_theta > 0.0) {
            return Err(MathError::bad_init("maximal theta must be positive", max_theta));
        }
        Ok(Self::from_kind(FunctionKind::StationaryTbSigma { bucket, max_theta }))
    }

    /// Rho of Poisson arrivals with intensity `mu` and increment bound `increment`.
    pub fn poisson_rho(increment: SymbolicFunction, mu: f64) -> Result<Self, MathError> {
        if !(mu > 0.0 && mu.is_finite()) {
            return Err(MathError::bad_init("Poisson intensity must be positive", mu));
        }
        Ok(Self::from_kind(FunctionKind::PoissonRho { increment, mu }))
    }

    /// Introduces the backlog variable bound to `id`.
    pub fn new_parameter(id: HoelderId) -> Self {
        Self::from_kind(FunctionKind::NewParameter(id))
    }

    // ----- composites -----

    /// Sum of two statistically independent terms.
    pub fn additive(left: SymbolicFunction, right: SymbolicFunction) -> Self {
        Self::from_kind(FunctionKind::Additive {
            left,
            right,
            hoelder: None,
        })
    }

    /// Hölder combination of two dependent terms: `f(θp)/p + g(θq)/q`.
    pub fn hoelder_additive(
        left: SymbolicFunction,
        right: SymbolicFunction,
        hoelder: HoelderId,
    ) -> Self {
        Self::from_kind(FunctionKind::Additive {
            left,
            right,
            hoelder: Some(hoelder),
        })
    }

    /// Plain sum when `hoelder` is `None`, Hölder combination otherwise.
    pub fn compose(
        left: SymbolicFunction,
        right: SymbolicFunction,
        hoelder: Option<HoelderId>,
    ) -> Self {
        Self::from_kind(FunctionKind::Additive {
            left,
            right,
            hoelder,
        })
    }

    /// Evaluates `inner` at a theta scaled by one exponent of `hoelder`.
    pub fn scaled(
        inner: SymbolicFunction,
        hoelder: HoelderId,
        side: HoelderSide,
        invert: bool,
    ) -> Self {
        Self::from_kind(FunctionKind::Scaled {
            inner,
            hoelder,
            side,
            invert,
        })
    }

    /// The B-transform turning an MGF exponent into a violation-probability term.
    pub fn b_function(exponent: SymbolicFunction) -> Self {
        Self::from_kind(FunctionKind::BFunction(exponent))
    }

    /// Pointwise `max(left, right)`.
    pub fn maximum(left: SymbolicFunction, right: SymbolicFunction) -> Self {
        Self::from_kind(FunctionKind::Maximum(left, right))
    }

    /// Pointwise `min(left, right)`.
    pub fn minimum(left: SymbolicFunction, right: SymbolicFunction) -> Self {
        Self::from_kind(FunctionKind::Minimum(left, right))
    }

    /// Pointwise `left - right`.
    pub fn difference(left: SymbolicFunction, right: SymbolicFunction) -> Self {
        Self::from_kind(FunctionKind::Difference(left, right))
    }

    // ----- accessors -----

    /// The root node of the expression tree.
    pub fn kind(&self) -> &FunctionKind {
        &self.0.kind
    }

    /// Upper end of the valid theta domain.
    pub fn max_theta(&self) -> f64 {
        self.0.max_theta
    }

    /// Every free parameter appearing in the subtree.
    pub fn parameters(&self) -> &BTreeSet<HoelderId> {
        &self.0.parameters
    }

    /// Parameters introduced by [`SymbolicFunction::new_parameter`] (backlog variables).
    pub fn new_parameters(&self) -> &BTreeSet<HoelderId> {
        &self.0.new_parameters
    }

    /// The value of a subtree that depends neither on theta nor on any parameter.
    pub fn constant_value(&self) -> Option<f64> {
        match &self.0.kind {
            FunctionKind::Constant(c) => Some(*c),
            FunctionKind::Additive {
                left,
                right,
                hoelder: None,
            } => Some(left.constant_value()? + right.constant_value()?),
            FunctionKind::Maximum(left, right) => {
                Some(left.constant_value()?.max(right.constant_value()?))
            }
            FunctionKind::Minimum(left, right) => {
                Some(left.constant_value()?.min(right.constant_value()?))
            }
            FunctionKind::Difference(left, right) => {
                Some(left.constant_value()? - right.constant_value()?)
            }
            _ => None,
        }
    }

    // ----- evaluation -----

    /// Evaluates the function at `theta`.
    ///
    /// `params` must assign exactly the IDs in [`parameters`](Self::parameters).
    pub fn value(&self, theta: f64, params: &Parameters) -> Result<f64, MathError> {
        if params.len() != self.0.parameters.len() {
            return Err(MathError::ParameterMismatch(format!(
                "expected {} parameter(s) {:?}, got {}",
                self.0.parameters.len(),
                self.0.parameters,
                params.len()
            )));
        }
        self.value_within(theta, params)
    }

    /// Evaluates the function with an assignment that may carry additional IDs.
    ///
    /// Used when sigma and rho of one bound share a single assignment.
    pub fn value_within(&self, theta: f64, params: &Parameters) -> Result<f64, MathError> {
        if let Some(missing) = self.0.parameters.iter().find(|id| !params.contains_key(id)) {
            return Err(MathError::ParameterMismatch(format!(
                "no value assigned to parameter {}",
                missing
            )));
        }
        self.eval(theta, params)
    }

    fn eval(&self, theta: f64, params: &Parameters) -> Result<f64, MathError> {
        if !(theta > 0.0) || theta > self.0.max_theta {
            return Err(MathError::ThetaOutOfBound {
                theta,
                max_theta: self.0.max_theta,
            });
        }

        match &self.0.kind {
            FunctionKind::Constant(c) => Ok(*c),
            FunctionKind::ExponentialSigma { lambda } => Ok(-(1.0 - theta / lambda).ln() / theta),
            FunctionKind::EbbSigma { decay, prefactor } => {
                Ok(prefactor.ln() / decay - (1.0 - theta / decay).ln() / theta)
            }
            FunctionKind::StationaryTbSigma { bucket, .. } => {
                // ln(cosh(θB))/θ rewritten to stay finite for large θB
                Ok(bucket + (0.5 * (1.0 + (-2.0 * theta * bucket).exp())).ln() / theta)
            }
            FunctionKind::PoissonRho { increment, mu } => {
                let f = increment.eval(theta, params)?;
                Ok(mu / theta * (theta * f).exp_m1())
            }
            FunctionKind::Additive {
                left,
                right,
                hoelder: None,
            } => Ok(left.eval(theta, params)? + right.eval(theta, params)?),
            FunctionKind::Additive {
                left,
                right,
                hoelder: Some(id),
            } => {
                let h = exponent(params, *id)?;
                let p = h.value;
                let q = h.conjugate();
                Ok(left.eval(theta * p, params)? / p + right.eval(theta * q, params)? / q)
            }
            FunctionKind::Scaled {
                inner,
                hoelder,
                side,
                invert,
            } => {
                let h = exponent(params, *hoelder)?;
                let factor = match side {
                    HoelderSide::P => h.value,
                    HoelderSide::Q => h.conjugate(),
                };
                let scaled = if *invert {
                    theta / factor
                } else {
                    theta * factor
                };
                inner.eval(scaled, params)
            }
            FunctionKind::BFunction(exponent) => {
                let f = exponent.eval(theta, params)?;
                if !(f < 0.0) {
                    return Err(MathError::ServerOverload(format!(
                        "non-positive argument in log(): 1 - exp({})",
                        theta * f
                    )));
                }
                Ok(-(-(theta * f).exp()).ln_1p() / theta)
            }
            FunctionKind::NewParameter(id) => params
                .get(id)
                .map(|h| -h.value)
                .ok_or_else(|| MathError::ParameterMismatch(format!("no value for {}", id))),
            FunctionKind::Maximum(left, right) => {
                Ok(left.eval(theta, params)?.max(right.eval(theta, params)?))
            }
            FunctionKind::Minimum(left, right) => {
                Ok(left.eval(theta, params)?.min(right.eval(theta, params)?))
            }
            FunctionKind::Difference(left, right) => {
                Ok(left.eval(theta, params)? - right.eval(theta, params)?)
            }
        }
    }
}

fn exponent(params: &Parameters, id: HoelderId) -> Result<Hoelder, MathError> {
    let h = params
        .get(&id)
        .copied()
        .ok_or_else(|| MathError::ParameterMismatch(format!("no value for {}", id)))?;
    if !h.is_valid_exponent() {
        return Err(MathError::ParameterMismatch(format!(
            "Hölder exponent {} must exceed 1, got {}",
            id, h.value
        )));
    }
    Ok(h)
}

fn union(a: &BTreeSet<HoelderId>, b: &BTreeSet<HoelderId>) -> BTreeSet<HoelderId> {
    a.union(b).copied().collect()
}

impl fmt::Display for SymbolicFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            FunctionKind::Constant(c) => write!(f, "{:?}", c),
            FunctionKind::ExponentialSigma { lambda } => write!(f, "Exp({:?})", lambda),
            FunctionKind::EbbSigma { decay, prefactor } => {
                write!(f, "EBB({:?},{:?})", decay, prefactor)
            }
            FunctionKind::StationaryTbSigma { bucket, .. } => write!(f, "StatTB({:?})", bucket),
            FunctionKind::PoissonRho { increment, mu } => write!(f, "Poi({:?},{})", mu, increment),
            FunctionKind::Additive {
                left,
                right,
                hoelder: None,
            } => write!(f, "({} + {})", left, right),
            FunctionKind::Additive {
                left,
                right,
                hoelder: Some(id),
            } => write!(f, "({} +_{} {})", left, id, right),
            FunctionKind::Scaled {
                inner,
                hoelder,
                side,
                invert,
            } => {
                let exp = match side {
                    HoelderSide::P => format!("{}", hoelder),
                    HoelderSide::Q => format!("{}'", hoelder),
                };
                if *invert {
                    write!(f, "{}[θ/{}]", inner, exp)
                } else {
                    write!(f, "{}[θ*{}]", inner, exp)
                }
            }
            FunctionKind::BFunction(inner) => write!(f, "B({})", inner),
            FunctionKind::NewParameter(id) => write!(f, "-{}", id),
            FunctionKind::Maximum(l, r) => write!(f, "max({}, {})", l, r),
            FunctionKind::Minimum(l, r) => write!(f, "min({}, {})", l, r),
            FunctionKind::Difference(l, r) => write!(f, "({} - {})", l, r),
        }
    }
}
