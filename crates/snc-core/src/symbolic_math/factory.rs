//! Traffic and server models.
//!
//! Arrivals built here carry no dependencies; the network assigns the owning flow when
//! the arrival is attached as a flow's initial arrival.

use crate::symbolic_math::arrival::{Arrival, Dependencies, Service};
use crate::symbolic_math::errors::MathError;
use crate::symbolic_math::function::{FunctionKind, SymbolicFunction};

fn positive(what: &str, value: f64) -> Result<f64, MathError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(MathError::bad_init(format!("{} must be positive", what), value))
    }
}

/// Deterministic arrivals at a fixed rate.
pub fn constant_rate_arrival(rate: f64) -> Result<Arrival, MathError> {
    let rate = positive("arrival rate", rate)?;
    Ok(Arrival::new(
        SymbolicFunction::zero(),
        SymbolicFunction::constant(rate),
        Dependencies::default(),
    ))
}

/// Exponentially-bounded-burstiness arrivals.
pub fn ebb_arrival(rate: f64, decay: f64, prefactor: f64) -> Result<Arrival, MathError> {
    let rate = positive("arrival rate", rate)?;
    Ok(Arrival::new(
        SymbolicFunction::ebb_sigma(decay, prefactor)?,
        SymbolicFunction::constant(rate),
        Dependencies::default(),
    ))
}

/// Arrivals with i.i.d. exponentially distributed increments of rate `lambda`.
pub fn exponential_arrival(lambda: f64) -> Result<Arrival, MathError> {
    Ok(Arrival::new(
        SymbolicFunction::zero(),
        SymbolicFunction::exponential_sigma(lambda)?,
        Dependencies::default(),
    ))
}

/// Stationary arrivals shaped by a token bucket with the given rate and bucket size.
pub fn stationary_tb_arrival(
    rate: f64,
    bucket: f64,
    max_theta: Option<f64>,
) -> Result<Arrival, MathError> {
    let rate = positive("arrival rate", rate)?;
    Ok(Arrival::new(
        SymbolicFunction::stationary_tb_sigma(bucket, max_theta)?,
        SymbolicFunction::constant(rate),
        Dependencies::default(),
    ))
}

/// Poisson arrivals with intensity `mu` whose increments are bounded by `increment`.
pub fn poisson_arrival(mu: f64, increment: SymbolicFunction) -> Result<Arrival, MathError> {
    Ok(Arrival::new(
        SymbolicFunction::zero(),
        SymbolicFunction::poisson_rho(increment, mu)?,
        Dependencies::default(),
    ))
}

/// A work-conserving server with a guaranteed rate (stored as `rho = -rate`).
pub fn constant_rate_service(rate: f64) -> Result<Service, MathError> {
    let rate = positive("service rate", rate)?;
    Ok(Service::new(
        SymbolicFunction::zero(),
        SymbolicFunction::constant(-rate),
        Dependencies::default(),
    ))
}

/// The arrival models that can be named in a network description.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArrivalModel {
    Constant {
        rate: f64,
    },
    Ebb {
        rate: f64,
        decay: f64,
        prefactor: f64,
    },
    Exponential {
        lambda: f64,
    },
    StationaryTb {
        rate: f64,
        bucket: f64,
        max_theta: Option<f64>,
    },
}

impl ArrivalModel {
    pub fn build(&self) -> Result<Arrival, MathError> {
        match *self {
            ArrivalModel::Constant { rate } => constant_rate_arrival(rate),
            ArrivalModel::Ebb {
                rate,
                decay,
                prefactor,
            } => ebb_arrival(rate, decay, prefactor),
            ArrivalModel::Exponential { lambda } => exponential_arrival(lambda),
            ArrivalModel::StationaryTb {
                rate,
                bucket,
                max_theta,
            } => stationary_tb_arrival(rate, bucket, max_theta),
        }
    }

    /// Recovers the model an arrival was built from, if it is one of the named models.
    pub fn recognize(arrival: &Arrival) -> Option<Self> {
        let rate = arrival.rho.constant_value();
        match (arrival.sigma.kind(), arrival.rho.kind()) {
            (FunctionKind::Constant(sigma), FunctionKind::ExponentialSigma { lambda })
                if *sigma == 0.0 =>
            {
                Some(ArrivalModel::Exponential { lambda: *lambda })
            }
            (FunctionKind::Constant(sigma), _) if *sigma == 0.0 => {
                rate.map(|rate| ArrivalModel::Constant { rate })
            }
            (FunctionKind::EbbSigma { decay, prefactor }, _) => rate.map(|rate| ArrivalModel::Ebb {
                rate,
                decay: *decay,
                prefactor: *prefactor,
            }),
            (FunctionKind::StationaryTbSigma { bucket, max_theta }, _) => {
                rate.map(|rate| ArrivalModel::StationaryTb {
                    rate,
                    bucket: *bucket,
                    max_theta: max_theta.is_finite().then_some(*max_theta),
                })
            }
            _ => None,
        }
    }
}
