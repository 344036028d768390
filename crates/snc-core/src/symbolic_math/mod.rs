//! Symbolic MGF bounds.
//!
//! This module provides:
//! - **function**: the expression tree of theta-dependent functions
//! - **arrival**: (sigma, rho) pairs describing arrivals and services, with dependency sets
//! - **combine**: output bounds, leftover services and service concatenation
//! - **factory**: constructors for the traffic and server models the calculator knows
//! - **hoelder**: free parameters and their assignments
//! - **errors**: construction and evaluation failures

pub mod arrival;
pub mod combine;
pub mod errors;
pub mod factory;
pub mod function;
pub mod hoelder;

pub use arrival::{Arrival, Dependencies, Service};
pub use errors::MathError;
pub use factory::{
    constant_rate_arrival, constant_rate_service, ebb_arrival, exponential_arrival, poisson_arrival,
    stationary_tb_arrival, ArrivalModel,
};
pub use function::{FunctionKind, HoelderSide, SymbolicFunction};
pub use hoelder::{parameters, Hoelder, HoelderRegistry, Parameters};
