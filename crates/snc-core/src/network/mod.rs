//! The network graph and its mutations.
//!
//! This module provides:
//! - **graph**: the [`Network`] arena with validated mutations
//! - **vertex**: servers, flow prioritisation and the serve step
//! - **flow**: routes and the per-hop arrivals learned during analysis
//! - **listener**: synchronous change notifications
//! - **errors**: network error types

pub mod errors;
pub mod flow;
pub mod graph;
pub mod listener;
pub mod vertex;

pub use errors::NetworkError;
pub use flow::{Flow, Route};
pub use graph::Network;
pub use listener::NetworkListener;
pub use vertex::{QueuedFlow, ServeOutcome, Vertex};
