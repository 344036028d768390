//! Declarations read from a network file, before they are turned into a network.

use snc_core::symbolic_math::ArrivalModel;

/// Every declaration of one file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkFile {
    pub vertices: Vec<VertexDecl>,
    pub flows: Vec<FlowDecl>,
}

/// `I <alias>, <scheduling>, <service>, <rate>`
#[derive(Debug, Clone, PartialEq)]
pub struct VertexDecl {
    pub alias: String,
    pub scheduling: String,
    pub service: ServiceDecl,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServiceDecl {
    ConstantRate(f64),
}

/// `F <alias>, <hops>, <vertex>:<priority>, ..., <arrival>, <parameters>`
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDecl {
    pub alias: String,
    pub hops: Vec<HopDecl>,
    pub arrival: ArrivalModel,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HopDecl {
    pub vertex: String,
    pub priority: i32,
}
