//! # SNC IO
//!
//! Reading and writing networks in the calculator's line-oriented file format:
//!
//! ```text
//! I v1, FIFO, CR, 5
//! I v2, FIFO, CR, 4
//! EOI
//! F f1, 2, v1:0, v2:0, EBB, 1, 2, 0.5
//! EOF
//! ```
//!
//! - **parser**: Pest grammar, declarations and network construction
//! - **writer**: network serialisation
//! - **ast**: the parsed declarations
//! - **errors**: [`FileOperationError`]

#![forbid(unsafe_code)]

pub mod ast;
pub mod errors;
pub mod parser;
pub mod writer;

use std::fs;
use std::path::Path;

use snc_core::network::Network;

pub use errors::FileOperationError;
pub use parser::{build_network, parse_network_file};
pub use writer::write_network;

/// Parses and builds a network from its textual description.
pub fn read_network(source: &str) -> Result<Network, FileOperationError> {
    build_network(&parse_network_file(source)?)
}

/// Loads a network from a file.
pub fn load(path: impl AsRef<Path>) -> Result<Network, FileOperationError> {
    let source = fs::read_to_string(path)?;
    read_network(&source)
}

/// Saves a network to a file.
pub fn save(network: &Network, path: impl AsRef<Path>) -> Result<(), FileOperationError> {
    let text = write_network(network)?;
    fs::write(path, text)?;
    Ok(())
}
