//! Error types for reading and writing network files.

use thiserror::Error;

use snc_core::network::NetworkError;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FileOperationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed input. `line` is 1-based; 0 when the position is unknown.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Valid input or network state that the file format cannot express.
    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

impl FileOperationError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        FileOperationError::Parse {
            line,
            message: message.into(),
        }
    }
}
