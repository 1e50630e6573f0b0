//! Error types for mapping, simulation and bitstream I/O.

use std::fmt;
use std::io;

use crate::resource::PoolSnapshot;

/// Crate-wide error.
///
/// Every variant is fatal to the build (or load) that produced it:
/// no partial netlist is ever returned alongside an error.
#[derive(Debug)]
pub enum Error {
    /// A function string, equation or literal token failed to parse.
    MalformedExpression {
        input: String,
        position: usize,
        message: String,
    },
    /// A term chunk could not be allocated a LUT of either class.
    ResourceExhausted {
        /// The literals that were still waiting for a LUT.
        chunk: Vec<String>,
        /// Pool state at the moment of failure.
        pool: PoolSnapshot,
    },
    /// Outputs reference each other in a loop.
    /// The first name is repeated at the end of `cycle`.
    CyclicDependency { cycle: Vec<String> },
    /// A signal could not be resolved during simulation.
    UnresolvedSignal { name: String },
    /// The persisted bitstream is missing, unreadable or inconsistent.
    Serialization(BitstreamError),
}

impl Error {
    pub(crate) fn malformed(input: &str, position: usize, message: impl Into<String>) -> Self {
        Error::MalformedExpression {
            input: input.to_string(),
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedExpression {
                input,
                position,
                message,
            } => write!(f, "malformed expression '{}' at {}: {}", input, position, message),
            Error::ResourceExhausted { chunk, pool } => write!(
                f,
                "no LUT available for [{}] (LUT4 {}/{} free, LUT6 {}/{} free)",
                chunk.join(", "),
                pool.lut4_available,
                pool.lut4_total,
                pool.lut6_available,
                pool.lut6_total
            ),
            Error::CyclicDependency { cycle } => write!(f, "cyclic output dependency: {}", cycle.join(" -> ")),
            Error::UnresolvedSignal { name } => write!(f, "signal '{}' cannot be resolved", name),
            Error::Serialization(e) => write!(f, "bitstream error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BitstreamError> for Error {
    fn from(e: BitstreamError) -> Self {
        Error::Serialization(e)
    }
}

/// Error type for bitstream encoding and decoding.
#[derive(Debug)]
pub enum BitstreamError {
    /// File I/O error.
    Io(io::Error),
    /// The payload is not valid JSON or does not match the schema.
    Json(serde_json::Error),
    /// The payload parsed but violates a structural rule.
    Schema(String),
    /// A stored function string does not parse.
    Function { id: usize, source: Box<Error> },
}

impl From<io::Error> for BitstreamError {
    fn from(e: io::Error) -> Self {
        BitstreamError::Io(e)
    }
}

impl From<serde_json::Error> for BitstreamError {
    fn from(e: serde_json::Error) -> Self {
        BitstreamError::Json(e)
    }
}

impl fmt::Display for BitstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitstreamError::Io(e) => write!(f, "I/O error: {}", e),
            BitstreamError::Json(e) => write!(f, "JSON error: {}", e),
            BitstreamError::Schema(msg) => write!(f, "schema mismatch: {}", msg),
            BitstreamError::Function { id, source } => write!(f, "LUT {}: {}", id, source),
        }
    }
}

impl std::error::Error for BitstreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BitstreamError::Io(e) => Some(e),
            BitstreamError::Json(e) => Some(e),
            BitstreamError::Schema(_) => None,
            BitstreamError::Function { source, .. } => Some(source.as_ref()),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
