//! Error types shared across generator and trajectory construction.

use thiserror::Error;

/// All failure modes of problem construction and verification propagation.
///
/// Every variant is deterministic; there are no transient or retryable
/// failures anywhere in the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A basis or level index lies at or beyond the truncation dimension, or
    /// two matrices that must share a dimension do not.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A gate target matrix does not match the declared logical dimension.
    #[error("target matrix is {rows}x{cols}, expected {dim}x{dim}")]
    TargetDimension { rows: usize, cols: usize, dim: usize },

    /// A gate target matrix fails the unitarity check.
    #[error("target matrix is not unitary: max |U\u{2020}U - 1| = {dev:.3e}")]
    NonUnitary { dev: f64 },

    /// A gate ensemble was requested for a generator of the wrong kind.
    #[error("gate ensembles require a Liouvillian generator")]
    KindMismatch,

    /// A collapse channel was given a negative rate.
    #[error("collapse rate must be non-negative, got {0:.3e}")]
    NegativeRate(f64),

    /// A propagation time grid has fewer than two points.
    #[error("time grid must hold at least two points, got {0}")]
    EmptyGrid(usize),

    /// A required configuration key is absent.
    #[error("config: missing key '{0}'")]
    ConfigMissing(String),

    /// A configuration key holds a value of the wrong type or shape.
    #[error("config: invalid value for '{0}'")]
    ConfigInvalid(String),

    #[error("config: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
