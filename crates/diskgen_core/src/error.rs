use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or writing disk initial conditions
#[derive(Debug, Error)]
pub enum DiskError {
    /// The disk configuration is not physically meaningful
    #[error("Invalid disk configuration: {0}")]
    Config(String),

    /// The disk mass integral did not converge or is unusable
    #[error("Mass integration failed: {0}")]
    Integration(String),

    /// Rejection sampling ran out of attempts for one particle
    #[error(
        "Rejection sampling exhausted after {attempts} attempts for particle {particle} \
         (candidate radii in [0, {r_max}))"
    )]
    SamplingExhausted { particle: usize, attempts: u64, r_max: f64 },

    /// Evaluation at r = 0 or a non-finite intermediate value
    #[error("Domain error: {0}")]
    Domain(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Snapshot encoding or decoding failed
    #[error("Snapshot codec error: {0}")]
    Codec(String),

    /// Species group absent from a snapshot
    #[error("Snapshot {path:?} has no group PartType{species}")]
    MissingSpecies { path: PathBuf, species: usize },

    /// Dataset absent from a species group
    #[error("Snapshot {path:?} has no dataset {field} in PartType{species}")]
    MissingField {
        path: PathBuf,
        species: usize,
        field: String,
    },

    /// Datasets inside one species group disagree on length
    #[error("Dataset {field} has {len} rows, expected {expected}")]
    LengthMismatch {
        field: String,
        len: usize,
        expected: usize,
    },
}

pub type Result<T> = std::result::Result<T, DiskError>;
