//! Error types in emotree
//!

use thiserror::Error;

use ndarray::ShapeError;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("invalid parameter {0}")]
    Parameters(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("invalid ndarray shape {0}")]
    NdShape(#[from] ShapeError),
    #[error("Not enough samples to fit a model")]
    NotEnoughSamples,
    #[error("number of records ({records}) does not match number of targets ({targets})")]
    MismatchedLengths { records: usize, targets: usize },
    #[error("label {label} is outside of the class range [1, {n_classes}]")]
    LabelOutOfRange { label: usize, n_classes: usize },
    #[error("attribute {column} of record {row} is {value}, expected 0 or 1")]
    NonBinaryAttribute { row: usize, column: usize, value: u8 },
    #[error("expected {expected} attributes per record, found {found}")]
    FeatureCount { expected: usize, found: usize },
    #[error("worker pool failed: {0}")]
    WorkerPool(String),
}
