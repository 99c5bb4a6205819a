//! Error types shared by the whole crate.

use thiserror::Error;

/// Errors produced while loading data, training or evaluating models.
#[derive(Debug, Error)]
pub enum Error {
    /// The training data can't be used to build a model.
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// A record carries a value that no branch of the tree was trained on.
    #[error("Unclassifiable record: value {value:?} at attribute {attribute} was not seen during training")]
    UnclassifiableRecord { attribute: usize, value: String },

    /// A record can't be addressed with the training schema.
    #[error("Record has {found} fields, expected {expected}")]
    RecordWidth { expected: usize, found: usize },

    #[error("Model wasn't fitted yet.")]
    NotFitted,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Predictions and labels are of different sizes ({expected} vs {found}).")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Undefined metric: {0}")]
    UndefinedMetric(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for fallible operations of this crate.
pub type Result<T> = std::result::Result<T, Error>;
