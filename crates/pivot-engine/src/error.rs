//! Error types for pivot-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PivotError {
    #[error("Empty input")]
    EmptyInput,

    #[error("Unrecognized timestamp format: {0}")]
    UnrecognizedFormat(String),

    #[error("Invalid calendar instant: {0}")]
    SemanticMismatch(String),

    #[error("Range too short: {0}")]
    RangeTooShort(String),

    #[error("Range too long: {0}")]
    RangeTooLong(String),

    #[error("Wrong column count: {0}")]
    ColumnCountMismatch(String),

    #[error("Duration out of bounds: {0}")]
    DurationOutOfBounds(String),

    #[error("Unknown row layout: {0}")]
    UnknownLayout(String),

    #[error("Mixed row layouts: {0}")]
    MixedLayout(String),

    #[error("Missing uniform window: {0}")]
    MissingUniformWindow(String),

    #[error("No valid rows: {0}")]
    NoValidRows(String),
}

pub type Result<T> = std::result::Result<T, PivotError>;
