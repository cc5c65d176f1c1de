use crate::record::RecordId;
use thiserror::Error;

pub type Result<T, E = AnonymizationError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum AnonymizationError {
    #[error("value {value:?} is not a leaf of hierarchy {hierarchy}")]
    UnknownValue { hierarchy: String, value: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid value for column {column} in record {record}: {reason}")]
    InvalidValue {
        column: String,
        record: RecordId,
        reason: &'static str,
    },

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
