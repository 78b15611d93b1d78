//! Error types for the column store

use thiserror::Error;

use crate::types::{AttributeType, Tid};

/// Result type for column operations
pub type Result<T> = std::result::Result<T, ColumnError>;

/// Column store error types
#[derive(Error, Debug)]
pub enum ColumnError {
    // Access errors
    #[error("Row {tid} out of bounds for column with {len} rows")]
    IndexOutOfBounds { tid: Tid, len: usize },

    #[error("Position list must be strictly ascending")]
    UnsortedPositions,

    // Type errors
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: AttributeType, actual: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    // Persistence errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid snapshot format: {0}")]
    Format(String),

    #[error("Checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("Serialization error: {0}")]
    Serialization(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<bincode::Error> for ColumnError {
    fn from(e: bincode::Error) -> Self {
        match *e {
            bincode::ErrorKind::Io(io) => ColumnError::Io(io),
            other => ColumnError::Serialization(other.to_string()),
        }
    }
}

impl ColumnError {
    pub(crate) fn type_mismatch(expected: AttributeType, actual: impl Into<String>) -> Self {
        ColumnError::TypeMismatch {
            expected,
            actual: actual.into(),
        }
    }

    /// Check if error indicates a damaged snapshot
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            ColumnError::Format(_) | ColumnError::ChecksumMismatch { .. } | ColumnError::Serialization(_)
        )
    }

    /// Get error code for FFI
    pub fn code(&self) -> i32 {
        match self {
            ColumnError::IndexOutOfBounds { .. } => 1,
            ColumnError::UnsortedPositions => 2,
            ColumnError::TypeMismatch { .. } => 3,
            ColumnError::InvalidArgument(_) => 4,
            ColumnError::UnsupportedOperation(_) => 5,
            ColumnError::Arithmetic(_) => 6,
            ColumnError::Io(_) => 7,
            ColumnError::Format(_) => 8,
            ColumnError::ChecksumMismatch { .. } => 9,
            ColumnError::Serialization(_) => 10,
            ColumnError::InvalidConfig(_) => 11,
            ColumnError::Internal(_) => 99,
        }
    }
}
