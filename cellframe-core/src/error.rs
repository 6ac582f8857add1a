//! Structured error types for the cellframe crates.

use thiserror::Error;

/// Unified error type for all cellframe operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CellframeError {
    /// Invalid input (bad arguments, empty data, shape mismatch)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A column has the wrong type for the requested operation
    #[error("type error: {0}")]
    Type(String),

    /// Key absent from every namespace of the dataset
    #[error("key '{key}' not found in the data")]
    KeyNotFound { key: String },

    /// Key set straddles namespaces that cannot be joined positionally
    #[error("conflicting keys: {0}")]
    ConflictingKeys(String),

    /// No single axis holds every requested key
    #[error("could not determine the axis with given keys ({keys:?})")]
    AxisUnresolved { keys: Vec<String> },

    /// Axis omitted for a frame with no keys to infer it from
    #[error("axis must be given when no keys are requested")]
    AxisRequired,

    /// Paired sequences of unequal, non-broadcastable length
    #[error("length of left ({left}) and right ({right}) must be the same, or one of them must be of length 1")]
    ConflictingLength { left: usize, right: usize },
}

/// Convenience alias used throughout the cellframe crates.
pub type Result<T> = std::result::Result<T, CellframeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let e = CellframeError::KeyNotFound { key: "CD3E".into() };
        assert_eq!(e.to_string(), "key 'CD3E' not found in the data");

        let e = CellframeError::ConflictingLength { left: 3, right: 2 };
        assert!(e.to_string().contains("left (3)"));

        let e = CellframeError::AxisUnresolved {
            keys: vec!["a".into(), "b".into()],
        };
        assert!(e.to_string().contains("\"a\""));
    }
}
