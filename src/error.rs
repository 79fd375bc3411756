//! Error types shared by the index and the classifiers built on it.

use thiserror::Error;

/// Errors raised while building a tree, fitting a classifier or querying either.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KnnError {
    /// The point collection and the label collection differ in length.
    #[error("point/label count mismatch: {points} points but {labels} labels")]
    LengthMismatch { points: usize, labels: usize },

    /// A vector does not have the dimensionality of the training set.
    #[error("dimension mismatch: expected {expected} features, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// A configuration value is out of its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A classifier was asked to predict before `fit` was called.
    #[error("model is not fitted; call fit() first")]
    NotFitted,

    /// A classifier was fitted on an empty point set.
    #[error("cannot fit on an empty training set")]
    EmptyTrainingSet,
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, KnnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KnnError::DimensionMismatch { expected: 3, found: 2 };
        let display = format!("{}", err);
        assert!(display.contains("expected 3"));
        assert!(display.contains("found 2"));

        let err = KnnError::LengthMismatch { points: 4, labels: 5 };
        assert_eq!(err.to_string(), "point/label count mismatch: 4 points but 5 labels");
    }
}
