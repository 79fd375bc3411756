//! This module contains common data structures used across the nearest-neighbor algorithms.

use crate::error::{KnnError, Result};

/// Represents a single data point, with features and a label.
///
/// - `F`: The type of the features (e.g., `f64`, `f32`).
/// - `L`: The type of the label (e.g., `i32`, `String`, an enum).
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint<F, L> {
    pub features: Vec<F>,
    pub label: L,
}

impl<F, L> DataPoint<F, L> {
    pub fn new(features: Vec<F>, label: L) -> Self {
        DataPoint { features, label }
    }
}

/// Pairs a point matrix with its labels, row by row.
///
/// Fails when the two collections differ in length or when the rows do not
/// share one dimensionality.
pub fn zip_labeled<F, L>(points: Vec<Vec<F>>, labels: Vec<L>) -> Result<Vec<DataPoint<F, L>>> {
    if points.len() != labels.len() {
        return Err(KnnError::LengthMismatch { points: points.len(), labels: labels.len() });
    }
    let data: Vec<DataPoint<F, L>> = points
        .into_iter()
        .zip(labels)
        .map(|(features, label)| DataPoint { features, label })
        .collect();
    check_dimensions(&data)?;
    Ok(data)
}

/// Returns the shared dimensionality of `data`, or `None` when it is empty.
pub fn check_dimensions<F, L>(data: &[DataPoint<F, L>]) -> Result<Option<usize>> {
    let Some(first) = data.first() else {
        return Ok(None);
    };
    let expected = first.features.len();
    match data.iter().find(|p| p.features.len() != expected) {
        Some(p) => Err(KnnError::DimensionMismatch { expected, found: p.features.len() }),
        None => Ok(Some(expected)),
    }
}

/// Checks a query vector against the dimensionality of a fitted point set.
pub(crate) fn check_query<F>(dimension: Option<usize>, query: &[F]) -> Result<()> {
    match dimension {
        Some(expected) if expected != query.len() => {
            Err(KnnError::DimensionMismatch { expected, found: query.len() })
        }
        _ => Ok(()),
    }
}
