//! Ball tree nearest-neighbor search with k-NN and nearest-centroid classifiers.

pub mod common_types;
pub mod error;
pub mod knn;

#[cfg(feature = "python")]
mod python;

pub use common_types::DataPoint;
pub use error::{KnnError, Result};
pub use knn::{
    BallTree, BallTreeConfig, KnnClassifier, KnnDistance, Metric, NearestCentroid, SearchStats,
    SearchStrategy,
};
