//! Nearest-centroid classifier: one mean point per label.

use std::collections::BTreeMap;

use log::debug;
use num_traits::Float;

use super::distance::{KnnDistance, Metric};
use crate::common_types::{check_query, zip_labeled, DataPoint};
use crate::error::{KnnError, Result};

#[derive(Debug)]
pub struct NearestCentroid<F, L, M = KnnDistance> {
    distance_metric: M,
    centroids: Vec<(L, Vec<F>)>, // ascending label order
    dimension: Option<usize>,
}

fn calculate_centroid<F: Float, L>(points: &[&DataPoint<F, L>], k_dimensions: usize) -> Vec<F> {
    let mut centroid_coords = vec![F::zero(); k_dimensions];
    if points.is_empty() {
        return centroid_coords;
    }
    let num_points = F::from(points.len()).unwrap_or_else(F::one);

    for point in points {
        for (coord, &value) in centroid_coords.iter_mut().zip(&point.features) {
            *coord = *coord + value;
        }
    }
    for coord in centroid_coords.iter_mut() {
        *coord = *coord / num_points;
    }
    centroid_coords
}

impl<F, L, M> NearestCentroid<F, L, M>
where
    F: Float,
    L: Clone + Ord,
    M: Metric<F>,
{
    pub fn new(distance_metric: M) -> Self {
        Self { distance_metric, centroids: Vec::new(), dimension: None }
    }

    /// Computes the per-label mean of the training points.
    pub fn fit(&mut self, points: Vec<Vec<F>>, labels: Vec<L>) -> Result<()> {
        self.centroids.clear();
        self.dimension = None;

        let training_data = zip_labeled(points, labels)?;
        let Some(first) = training_data.first() else {
            return Err(KnnError::EmptyTrainingSet);
        };
        self.distance_metric.validate()?;
        let k_dimensions = first.features.len();

        let mut by_label: BTreeMap<&L, Vec<&DataPoint<F, L>>> = BTreeMap::new();
        for point in &training_data {
            by_label.entry(&point.label).or_default().push(point);
        }
        self.centroids = by_label
            .into_iter()
            .map(|(label, members)| (label.clone(), calculate_centroid(&members, k_dimensions)))
            .collect();
        self.dimension = Some(k_dimensions);

        debug!("Fitted nearest-centroid model with {} classes", self.centroids.len());
        Ok(())
    }

    pub fn predict_single(&self, test_sample_features: &[F]) -> Result<L> {
        if self.centroids.is_empty() {
            return Err(KnnError::NotFitted);
        }
        check_query(self.dimension, test_sample_features)?;

        let mut best: Option<(f64, &L)> = None;
        for (label, centroid) in &self.centroids {
            let distance = self.distance_metric.distance(test_sample_features, centroid);
            if best.map_or(true, |(best_distance, _)| distance < best_distance) {
                best = Some((distance, label));
            }
        }
        best.map(|(_, label)| label.clone()).ok_or(KnnError::NotFitted)
    }

    pub fn predict(&self, test_data: &[Vec<F>]) -> Result<Vec<L>> {
        test_data.iter().map(|sample| self.predict_single(sample)).collect()
    }

    pub fn distance_metric(&self) -> &M {
        &self.distance_metric
    }

    /// `(label, centroid)` pairs in ascending label order.
    pub fn centroids(&self) -> &[(L, Vec<F>)] {
        &self.centroids
    }
}
