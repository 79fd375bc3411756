//! Linear-scan nearest-neighbor search.
//!
//! Used by the classifier's `BruteForce` strategy and as the reference the
//! ball tree is checked against.

use super::distance::Metric;
use crate::common_types::DataPoint;

/// Returns the `min(k, data.len())` closest `(distance, label)` pairs, closest first.
pub fn k_nearest<F, L, M>(
    data: &[DataPoint<F, L>],
    query: &[F],
    k: usize,
    metric: &M,
) -> Vec<(f64, L)>
where
    L: Clone,
    M: Metric<F> + ?Sized,
{
    let mut distances_to_train: Vec<(f64, &L)> = data
        .iter()
        .map(|train_sample| (metric.distance(&train_sample.features, query), &train_sample.label))
        .collect();

    distances_to_train.sort_by(|a, b| a.0.total_cmp(&b.0));

    distances_to_train
        .into_iter()
        .take(k)
        .map(|(distance, label)| (distance, label.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knn::distance::KnnDistance;

    fn sample_data() -> Vec<DataPoint<f64, i32>> {
        vec![
            DataPoint::new(vec![1.0, 1.0], 1),
            DataPoint::new(vec![2.0, 2.0], 2),
            DataPoint::new(vec![1.0, 2.0], 3),
            DataPoint::new(vec![10.0, 10.0], 4),
        ]
    }

    #[test]
    fn test_k_nearest_orders_by_distance() {
        let neighbors = k_nearest(&sample_data(), &[1.2, 1.2], 3, &KnnDistance::Euclidean);
        let labels: Vec<i32> = neighbors.iter().map(|(_, l)| *l).collect();
        assert_eq!(labels, vec![1, 3, 2]);
        assert!((neighbors[0].0 - 0.08_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_k_nearest_caps_at_dataset_size() {
        assert_eq!(k_nearest(&sample_data(), &[0.0, 0.0], 10, &KnnDistance::Manhattan).len(), 4);
        assert!(k_nearest(&sample_data(), &[0.0, 0.0], 0, &KnnDistance::Manhattan).is_empty());
    }
}
