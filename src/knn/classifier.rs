//! The k-nearest-neighbors classifier built on top of the ball tree.

use std::collections::HashMap;
use std::hash::Hash;

use log::debug;
use num_traits::Float;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ball_tree::{BallTree, BallTreeConfig};
use super::brute_force;
use super::distance::{KnnDistance, Metric};
use crate::common_types::{check_dimensions, check_query, zip_labeled, DataPoint};
use crate::error::{KnnError, Result};

/// Defines the search strategy used by the classifier to find neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchStrategy {
    BruteForce,
    #[default]
    BallTree,
}

#[derive(Debug)]
enum FittedIndex<F, L, M> {
    BruteForce {
        training_data: Vec<DataPoint<F, L>>,
        dimension: Option<usize>,
        metric: M,
    },
    BallTree(BallTree<F, L, M>),
}

/// The K-Nearest Neighbors Classifier.
///
/// Predictions take a majority vote over the labels of the `n_neighbors`
/// closest training points. A tie between labels goes to the smallest label,
/// so the same model always predicts the same label for the same input.
#[derive(Debug)]
pub struct KnnClassifier<F, L, M = KnnDistance> {
    n_neighbors: usize,
    distance_metric: M,
    config: BallTreeConfig,
    search_strategy: SearchStrategy,
    index: Option<FittedIndex<F, L, M>>,
}

impl<F, L, M> KnnClassifier<F, L, M>
where
    F: Float,
    L: Clone + Eq + Hash + Ord,
    M: Metric<F> + Clone,
{
    pub fn new(n_neighbors: usize, distance_metric: M) -> Self {
        Self {
            n_neighbors,
            distance_metric,
            config: BallTreeConfig::default(),
            search_strategy: SearchStrategy::default(),
            index: None,
        }
    }

    /// Sets the leaf size and seed of the tree built by `fit`.
    pub fn with_config(mut self, config: BallTreeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_search_strategy(mut self, search_strategy: SearchStrategy) -> Self {
        self.search_strategy = search_strategy;
        self
    }

    /// Trains the classifier on a point matrix and its labels.
    ///
    /// Any previous fit is discarded, even when this one fails.
    pub fn fit(&mut self, points: Vec<Vec<F>>, labels: Vec<L>) -> Result<()> {
        self.index = None;
        let training_data = zip_labeled(points, labels)?;
        self.fit_data_points(training_data)
    }

    pub fn fit_data_points(&mut self, training_data: Vec<DataPoint<F, L>>) -> Result<()> {
        self.index = None;
        if training_data.is_empty() {
            return Err(KnnError::EmptyTrainingSet);
        }
        self.distance_metric.validate()?;

        let n_points = training_data.len();
        let index = match self.search_strategy {
            SearchStrategy::BruteForce => {
                let dimension = check_dimensions(&training_data)?;
                let metric = self.distance_metric.clone();
                FittedIndex::BruteForce { training_data, dimension, metric }
            }
            SearchStrategy::BallTree => FittedIndex::BallTree(BallTree::from_data_points(
                training_data,
                self.distance_metric.clone(),
                &self.config,
            )?),
        };
        debug!(
            "Fitted k-NN classifier on {} points using {:?} search",
            n_points, self.search_strategy
        );
        self.index = Some(index);
        Ok(())
    }

    /// Returns the `(distance, label)` pairs of the nearest training points, closest first.
    pub fn kneighbors(&self, test_sample_features: &[F]) -> Result<Vec<(f64, L)>> {
        if self.n_neighbors == 0 {
            return Err(KnnError::InvalidParameter(
                "n_neighbors must be greater than 0".to_string(),
            ));
        }
        match self.index.as_ref().ok_or(KnnError::NotFitted)? {
            FittedIndex::BruteForce { training_data, dimension, metric } => {
                check_query(*dimension, test_sample_features)?;
                Ok(brute_force::k_nearest(
                    training_data,
                    test_sample_features,
                    self.n_neighbors,
                    metric,
                ))
            }
            FittedIndex::BallTree(tree) => {
                tree.find_k_nearest(self.n_neighbors, test_sample_features)
            }
        }
    }

    /// Predicts the label for a single test sample.
    pub fn predict_single(&self, test_sample_features: &[F]) -> Result<L> {
        let neighbors = self.kneighbors(test_sample_features)?;
        // A fitted index is never empty, so there is always at least one vote.
        majority_vote(neighbors.iter().map(|(_, label)| label)).ok_or(KnnError::NotFitted)
    }

    /// Predicts labels for a batch of test samples.
    pub fn predict(&self, test_data: &[Vec<F>]) -> Result<Vec<L>> {
        test_data.iter().map(|sample| self.predict_single(sample)).collect()
    }

    pub fn distance_metric(&self) -> &M {
        &self.distance_metric
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    pub fn config(&self) -> &BallTreeConfig {
        &self.config
    }

    pub fn get_search_strategy(&self) -> SearchStrategy {
        self.search_strategy
    }

    pub fn is_fitted(&self) -> bool {
        self.index.is_some()
    }

    /// The tree built by the last successful `fit`, if the strategy uses one.
    pub fn ball_tree(&self) -> Option<&BallTree<F, L, M>> {
        match &self.index {
            Some(FittedIndex::BallTree(tree)) => Some(tree),
            _ => None,
        }
    }
}

/// Returns the most frequent label, breaking ties toward the smallest label.
pub fn majority_vote<'a, L, I>(labels: I) -> Option<L>
where
    L: 'a + Clone + Eq + Hash + Ord,
    I: IntoIterator<Item = &'a L>,
{
    let mut label_counts: HashMap<&L, usize> = HashMap::new();
    for label in labels {
        *label_counts.entry(label).or_insert(0) += 1;
    }
    label_counts
        .into_iter()
        .max_by(|(label_a, count_a), (label_b, count_b)| {
            count_a.cmp(count_b).then_with(|| label_b.cmp(label_a))
        })
        .map(|(label, _)| label.clone())
}
