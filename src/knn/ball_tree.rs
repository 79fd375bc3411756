//! Ball tree over labeled points with exact k-nearest-neighbor search.
//!
//! Each split picks two training points at random as pivots and sends every
//! point to the pivot it is strictly closer to (ties go right). The children
//! remember their pivot and the distance to their farthest point, which gives
//! the search a lower bound `distance(query, pivot) - radius` for skipping
//! whole subtrees. Pivot selection draws from an explicit RNG so a tree built
//! from the same data and seed always has the same shape.

use log::{debug, trace};
use num_traits::Float;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::distance::Metric;
use super::heap_utils::KBestNeighbors;
use crate::common_types::{check_dimensions, check_query, zip_labeled, DataPoint};
use crate::error::{KnnError, Result};

/// Construction parameters for a [`BallTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BallTreeConfig {
    /// A node with fewer points than this becomes a leaf.
    pub leaf_size: usize,
    /// Seed for pivot selection.
    pub seed: u64,
}

impl BallTreeConfig {
    pub const DEFAULT_LEAF_SIZE: usize = 20;

    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for BallTreeConfig {
    fn default() -> Self {
        Self { leaf_size: Self::DEFAULT_LEAF_SIZE, seed: 0 }
    }
}

#[derive(Debug, Clone)]
pub enum BallNodeContents<F, L> {
    Internal {
        left_child: Box<BallTreeNode<F, L>>,
        right_child: Box<BallTreeNode<F, L>>,
    },
    Leaf {
        points: Vec<DataPoint<F, L>>,
    },
}

/// A child ball: the pivot it was split around, the distance from the pivot
/// to its farthest point, and what it holds.
#[derive(Debug, Clone)]
pub struct BallTreeNode<F, L> {
    pub pivot: Vec<F>,
    pub radius: f64,
    pub contents: BallNodeContents<F, L>,
}

impl<F, L> BallNodeContents<F, L> {
    fn depth(&self) -> usize {
        match self {
            BallNodeContents::Leaf { .. } => 1,
            BallNodeContents::Internal { left_child, right_child } => {
                1 + left_child.contents.depth().max(right_child.contents.depth())
            }
        }
    }

    fn node_count(&self) -> usize {
        match self {
            BallNodeContents::Leaf { .. } => 1,
            BallNodeContents::Internal { left_child, right_child } => {
                1 + left_child.contents.node_count() + right_child.contents.node_count()
            }
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            BallNodeContents::Leaf { .. } => 1,
            BallNodeContents::Internal { left_child, right_child } => {
                left_child.contents.leaf_count() + right_child.contents.leaf_count()
            }
        }
    }

    /// Number of points stored in the leaves below this node.
    pub fn point_count(&self) -> usize {
        match self {
            BallNodeContents::Leaf { points } => points.len(),
            BallNodeContents::Internal { left_child, right_child } => {
                left_child.contents.point_count() + right_child.contents.point_count()
            }
        }
    }
}

/// Counters collected during a single k-nearest-neighbor search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes_visited: usize,
    pub leaves_visited: usize,
    pub subtrees_pruned: usize,
    pub distance_evaluations: usize,
}

/// Represents the Ball Tree itself.
///
/// The tree is immutable once built; every query takes `&self`.
#[derive(Debug, Clone)]
pub struct BallTree<F, L, M> {
    root: BallNodeContents<F, L>,
    metric: M,
    dimension: Option<usize>,
    size: usize,
    leaf_size: usize,
}

impl<F, L, M> BallTree<F, L, M>
where
    F: Float,
    M: Metric<F>,
{
    /// Builds a tree from a point matrix and its labels, seeding pivot
    /// selection from `config.seed`.
    pub fn build(
        points: Vec<Vec<F>>,
        labels: Vec<L>,
        metric: M,
        config: &BallTreeConfig,
    ) -> Result<Self> {
        let data = zip_labeled(points, labels)?;
        Self::from_data_points(data, metric, config)
    }

    /// Builds a tree, drawing pivots from the caller's random source.
    pub fn build_with_rng<R: Rng + ?Sized>(
        points: Vec<Vec<F>>,
        labels: Vec<L>,
        metric: M,
        leaf_size: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let data = zip_labeled(points, labels)?;
        Self::from_data_points_with_rng(data, metric, leaf_size, rng)
    }

    pub fn from_data_points(
        data: Vec<DataPoint<F, L>>,
        metric: M,
        config: &BallTreeConfig,
    ) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        Self::from_data_points_with_rng(data, metric, config.leaf_size, &mut rng)
    }

    pub fn from_data_points_with_rng<R: Rng + ?Sized>(
        data: Vec<DataPoint<F, L>>,
        metric: M,
        leaf_size: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if leaf_size == 0 {
            return Err(KnnError::InvalidParameter("leaf_size must be greater than 0".to_string()));
        }
        metric.validate()?;
        let dimension = check_dimensions(&data)?;
        let size = data.len();
        let root = Self::build_recursive(data, leaf_size, &metric, rng);
        let tree = BallTree { root, metric, dimension, size, leaf_size };
        debug!(
            "Built ball tree over {} points (leaf_size {}): depth {}, {} nodes",
            size,
            leaf_size,
            tree.depth(),
            tree.node_count()
        );
        Ok(tree)
    }

    fn build_recursive<R: Rng + ?Sized>(
        points: Vec<DataPoint<F, L>>,
        leaf_size: usize,
        metric: &M,
        rng: &mut R,
    ) -> BallNodeContents<F, L> {
        // Two distinct pivots are needed to split.
        if points.len() < leaf_size.max(2) {
            return BallNodeContents::Leaf { points };
        }

        let picked = index::sample(rng, points.len(), 2);
        let left_pivot = points[picked.index(0)].features.clone();
        let right_pivot = points[picked.index(1)].features.clone();

        // (goes_left, distance to the pivot of the chosen side)
        let assignments: Vec<(bool, f64)> = points
            .iter()
            .map(|point| {
                let to_left = metric.distance(&point.features, &left_pivot);
                let to_right = metric.distance(&point.features, &right_pivot);
                if to_left < to_right { (true, to_left) } else { (false, to_right) }
            })
            .collect();

        let left_count = assignments.iter().filter(|(goes_left, _)| *goes_left).count();
        if left_count == 0 || left_count == points.len() {
            trace!("Degenerate partition of {} points, keeping them in one leaf", points.len());
            return BallNodeContents::Leaf { points };
        }

        let mut left_points = Vec::with_capacity(left_count);
        let mut right_points = Vec::with_capacity(points.len() - left_count);
        let mut left_radius = 0.0_f64;
        let mut right_radius = 0.0_f64;
        for (point, (goes_left, distance)) in points.into_iter().zip(assignments) {
            if goes_left {
                left_radius = left_radius.max(distance);
                left_points.push(point);
            } else {
                right_radius = right_radius.max(distance);
                right_points.push(point);
            }
        }

        let left_child = BallTreeNode {
            contents: Self::build_recursive(left_points, leaf_size, metric, rng),
            pivot: left_pivot,
            radius: left_radius,
        };
        let right_child = BallTreeNode {
            contents: Self::build_recursive(right_points, leaf_size, metric, rng),
            pivot: right_pivot,
            radius: right_radius,
        };
        BallNodeContents::Internal {
            left_child: Box::new(left_child),
            right_child: Box::new(right_child),
        }
    }

    /// Looks up the label of a point equal to `point` component-wise.
    ///
    /// The lookup follows a single path, always stepping into the child whose
    /// pivot is closer, and never backtracks. It reliably finds the training
    /// points of this tree, but an equal point that landed on the other side
    /// of an ambiguous split is not searched for.
    pub fn find(&self, point: &[F]) -> Result<Option<&L>> {
        check_query(self.dimension, point)?;
        let mut node = &self.root;
        loop {
            match node {
                BallNodeContents::Leaf { points } => {
                    return Ok(points
                        .iter()
                        .find(|candidate| candidate.features.as_slice() == point)
                        .map(|candidate| &candidate.label));
                }
                BallNodeContents::Internal { left_child, right_child } => {
                    // Same argument order as during construction.
                    let to_left = self.metric.distance(point, &left_child.pivot);
                    let to_right = self.metric.distance(point, &right_child.pivot);
                    node = if to_left < to_right {
                        &left_child.contents
                    } else {
                        &right_child.contents
                    };
                }
            }
        }
    }

    /// Returns the `min(k, size())` nearest `(distance, label)` pairs, closest first.
    pub fn find_k_nearest(&self, k: usize, point: &[F]) -> Result<Vec<(f64, L)>>
    where
        L: Clone,
    {
        self.find_k_nearest_with_stats(k, point).map(|(neighbors, _)| neighbors)
    }

    /// Same as [`find_k_nearest`](Self::find_k_nearest), also reporting how much
    /// of the tree the search touched.
    pub fn find_k_nearest_with_stats(
        &self,
        k: usize,
        point: &[F],
    ) -> Result<(Vec<(f64, L)>, SearchStats)>
    where
        L: Clone,
    {
        check_query(self.dimension, point)?;
        let k = k.min(self.size);
        let mut stats = SearchStats::default();
        if k == 0 {
            return Ok((Vec::new(), stats));
        }

        let mut best_k = KBestNeighbors::new(k);
        self.search_nn_recursive(&self.root, point, k, &mut best_k, &mut stats);
        let neighbors = best_k
            .into_sorted_pairs()
            .into_iter()
            .map(|(distance, label)| (distance, label.clone()))
            .collect();
        Ok((neighbors, stats))
    }

    fn search_nn_recursive<'a>(
        &self,
        node: &'a BallNodeContents<F, L>,
        target: &[F],
        k: usize,
        best_k: &mut KBestNeighbors<&'a L>,
        stats: &mut SearchStats,
    ) {
        stats.nodes_visited += 1;
        match node {
            BallNodeContents::Leaf { points } => {
                stats.leaves_visited += 1;
                stats.distance_evaluations += points.len();
                let mut distances: Vec<(f64, usize)> = points
                    .iter()
                    .enumerate()
                    .map(|(i, point)| (self.metric.distance(&point.features, target), i))
                    .collect();
                if k < distances.len() {
                    distances.select_nth_unstable_by(k - 1, |a, b| a.0.total_cmp(&b.0));
                    distances.truncate(k);
                }
                for (distance, i) in distances {
                    best_k.add(distance, &points[i].label);
                }
            }
            BallNodeContents::Internal { left_child, right_child } => {
                stats.distance_evaluations += 2;
                let to_left = self.metric.distance(target, &left_child.pivot);
                let to_right = self.metric.distance(target, &right_child.pivot);

                // Nearer child first: it tends to tighten the bound before the other is checked.
                let ordered = if to_left < to_right {
                    [(left_child, to_left), (right_child, to_right)]
                } else {
                    [(right_child, to_right), (left_child, to_left)]
                };
                for (child, to_pivot) in ordered {
                    if best_k.admits(self.metric.lower_bound(to_pivot, child.radius)) {
                        self.search_nn_recursive(&child.contents, target, k, best_k, stats);
                    } else {
                        stats.subtrees_pruned += 1;
                    }
                }
            }
        }
    }

    /// Returns every `(distance, label)` within `radius` of `point`, in no particular order.
    pub fn find_within_radius(&self, point: &[F], radius: f64) -> Result<Vec<(f64, L)>>
    where
        L: Clone,
    {
        check_query(self.dimension, point)?;
        let mut found_points = Vec::new();
        if radius >= 0.0 {
            self.search_radius_recursive(&self.root, point, radius, &mut found_points);
        }
        Ok(found_points)
    }

    fn search_radius_recursive(
        &self,
        node: &BallNodeContents<F, L>,
        target: &[F],
        radius: f64,
        found_points: &mut Vec<(f64, L)>,
    ) where
        L: Clone,
    {
        match node {
            BallNodeContents::Leaf { points } => {
                for point in points {
                    let distance = self.metric.distance(&point.features, target);
                    if distance <= radius {
                        found_points.push((distance, point.label.clone()));
                    }
                }
            }
            BallNodeContents::Internal { left_child, right_child } => {
                for child in [left_child, right_child] {
                    let to_pivot = self.metric.distance(target, &child.pivot);
                    if self.metric.lower_bound(to_pivot, child.radius) <= radius {
                        self.search_radius_recursive(&child.contents, target, radius, found_points);
                    }
                }
            }
        }
    }
}

impl<F, L, M> BallTree<F, L, M> {
    /// Number of levels; a tree that is a single leaf has depth 1.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Number of training points held by the tree.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Feature count of the training points, `None` for an empty tree.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    pub fn root(&self) -> &BallNodeContents<F, L> {
        &self.root
    }
}
