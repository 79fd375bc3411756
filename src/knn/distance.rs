//! Distance functions used by the ball tree and the classifiers.

use num_traits::{AsPrimitive, Float};

use crate::error::{KnnError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A distance over fixed-length feature vectors.
///
/// Implementations must be non-negative and symmetric, and must respect the
/// triangle inequality for `lower_bound` to be a valid pruning bound. Metrics
/// that do not (such as squared Euclidean) override `lower_bound`.
pub trait Metric<F> {
    fn distance(&self, a: &[F], b: &[F]) -> f64;

    /// Smallest distance from the query to any point inside a ball, given the
    /// query's distance to the ball's pivot and the ball's radius.
    fn lower_bound(&self, distance_to_pivot: f64, radius: f64) -> f64 {
        distance_to_pivot - radius
    }

    /// Rejects parameterizations that do not define a distance.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl<F, G> Metric<F> for G
where
    G: Fn(&[F], &[F]) -> f64,
{
    fn distance(&self, a: &[F], b: &[F]) -> f64 {
        self(a, b)
    }
}

/// Built-in metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum KnnDistance {
    Euclidean,
    /// Sum of squared differences. Cheaper than `Euclidean` and ranks points
    /// identically, but only the overridden bound keeps pruning exact.
    SquaredEuclidean,
    Manhattan,
    Chebyshev,
    Minkowski { p: u32 }, // p is the order, in 1..=i32::MAX
}

impl<F> Metric<F> for KnnDistance
where
    F: Float + AsPrimitive<f64>,
{
    fn distance(&self, a: &[F], b: &[F]) -> f64 {
        match *self {
            KnnDistance::Euclidean => squared_euclidean_distance(a, b).sqrt(),
            KnnDistance::SquaredEuclidean => squared_euclidean_distance(a, b),
            KnnDistance::Manhattan => manhattan_distance(a, b),
            KnnDistance::Chebyshev => chebyshev_distance(a, b),
            KnnDistance::Minkowski { p } => minkowski_distance(a, b, p),
        }
    }

    fn lower_bound(&self, distance_to_pivot: f64, radius: f64) -> f64 {
        match self {
            // |q - x| >= |q - p| - |p - x|, bounded in root space then squared back.
            KnnDistance::SquaredEuclidean => {
                let gap = distance_to_pivot.sqrt() - radius.sqrt();
                if gap > 0.0 { gap * gap } else { 0.0 }
            }
            _ => distance_to_pivot - radius,
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            KnnDistance::Minkowski { p: 0 } => Err(KnnError::InvalidParameter(
                "Minkowski order p must be at least 1".to_string(),
            )),
            KnnDistance::Minkowski { p } if i32::try_from(*p).is_err() => {
                Err(KnnError::InvalidParameter(format!(
                    "Minkowski order p must be at most {}, got {}",
                    i32::MAX,
                    p
                )))
            }
            _ => Ok(()),
        }
    }
}

pub fn squared_euclidean_distance<F>(a: &[F], b: &[F]) -> f64
where
    F: Float + AsPrimitive<f64>,
{
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let diff: f64 = (x - y).as_();
            diff * diff
        })
        .sum()
}

pub fn euclidean_distance<F>(a: &[F], b: &[F]) -> f64
where
    F: Float + AsPrimitive<f64>,
{
    squared_euclidean_distance(a, b).sqrt()
}

pub fn manhattan_distance<F>(a: &[F], b: &[F]) -> f64
where
    F: Float + AsPrimitive<f64>,
{
    a.iter().zip(b.iter()).map(|(&x, &y)| (x - y).abs().as_()).sum()
}

pub fn chebyshev_distance<F>(a: &[F], b: &[F]) -> f64
where
    F: Float + AsPrimitive<f64>,
{
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - y).abs().as_())
        .fold(0.0, f64::max)
}

/// Orders above `i32::MAX` are raised with `powf` instead of `powi`.
pub fn minkowski_distance<F>(a: &[F], b: &[F], p: u32) -> f64
where
    F: Float + AsPrimitive<f64>,
{
    let exponent = i32::try_from(p).ok();
    let sum_of_powers: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let diff: f64 = (x - y).abs().as_();
            match exponent {
                Some(n) => diff.powi(n),
                None => diff.powf(p as f64),
            }
        })
        .sum();
    sum_of_powers.powf(1.0 / (p as f64))
}
