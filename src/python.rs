//! Python bindings, built with the `python` feature.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::KnnError;
use crate::knn::distance::{euclidean_distance, manhattan_distance};
use crate::knn::{
    BallTreeConfig, KnnClassifier, KnnDistance, NearestCentroid,
    SearchStrategy as RustSearchStrategy,
};

impl From<KnnError> for PyErr {
    fn from(err: KnnError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

fn check_same_length(a: &[f64], b: &[f64]) -> PyResult<()> {
    if a.len() != b.len() {
        return Err(PyValueError::new_err("Input vectors must have the same length."));
    }
    Ok(())
}

/// Calculates the Euclidean distance between two vectors of f64.
#[pyfunction]
fn euclidean_distance_py(a: Vec<f64>, b: Vec<f64>) -> PyResult<f64> {
    check_same_length(&a, &b)?;
    Ok(euclidean_distance(&a, &b))
}

/// Calculates the Manhattan distance between two vectors of f64.
#[pyfunction]
fn manhattan_distance_py(a: Vec<f64>, b: Vec<f64>) -> PyResult<f64> {
    check_same_length(&a, &b)?;
    Ok(manhattan_distance(&a, &b))
}

/// Python-friendly representation of KnnDistance
#[pyclass(name = "KnnDistance")]
#[derive(Clone)]
enum PyKnnDistance {
    Euclidean,
    SquaredEuclidean,
    Manhattan,
    Chebyshev,
}

impl From<PyKnnDistance> for KnnDistance {
    fn from(val: PyKnnDistance) -> Self {
        match val {
            PyKnnDistance::Euclidean => KnnDistance::Euclidean,
            PyKnnDistance::SquaredEuclidean => KnnDistance::SquaredEuclidean,
            PyKnnDistance::Manhattan => KnnDistance::Manhattan,
            PyKnnDistance::Chebyshev => KnnDistance::Chebyshev,
        }
    }
}

/// Python-friendly representation of SearchStrategy
#[pyclass(name = "SearchStrategy")]
#[derive(Clone, Debug)]
enum PySearchStrategy {
    BruteForce,
    BallTree,
}

impl From<RustSearchStrategy> for PySearchStrategy {
    fn from(val: RustSearchStrategy) -> Self {
        match val {
            RustSearchStrategy::BruteForce => PySearchStrategy::BruteForce,
            RustSearchStrategy::BallTree => PySearchStrategy::BallTree,
        }
    }
}

impl From<PySearchStrategy> for RustSearchStrategy {
    fn from(val: PySearchStrategy) -> Self {
        match val {
            PySearchStrategy::BruteForce => RustSearchStrategy::BruteForce,
            PySearchStrategy::BallTree => RustSearchStrategy::BallTree,
        }
    }
}

#[pyclass(name = "KnnClassifier")]
struct PyKnnClassifier {
    classifier: KnnClassifier<f64, String>,
}

#[pymethods]
impl PyKnnClassifier {
    #[new]
    #[pyo3(signature = (k, distance_metric, leaf_size = 20, seed = 0, search_strategy = None))]
    fn new(
        k: usize,
        distance_metric: PyKnnDistance,
        leaf_size: usize,
        seed: u64,
        search_strategy: Option<PySearchStrategy>,
    ) -> Self {
        let config = BallTreeConfig::default().with_leaf_size(leaf_size).with_seed(seed);
        let strategy = search_strategy.map(RustSearchStrategy::from).unwrap_or_default();
        PyKnnClassifier {
            classifier: KnnClassifier::new(k, distance_metric.into())
                .with_config(config)
                .with_search_strategy(strategy),
        }
    }

    fn fit(&mut self, points: Vec<Vec<f64>>, labels: Vec<String>) -> PyResult<()> {
        Ok(self.classifier.fit(points, labels)?)
    }

    fn predict_single(&self, test_sample_features: Vec<f64>) -> PyResult<String> {
        Ok(self.classifier.predict_single(&test_sample_features)?)
    }

    fn predict(&self, test_data: Vec<Vec<f64>>) -> PyResult<Vec<String>> {
        Ok(self.classifier.predict(&test_data)?)
    }

    /// Returns `(distance, label)` pairs of the nearest training points, closest first.
    fn kneighbors(&self, test_sample_features: Vec<f64>) -> PyResult<Vec<(f64, String)>> {
        Ok(self.classifier.kneighbors(&test_sample_features)?)
    }

    #[getter]
    fn search_strategy(&self) -> PySearchStrategy {
        self.classifier.get_search_strategy().into()
    }
}

#[pyclass(name = "NearestCentroid")]
struct PyNearestCentroid {
    model: NearestCentroid<f64, String>,
}

#[pymethods]
impl PyNearestCentroid {
    #[new]
    fn new(distance_metric: PyKnnDistance) -> Self {
        PyNearestCentroid { model: NearestCentroid::new(distance_metric.into()) }
    }

    fn fit(&mut self, points: Vec<Vec<f64>>, labels: Vec<String>) -> PyResult<()> {
        Ok(self.model.fit(points, labels)?)
    }

    fn predict(&self, test_data: Vec<Vec<f64>>) -> PyResult<Vec<String>> {
        Ok(self.model.predict(&test_data)?)
    }
}

/// The name of this function must match `lib.name` in `Cargo.toml`.
#[pymodule]
fn balltree_knn(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(euclidean_distance_py, m)?)?;
    m.add_function(wrap_pyfunction!(manhattan_distance_py, m)?)?;
    m.add_class::<PyKnnDistance>()?;
    m.add_class::<PySearchStrategy>()?;
    m.add_class::<PyKnnClassifier>()?;
    m.add_class::<PyNearestCentroid>()?;
    Ok(())
}
