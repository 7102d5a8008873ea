//! K-Nearest Neighbors regression
//!
//! Multi-output KNN regressor. Neighbors are chosen from the features alone,
//! so every output column is averaged over the same neighbor set.

use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::models::{Estimator, ParamValue, Params};
use crate::error::{Result, TimeSeriesError};

/// Distance metric for KNN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Euclidean distance (L2)
    #[default]
    Euclidean,
    /// Manhattan distance (L1)
    Manhattan,
}

impl DistanceMetric {
    fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Manhattan => "manhattan",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "euclidean" => Some(DistanceMetric::Euclidean),
            "manhattan" => Some(DistanceMetric::Manhattan),
            _ => None,
        }
    }
}

/// Weighting scheme for neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeightScheme {
    /// All neighbors have equal weight
    #[default]
    Uniform,
    /// Closer neighbors have more weight (inverse distance)
    Distance,
}

impl WeightScheme {
    fn name(&self) -> &'static str {
        match self {
            WeightScheme::Uniform => "uniform",
            WeightScheme::Distance => "distance",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "uniform" => Some(WeightScheme::Uniform),
            "distance" => Some(WeightScheme::Distance),
            _ => None,
        }
    }
}

/// KNN configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNNConfig {
    /// Number of neighbors
    pub n_neighbors: usize,
    /// Distance metric
    pub metric: DistanceMetric,
    /// Weighting scheme
    pub weights: WeightScheme,
}

impl Default for KNNConfig {
    fn default() -> Self {
        Self {
            n_neighbors: 5,
            metric: DistanceMetric::Euclidean,
            weights: WeightScheme::Uniform,
        }
    }
}

/// K-Nearest Neighbors Regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNNRegressor {
    config: KNNConfig,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array2<f64>>,
}

impl Default for KNNRegressor {
    fn default() -> Self {
        Self::new(KNNConfig::default())
    }
}

impl KNNRegressor {
    pub fn new(config: KNNConfig) -> Self {
        Self {
            config,
            x_train: None,
            y_train: None,
        }
    }

    /// Create with default config and specified k
    pub fn with_k(k: usize) -> Self {
        Self::new(KNNConfig {
            n_neighbors: k,
            ..Default::default()
        })
    }

    pub fn with_weights(mut self, weights: WeightScheme) -> Self {
        self.config.weights = weights;
        self
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.config.metric = metric;
        self
    }

    pub fn config(&self) -> &KNNConfig {
        &self.config
    }
}

impl Estimator for KNNRegressor {
    /// Stores the training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array2<f64>) -> Result<()> {
        if self.config.n_neighbors == 0 {
            return Err(TimeSeriesError::invalid_parameter(
                "n_neighbors",
                self.config.n_neighbors,
                "expected a positive integer",
            ));
        }
        if x.nrows() != y.nrows() {
            return Err(TimeSeriesError::ShapeMismatch {
                expected: format!("y rows = {}", x.nrows()),
                actual: format!("y rows = {}", y.nrows()),
            });
        }
        if x.nrows() == 0 {
            return Err(TimeSeriesError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    /// Predict target rows (parallelized over test samples)
    fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (x_train, y_train) = match (&self.x_train, &self.y_train) {
            (Some(xt), Some(yt)) => (xt, yt),
            _ => return Err(TimeSeriesError::NotFitted),
        };
        if x.ncols() != x_train.ncols() {
            return Err(TimeSeriesError::ShapeMismatch {
                expected: format!("{} features", x_train.ncols()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let k = self.config.n_neighbors.min(x_train.nrows());
        let metric = self.config.metric;
        let weights = self.config.weights;
        let n_outputs = y_train.ncols();

        let rows: Vec<Vec<f64>> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let neighbors = find_k_nearest(x.row(i), x_train, k, metric);
                weighted_mean_rows(&neighbors, y_train, weights)
            })
            .collect();

        let data: Vec<f64> = rows.into_iter().flatten().collect();
        Ok(Array2::from_shape_vec((x.nrows(), n_outputs), data)?)
    }

    fn clone_unfitted(&self) -> Self {
        Self::new(self.config.clone())
    }

    fn get_params(&self) -> Params {
        let mut params = Params::new();
        params.insert("n_neighbors".to_string(), ParamValue::from(self.config.n_neighbors));
        params.insert("metric".to_string(), ParamValue::from(self.config.metric.name()));
        params.insert("weights".to_string(), ParamValue::from(self.config.weights.name()));
        params
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> Result<()> {
        match name {
            "n_neighbors" => {
                self.config.n_neighbors = value.as_usize().filter(|k| *k > 0).ok_or_else(|| {
                    TimeSeriesError::invalid_parameter(name, &value, "expected a positive integer")
                })?;
            }
            "metric" => {
                self.config.metric = value
                    .as_string()
                    .and_then(DistanceMetric::parse)
                    .ok_or_else(|| {
                        TimeSeriesError::invalid_parameter(name, &value, "expected \"euclidean\" or \"manhattan\"")
                    })?;
            }
            "weights" => {
                self.config.weights = value
                    .as_string()
                    .and_then(WeightScheme::parse)
                    .ok_or_else(|| {
                        TimeSeriesError::invalid_parameter(name, &value, "expected \"uniform\" or \"distance\"")
                    })?;
            }
            _ => return Err(TimeSeriesError::UnrecognizedParameter(name.to_string())),
        }
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        self.x_train.is_some()
    }
}

/// Max-heap entry for partial sort (keeps k smallest distances).
/// Ties break on training index so neighbor sets are deterministic.
#[derive(PartialEq)]
struct DistIndex(f64, usize);

impl Eq for DistIndex {}
impl PartialOrd for DistIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DistIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .partial_cmp(&other.0)
            .unwrap_or(Ordering::Equal)
            .then(self.1.cmp(&other.1))
    }
}

/// Find k nearest training rows using a max-heap, O(n log k)
fn find_k_nearest(
    point: ArrayView1<'_, f64>,
    x_train: &Array2<f64>,
    k: usize,
    metric: DistanceMetric,
) -> Vec<(f64, usize)> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (i, row) in x_train.rows().into_iter().enumerate() {
        let entry = DistIndex(compute_distance(point, row, metric), i);
        if heap.len() < k {
            heap.push(entry);
        } else if let Some(top) = heap.peek() {
            if entry < *top {
                heap.pop();
                heap.push(entry);
            }
        }
    }

    heap.into_sorted_vec().into_iter().map(|d| (d.0, d.1)).collect()
}

fn compute_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, metric: DistanceMetric) -> f64 {
    match metric {
        DistanceMetric::Euclidean => a
            .iter()
            .zip(b.iter())
            .map(|(ai, bi)| {
                let d = ai - bi;
                d * d
            })
            .sum::<f64>()
            .sqrt(),
        DistanceMetric::Manhattan => a.iter().zip(b.iter()).map(|(ai, bi)| (ai - bi).abs()).sum(),
    }
}

/// Average the neighbors' target rows.
/// With distance weighting, exact matches take all the weight.
fn weighted_mean_rows(neighbors: &[(f64, usize)], y_train: &Array2<f64>, weights: WeightScheme) -> Vec<f64> {
    let n_outputs = y_train.ncols();
    let exact: Vec<usize> = neighbors
        .iter()
        .filter(|(dist, _)| *dist == 0.0)
        .map(|(_, idx)| *idx)
        .collect();

    let weighted: Vec<(f64, usize)> = match weights {
        WeightScheme::Uniform => neighbors.iter().map(|&(_, idx)| (1.0, idx)).collect(),
        WeightScheme::Distance if !exact.is_empty() => exact.iter().map(|&idx| (1.0, idx)).collect(),
        WeightScheme::Distance => neighbors.iter().map(|&(dist, idx)| (1.0 / dist, idx)).collect(),
    };

    let total: f64 = weighted.iter().map(|(w, _)| w).sum();
    let mut out = vec![0.0; n_outputs];
    if total <= 0.0 {
        return out;
    }
    for (w, idx) in weighted {
        for (o, v) in out.iter_mut().zip(y_train.row(idx).iter()) {
            *o += w * v;
        }
    }
    out.iter_mut().for_each(|o| *o /= total);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_knn_regressor() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];

        let mut knn = KNNRegressor::with_k(3);
        knn.fit(&x, &y).unwrap();

        let predictions = knn.predict(&array![[2.0], [11.0]]).unwrap();
        assert!((predictions[[0, 0]] - 2.0).abs() < 1e-12);
        assert!((predictions[[1, 0]] - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_neighbors_rejected_at_fit() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![[0.0], [1.0], [2.0]];

        let mut knn = KNNRegressor::with_k(0);
        assert!(matches!(
            knn.fit(&x, &y),
            Err(TimeSeriesError::InvalidParameter { .. })
        ));
        assert!(!knn.is_fitted());

        let mut knn = KNNRegressor::new(KNNConfig {
            n_neighbors: 0,
            ..Default::default()
        });
        assert!(knn.fit(&x, &y).is_err());
    }

    #[test]
    fn test_multi_output_shares_neighbors() {
        let x = array![[0.0], [1.0], [5.0]];
        let y = array![[0.0, 100.0], [2.0, 200.0], [50.0, 900.0]];

        let mut knn = KNNRegressor::with_k(2);
        knn.fit(&x, &y).unwrap();

        let predictions = knn.predict(&array![[0.4]]).unwrap();
        assert_eq!(predictions, array![[1.0, 150.0]]);
    }

    #[test]
    fn test_distance_weighting_exact_match() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![[10.0], [20.0], [30.0]];

        let mut knn = KNNRegressor::with_k(3).with_weights(WeightScheme::Distance);
        knn.fit(&x, &y).unwrap();

        assert_eq!(knn.predict(&array![[1.0]]).unwrap(), array![[20.0]]);
    }

    #[test]
    fn test_k_larger_than_training_set() {
        let mut knn = KNNRegressor::with_k(10);
        knn.fit(&array![[0.0], [1.0]], &array![[2.0], [4.0]]).unwrap();
        assert_eq!(knn.predict(&array![[0.5]]).unwrap(), array![[3.0]]);
    }

    #[test]
    fn test_not_fitted() {
        let knn = KNNRegressor::default();
        assert!(matches!(
            knn.predict(&array![[1.0]]),
            Err(TimeSeriesError::NotFitted)
        ));
    }

    #[test]
    fn test_params() {
        let mut knn = KNNRegressor::default();
        knn.set_param("n_neighbors", ParamValue::Int(2)).unwrap();
        knn.set_param("weights", ParamValue::from("distance")).unwrap();
        knn.set_param("metric", ParamValue::from("manhattan")).unwrap();

        assert_eq!(knn.config().n_neighbors, 2);
        assert_eq!(knn.config().weights, WeightScheme::Distance);
        assert_eq!(knn.get_params()["metric"], ParamValue::from("manhattan"));

        assert!(knn.set_param("n_neighbors", ParamValue::Int(0)).is_err());
        assert!(matches!(
            knn.set_param("alpha", ParamValue::Float(1.0)),
            Err(TimeSeriesError::UnrecognizedParameter(_))
        ));
    }

    #[test]
    fn test_manhattan_distance() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];
        assert_eq!(compute_distance(a.view(), b.view(), DistanceMetric::Manhattan), 7.0);
        assert_eq!(compute_distance(a.view(), b.view(), DistanceMetric::Euclidean), 5.0);
    }
}
