//! Ordered observation sequences
//!
//! [`Sequence`] is the single internal representation every component works
//! on: an `L x F` matrix of observations in chronological order, indexed by
//! position only. Adapters convert plain arrays, slices and Polars frames
//! into it at the boundary and back out again.

mod tabular;

use crate::error::{Result, TimeSeriesError};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// How a sequence was supplied, so results can be handed back the same way
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Layout {
    /// One-dimensional array of scalar observations
    Vector,
    /// Two-dimensional array, one row per observation
    Matrix,
    /// Polars series with a name
    Column { name: String },
    /// Polars data frame with named columns
    Frame { columns: Vec<String> },
}

impl Layout {
    /// Whether the sequence came from a labeled, tabular source
    pub fn is_tabular(&self) -> bool {
        matches!(self, Layout::Column { .. } | Layout::Frame { .. })
    }
}

/// Chronologically ordered observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    data: Array2<f64>,
    layout: Layout,
}

impl Sequence {
    /// Build from a one-dimensional series of scalar observations
    pub fn from_vector(values: Array1<f64>) -> Self {
        Self {
            data: values.insert_axis(Axis(1)),
            layout: Layout::Vector,
        }
    }

    /// Build from a matrix with one observation per row
    pub fn from_matrix(values: Array2<f64>) -> Self {
        Self {
            data: values,
            layout: Layout::Matrix,
        }
    }

    pub(crate) fn from_parts(data: Array2<f64>, layout: Layout) -> Result<Self> {
        let width = match &layout {
            Layout::Vector | Layout::Column { .. } => Some(1),
            Layout::Frame { columns } => Some(columns.len()),
            Layout::Matrix => None,
        };
        if let Some(width) = width {
            if data.ncols() != width {
                return Err(TimeSeriesError::ShapeMismatch {
                    expected: format!("{} columns", width),
                    actual: format!("{} columns", data.ncols()),
                });
            }
        }
        Ok(Self { data, layout })
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Width of each observation
    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// All observations as an `L x F` matrix
    pub fn values(&self) -> &Array2<f64> {
        &self.data
    }

    /// Observation at position `index`
    pub fn row(&self, index: usize) -> Result<ArrayView1<'_, f64>> {
        if index >= self.len() {
            return Err(TimeSeriesError::InsufficientData {
                required: index + 1,
                actual: self.len(),
            });
        }
        Ok(self.data.row(index))
    }

    /// Contiguous block of observations by position
    pub fn rows(&self, range: Range<usize>) -> Result<ArrayView2<'_, f64>> {
        self.check_range(&range)?;
        Ok(self.data.slice(s![range, ..]))
    }

    /// Owned positional slice that keeps this sequence's layout
    pub fn slice(&self, range: Range<usize>) -> Result<Sequence> {
        let data = self.rows(range)?.to_owned();
        Ok(Sequence {
            data,
            layout: self.layout.clone(),
        })
    }

    /// Drop any labels, keeping the same values
    pub fn into_plain(self) -> Sequence {
        let layout = match self.layout {
            Layout::Column { .. } => Layout::Vector,
            Layout::Frame { .. } => Layout::Matrix,
            other => other,
        };
        Sequence {
            data: self.data,
            layout,
        }
    }

    pub fn into_array2(self) -> Array2<f64> {
        self.data
    }

    /// Single-feature sequences as a flat vector
    pub fn to_array1(&self) -> Result<Array1<f64>> {
        if self.n_features() != 1 {
            return Err(TimeSeriesError::ShapeMismatch {
                expected: "1 feature".to_string(),
                actual: format!("{} features", self.n_features()),
            });
        }
        Ok(self.data.column(0).to_owned())
    }

    /// Column names, generated when the source had none
    pub fn column_names(&self) -> Vec<String> {
        match &self.layout {
            Layout::Frame { columns } => columns.clone(),
            Layout::Column { name } => vec![name.clone()],
            Layout::Vector | Layout::Matrix => {
                (0..self.n_features()).map(|i| format!("x{}", i)).collect()
            }
        }
    }

    fn check_range(&self, range: &Range<usize>) -> Result<()> {
        if range.start > range.end {
            return Err(TimeSeriesError::invalid_parameter(
                "range",
                format!("{}..{}", range.start, range.end),
                "start must not exceed end",
            ));
        }
        if range.end > self.len() {
            return Err(TimeSeriesError::InsufficientData {
                required: range.end,
                actual: self.len(),
            });
        }
        Ok(())
    }
}

impl From<Array1<f64>> for Sequence {
    fn from(values: Array1<f64>) -> Self {
        Sequence::from_vector(values)
    }
}

impl From<&Array1<f64>> for Sequence {
    fn from(values: &Array1<f64>) -> Self {
        Sequence::from_vector(values.clone())
    }
}

impl From<Array2<f64>> for Sequence {
    fn from(values: Array2<f64>) -> Self {
        Sequence::from_matrix(values)
    }
}

impl From<&Array2<f64>> for Sequence {
    fn from(values: &Array2<f64>) -> Self {
        Sequence::from_matrix(values.clone())
    }
}

impl From<Vec<f64>> for Sequence {
    fn from(values: Vec<f64>) -> Self {
        Sequence::from_vector(Array1::from_vec(values))
    }
}

impl From<&[f64]> for Sequence {
    fn from(values: &[f64]) -> Self {
        Sequence::from_vector(Array1::from(values.to_vec()))
    }
}
