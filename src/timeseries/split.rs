//! Chronological train/test splitting

use crate::error::{Result, TimeSeriesError};
use crate::sequence::Sequence;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Representation of the split pieces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SplitOutput {
    /// Plain vector or matrix, table labels dropped
    #[default]
    Array,
    /// Same layout as the input
    Native,
}

/// Order-preserving train/test splitter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChronologicalSplit {
    /// Fraction of observations held out at the end
    test_size: f64,
    output: SplitOutput,
}

impl Default for ChronologicalSplit {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            output: SplitOutput::Array,
        }
    }
}

impl ChronologicalSplit {
    pub fn new(test_size: f64) -> Self {
        Self {
            test_size,
            ..Self::default()
        }
    }

    pub fn with_output(mut self, output: SplitOutput) -> Self {
        self.output = output;
        self
    }

    /// Number of training observations for a sequence of `len`
    pub fn train_len(&self, len: usize) -> Result<usize> {
        split_index(len, self.test_size)
    }

    /// Split into a leading training part and a trailing test part
    pub fn split(&self, seq: &Sequence) -> Result<(Sequence, Sequence)> {
        let k = self.train_len(seq.len())?;
        let train = seq.slice(0..k)?;
        let test = seq.slice(k..seq.len())?;
        debug!(train = train.len(), test = test.len(), "Chronological split");

        Ok(match self.output {
            SplitOutput::Native => (train, test),
            SplitOutput::Array => (train.into_plain(), test.into_plain()),
        })
    }

    /// Split a frame by row position, keeping it a frame
    pub fn split_frame(&self, df: &DataFrame) -> Result<(DataFrame, DataFrame)> {
        let len = df.height();
        let k = self.train_len(len)?;
        Ok((df.slice(0, k), df.slice(k as i64, len - k)))
    }
}

/// Training length `floor(len * (1 - test_size))`.
///
/// `test_size` must lie strictly between 0 and 1.
pub fn split_index(len: usize, test_size: f64) -> Result<usize> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TimeSeriesError::invalid_parameter(
            "test_size",
            test_size,
            "must be in (0, 1)",
        ));
    }
    Ok((len as f64 * (1.0 - test_size)).floor() as usize)
}

/// Split `seq` chronologically; the first `split_index(len, test_size)`
/// observations train, the rest test.
pub fn time_series_split(seq: &Sequence, test_size: f64, output: SplitOutput) -> Result<(Sequence, Sequence)> {
    ChronologicalSplit::new(test_size).with_output(output).split(seq)
}

/// Split a polars frame chronologically by row position
pub fn split_frame(df: &DataFrame, test_size: f64) -> Result<(DataFrame, DataFrame)> {
    ChronologicalSplit::new(test_size).split_frame(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Layout;
    use ndarray::{concatenate, Array1, Axis};

    #[test]
    fn test_split_index() {
        assert_eq!(split_index(10, 0.2).unwrap(), 8);
        assert_eq!(split_index(7, 0.5).unwrap(), 3);
        assert_eq!(split_index(0, 0.2).unwrap(), 0);
    }

    #[test]
    fn test_invalid_test_size() {
        for test_size in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                split_index(10, test_size),
                Err(TimeSeriesError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_split_preserves_order() {
        let seq = Sequence::from(Array1::range(0.0, 10.0, 1.0));
        let (train, test) = time_series_split(&seq, 0.2, SplitOutput::default()).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);

        let joined = concatenate(Axis(0), &[train.values().view(), test.values().view()]).unwrap();
        assert_eq!(&joined, seq.values());
    }

    #[test]
    fn test_output_layout() {
        let df = df!("a" => [1.0, 2.0, 3.0, 4.0, 5.0], "b" => [5.0, 4.0, 3.0, 2.0, 1.0]).unwrap();
        let seq = Sequence::try_from(&df).unwrap();

        let (train, _) = time_series_split(&seq, 0.4, SplitOutput::Native).unwrap();
        assert!(train.layout().is_tabular());
        assert_eq!(train.column_names(), vec!["a", "b"]);

        let (train, test) = time_series_split(&seq, 0.4, SplitOutput::Array).unwrap();
        assert_eq!(train.layout(), &Layout::Matrix);
        assert_eq!(test.len(), 2);
    }

    #[test]
    fn test_split_frame() {
        let df = df!("a" => [1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let (train, test) = split_frame(&df, 0.2).unwrap();
        assert_eq!(train.height(), 4);
        assert_eq!(test.height(), 1);
        assert!(train.vstack(&test).unwrap().equals(&df));
    }
}
