//! Polars adapters for [`Sequence`]

use super::{Layout, Sequence};
use crate::error::{Result, TimeSeriesError};
use ndarray::Array2;
use polars::prelude::*;

/// Extract named columns from a DataFrame into a row-major `Array2<f64>`.
///
/// Numeric columns of any width are cast to `Float64`. Nulls are rejected.
fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let column = df.column(col_name)?;
            series_values(column.as_materialized_series())
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_refs[c][r]))
}

fn series_values(series: &Series) -> Result<Vec<f64>> {
    let series_f64 = series
        .cast(&DataType::Float64)
        .map_err(|e| TimeSeriesError::DataError(format!("column '{}': {}", series.name(), e)))?;
    let ca = series_f64.f64()?;

    if ca.null_count() > 0 {
        return Err(TimeSeriesError::DataError(format!(
            "column '{}' contains {} null values",
            series.name(),
            ca.null_count()
        )));
    }

    Ok(ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

impl TryFrom<&DataFrame> for Sequence {
    type Error = TimeSeriesError;

    fn try_from(df: &DataFrame) -> Result<Self> {
        let columns: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        let data = columns_to_array2(df, &columns)?;
        Sequence::from_parts(data, Layout::Frame { columns })
    }
}

impl TryFrom<&Series> for Sequence {
    type Error = TimeSeriesError;

    fn try_from(series: &Series) -> Result<Self> {
        let values = series_values(series)?;
        let data = Array2::from_shape_vec((values.len(), 1), values)?;
        Sequence::from_parts(
            data,
            Layout::Column {
                name: series.name().to_string(),
            },
        )
    }
}

impl Sequence {
    /// Convert back into a DataFrame, one column per feature
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .column_names()
            .iter()
            .enumerate()
            .map(|(j, name)| {
                let values: Vec<f64> = self.data.column(j).to_vec();
                Series::new(name.as_str().into(), values).into()
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }

    /// Convert a single-feature sequence into a named Series
    pub fn to_series(&self) -> Result<Series> {
        let values = self.to_array1()?.to_vec();
        let name = self
            .column_names()
            .into_iter()
            .next()
            .unwrap_or_else(|| "x0".to_string());
        Ok(Series::new(name.as_str().into(), values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_dataframe_to_sequence() {
        let df = df!(
            "price" => &[1.0, 2.0, 3.0],
            "volume" => &[10i64, 20, 30]
        )
        .unwrap();

        let seq = Sequence::try_from(&df).unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.n_features(), 2);
        assert_eq!(seq.values(), &array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]]);
        assert_eq!(
            seq.layout(),
            &Layout::Frame {
                columns: vec!["price".to_string(), "volume".to_string()]
            }
        );
    }

    #[test]
    fn test_series_to_sequence() {
        let series = Series::new("close".into(), vec![5.0, 6.0]);
        let seq = Sequence::try_from(&series).unwrap();
        assert_eq!(seq.n_features(), 1);
        assert_eq!(seq.column_names(), vec!["close".to_string()]);
    }

    #[test]
    fn test_nulls_rejected() {
        let df = df!("a" => &[Some(1.0), None, Some(3.0)]).unwrap();
        let result = Sequence::try_from(&df);
        assert!(matches!(result, Err(TimeSeriesError::DataError(_))));
    }

    #[test]
    fn test_non_numeric_rejected() {
        let df = df!("name" => &["a", "b"]).unwrap();
        assert!(Sequence::try_from(&df).is_err());
    }

    #[test]
    fn test_dataframe_round_trip() {
        let df = df!(
            "a" => &[1.0, 2.0],
            "b" => &[3.0, 4.0]
        )
        .unwrap();
        let seq = Sequence::try_from(&df).unwrap();
        let back = seq.to_dataframe().unwrap();
        assert!(back.equals(&df));
    }

    #[test]
    fn test_plain_sequence_gets_generated_names() {
        let seq = Sequence::from(array![[1.0, 2.0]]);
        let df = seq.to_dataframe().unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["x0".to_string(), "x1".to_string()]);
    }
}
