//! Wine dataset schema and in-memory representation
//!
//! A [`Dataset`] is an ordered table of finite `f64` cells with named columns.
//! Wine data uses the fixed 12-column schema in [`WINE_COLUMNS`]: eleven
//! physicochemical features followed by the integer `quality` label.

mod loader;

pub use loader::{DataLoader, FileInfo};

use crate::error::{Result, WineError};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column names of the wine quality schema, in file order
pub const WINE_COLUMNS: [&str; 12] = [
    "fixed acidity",
    "volatile acidity",
    "citric acid",
    "residual sugar",
    "chlorides",
    "free sulfur dioxide",
    "total sulfur dioxide",
    "density",
    "pH",
    "sulphates",
    "alcohol",
    "quality",
];

/// Name of the target column
pub const TARGET_COLUMN: &str = "quality";

/// Positional index of the target column in the wine schema
pub const TARGET_INDEX: usize = 11;

/// Ordered table of numeric records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    records: Array2<f64>,
}

impl Dataset {
    /// Create a dataset from column names and a record matrix.
    ///
    /// Every cell must be finite.
    pub fn new(columns: Vec<String>, records: Array2<f64>) -> Result<Self> {
        if columns.len() != records.ncols() {
            return Err(WineError::SchemaError(format!(
                "{} column names for {} columns of data",
                columns.len(),
                records.ncols()
            )));
        }

        if let Some(((row, col), value)) = records.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(WineError::SchemaError(format!(
                "non-finite value {} in column '{}' at row {}",
                value, columns[col], row
            )));
        }

        Ok(Self { columns, records })
    }

    /// Create a dataset from row vectors, rejecting ragged input
    pub fn from_rows(columns: Vec<String>, rows: &[Vec<f64>]) -> Result<Self> {
        let width = columns.len();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(WineError::SchemaError(format!(
                "row {} has {} fields, expected {}",
                idx,
                row.len(),
                width
            )));
        }

        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let records = Array2::from_shape_vec((rows.len(), width), flat)?;
        Self::new(columns, records)
    }

    /// Convert a polars frame, keeping every column in frame order
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let columns: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| normalize_column_name(name.as_str()))
            .collect();

        let n_rows = df.height();
        let col_data: Vec<Vec<f64>> = df
            .get_columns()
            .iter()
            .zip(columns.iter())
            .map(|(column, name)| column_values(column, name))
            .collect::<Result<Vec<Vec<f64>>>>()?;

        let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
        let records = Array2::from_shape_fn((n_rows, columns.len()), |(r, c)| col_refs[c][r]);

        Self::new(columns, records)
    }

    /// Convert a polars frame that must match the wine schema exactly
    pub fn from_wine_frame(df: &DataFrame) -> Result<Self> {
        let dataset = Self::from_dataframe(df)?;
        validate_wine_schema(&dataset.columns)?;
        Ok(dataset)
    }

    /// Number of records
    pub fn n_rows(&self) -> usize {
        self.records.nrows()
    }

    /// Number of columns
    pub fn n_columns(&self) -> usize {
        self.records.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.records.nrows() == 0
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw record matrix
    pub fn records(&self) -> &Array2<f64> {
        &self.records
    }

    /// Position of a named column
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| WineError::SchemaError(format!("unknown column '{}'", name)))
    }

    /// View of a single column
    pub fn column(&self, idx: usize) -> Result<ArrayView1<'_, f64>> {
        if idx >= self.n_columns() {
            return Err(WineError::SchemaError(format!(
                "column index {} out of range for {} columns",
                idx,
                self.n_columns()
            )));
        }
        Ok(self.records.column(idx))
    }

    /// Subset of rows, in the order given
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            records: self.records.select(Axis(0), indices),
        }
    }

    /// Copy of the dataset without the named columns
    pub fn drop_columns(&self, names: &[String]) -> Result<Self> {
        let dropped: Vec<usize> = names
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Result<Vec<usize>>>()?;

        let kept: Vec<usize> = (0..self.n_columns()).filter(|i| !dropped.contains(i)).collect();

        Ok(Self {
            columns: kept.iter().map(|&i| self.columns[i].clone()).collect(),
            records: self.records.select(Axis(1), &kept),
        })
    }

    /// Split into feature matrix and integer target vector
    pub fn features_and_target(&self, target_index: usize) -> Result<(Array2<f64>, Array1<i64>)> {
        extract_features_and_target(self, target_index)
    }

    /// Names of every column except the one at `target_index`
    pub fn feature_names(&self, target_index: usize) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target_index)
            .map(|(_, name)| name.clone())
            .collect()
    }
}

/// Separate the target column from the features.
///
/// Feature columns keep their original order; the target is aligned row for row.
pub fn extract_features_and_target(
    subset: &Dataset,
    target_index: usize,
) -> Result<(Array2<f64>, Array1<i64>)> {
    let n_columns = subset.n_columns();
    if target_index >= n_columns {
        return Err(WineError::SchemaError(format!(
            "target index {} out of range for {} columns",
            target_index, n_columns
        )));
    }

    let feature_idx: Vec<usize> = (0..n_columns).filter(|&i| i != target_index).collect();
    let features = subset.records.select(Axis(1), &feature_idx);

    let target = subset
        .records
        .column(target_index)
        .iter()
        .enumerate()
        .map(|(row, &value)| {
            if value.fract() != 0.0 {
                return Err(WineError::SchemaError(format!(
                    "target value {} at row {} is not an integer label",
                    value, row
                )));
            }
            Ok(value as i64)
        })
        .collect::<Result<Vec<i64>>>()?;

    Ok((features, Array1::from_vec(target)))
}

/// Check that column names match the wine schema in name and order
pub fn validate_wine_schema(columns: &[String]) -> Result<()> {
    if columns.len() != WINE_COLUMNS.len() {
        return Err(WineError::SchemaError(format!(
            "expected {} columns, got {}",
            WINE_COLUMNS.len(),
            columns.len()
        )));
    }

    for (idx, (actual, expected)) in columns.iter().zip(WINE_COLUMNS.iter()).enumerate() {
        if actual != expected {
            return Err(WineError::SchemaError(format!(
                "column {} is '{}', expected '{}'",
                idx, actual, expected
            )));
        }
    }

    Ok(())
}

fn normalize_column_name(name: &str) -> String {
    name.trim().trim_matches('"').trim().to_string()
}

fn column_values(column: &Column, name: &str) -> Result<Vec<f64>> {
    let casted = column
        .cast(&DataType::Float64)
        .map_err(|e| WineError::SchemaError(format!("column '{}' is not numeric: {}", name, e)))?;

    casted
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| {
                WineError::SchemaError(format!("missing value in column '{}' at row {}", name, row))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_features_and_target() {
        let ds = Dataset::new(
            names(&["a", "b", "quality"]),
            array![[1.0, 2.0, 5.0], [3.0, 4.0, 6.0]],
        )
        .unwrap();

        let (x, y) = ds.features_and_target(2).unwrap();
        assert_eq!(x, array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(y, array![5, 6]);
    }

    #[test]
    fn test_extract_middle_target_keeps_order() {
        let ds = Dataset::new(names(&["a", "t", "b"]), array![[1.0, 7.0, 2.0]]).unwrap();
        let (x, y) = extract_features_and_target(&ds, 1).unwrap();
        assert_eq!(x, array![[1.0, 2.0]]);
        assert_eq!(y, array![7]);
    }

    #[test]
    fn test_extract_target_out_of_range() {
        let ds = Dataset::new(names(&["a", "b"]), array![[1.0, 2.0]]).unwrap();
        let err = ds.features_and_target(2).unwrap_err();
        assert!(matches!(err, WineError::SchemaError(_)));
    }

    #[test]
    fn test_non_integer_target_rejected() {
        let ds = Dataset::new(names(&["a", "quality"]), array![[1.0, 5.5]]).unwrap();
        assert!(matches!(ds.features_and_target(1), Err(WineError::SchemaError(_))));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        let err = Dataset::from_rows(names(&["a", "b"]), &rows).unwrap_err();
        assert!(matches!(err, WineError::SchemaError(_)));
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = Dataset::new(names(&["a"]), array![[f64::NAN]]).unwrap_err();
        assert!(err.to_string().contains("column 'a'"));
    }

    #[test]
    fn test_from_dataframe_missing_value() {
        let df = df!(
            "a" => &[Some(1.0), None, Some(3.0)],
            "b" => &[1.0, 2.0, 3.0]
        )
        .unwrap();

        let err = Dataset::from_dataframe(&df).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_from_dataframe_casts_integers() {
        let df = df!(
            "x" => &[0.5, 1.5],
            "quality" => &[5i64, 6]
        )
        .unwrap();

        let ds = Dataset::from_dataframe(&df).unwrap();
        assert_eq!(ds.records(), &array![[0.5, 5.0], [1.5, 6.0]]);
    }

    #[test]
    fn test_validate_wine_schema() {
        let good: Vec<String> = WINE_COLUMNS.iter().map(|s| s.to_string()).collect();
        assert!(validate_wine_schema(&good).is_ok());

        let mut swapped = good.clone();
        swapped.swap(0, 1);
        assert!(validate_wine_schema(&swapped).is_err());
        assert!(validate_wine_schema(&good[..11]).is_err());
    }

    #[test]
    fn test_drop_columns() {
        let ds = Dataset::new(names(&["a", "b", "c"]), array![[1.0, 2.0, 3.0]]).unwrap();
        let dropped = ds.drop_columns(&["b".to_string()]).unwrap();
        assert_eq!(dropped.columns(), &["a".to_string(), "c".to_string()]);
        assert_eq!(dropped.records(), &array![[1.0, 3.0]]);

        assert!(ds.drop_columns(&["missing".to_string()]).is_err());
    }

    #[test]
    fn test_select_rows_preserves_order() {
        let ds = Dataset::new(names(&["a"]), array![[1.0], [2.0], [3.0]]).unwrap();
        let sub = ds.select_rows(&[2, 0]);
        assert_eq!(sub.records(), &array![[3.0], [1.0]]);
    }
}
