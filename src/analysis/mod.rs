//! Exploratory statistics
//!
//! Numeric summaries used before modelling: per-column descriptive
//! statistics, missing-value counts on the raw frame, Pearson correlations
//! and per-quality feature means.

mod correlation;

pub use correlation::{correlation_matrix, pearson, target_correlations, CorrelationMatrix};

use crate::dataset::Dataset;
use crate::error::{Result, WineError};
use ndarray::{Array1, ArrayView1, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Descriptive statistics for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); 0 for a single value
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    fn from_values(column: &str, values: ArrayView1<f64>) -> Self {
        let count = values.len();
        let mean = values.mean().unwrap_or(0.0);
        let std = if count > 1 { values.std(1.0) } else { 0.0 };

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Self {
            column: column.to_string(),
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        }
    }
}

/// Missing cells per column of a raw frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullCount {
    pub column: String,
    pub missing: usize,
}

/// Mean feature values for one quality level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityGroup {
    pub label: i64,
    pub count: usize,
    /// One entry per feature, in feature order
    pub means: Array1<f64>,
}

/// Per-quality feature means
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMeans {
    pub feature_names: Vec<String>,
    /// Sorted by label
    pub groups: Vec<QualityGroup>,
}

impl GroupMeans {
    /// Group for `label`, if that label occurs
    pub fn group(&self, label: i64) -> Option<&QualityGroup> {
        self.groups.iter().find(|g| g.label == label)
    }

    /// Mean of `feature` for each label, in label order
    pub fn feature_profile(&self, feature: &str) -> Result<Vec<(i64, f64)>> {
        let idx = self
            .feature_names
            .iter()
            .position(|f| f == feature)
            .ok_or_else(|| WineError::SchemaError(format!("unknown feature '{}'", feature)))?;
        Ok(self.groups.iter().map(|g| (g.label, g.means[idx])).collect())
    }
}

/// Summary statistics for every column
pub fn describe(dataset: &Dataset) -> Result<Vec<ColumnSummary>> {
    if dataset.is_empty() {
        return Err(WineError::InvalidInput("cannot describe an empty dataset".to_string()));
    }

    Ok(dataset
        .columns()
        .iter()
        .zip(dataset.records().columns())
        .map(|(name, values)| ColumnSummary::from_values(name, values))
        .collect())
}

/// Count null and non-finite cells per column of a frame as read from disk.
///
/// Columns that cannot be read as numbers only report their nulls.
pub fn null_report(df: &DataFrame) -> Vec<NullCount> {
    df.get_columns()
        .iter()
        .map(|column| {
            let missing = match column.cast(&DataType::Float64) {
                Ok(casted) => match casted.f64() {
                    Ok(values) => values
                        .into_iter()
                        .filter(|v| v.map_or(true, |x| !x.is_finite()))
                        .count(),
                    Err(_) => column.null_count(),
                },
                Err(_) => column.null_count(),
            };
            NullCount {
                column: column.name().as_str().trim().trim_matches('"').to_string(),
                missing,
            }
        })
        .collect()
}

/// Mean of each feature for each distinct target value
pub fn group_means(dataset: &Dataset, target_index: usize) -> Result<GroupMeans> {
    let (features, target) = dataset.features_and_target(target_index)?;

    let mut rows_by_label: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (row, &label) in target.iter().enumerate() {
        rows_by_label.entry(label).or_default().push(row);
    }

    let groups = rows_by_label
        .into_iter()
        .map(|(label, rows)| {
            let subset = features.select(Axis(0), &rows);
            let means = subset
                .mean_axis(Axis(0))
                .unwrap_or_else(|| Array1::zeros(features.ncols()));
            QualityGroup {
                label,
                count: rows.len(),
                means,
            }
        })
        .collect();

    Ok(GroupMeans {
        feature_names: dataset.feature_names(target_index),
        groups,
    })
}

/// Linear-interpolated quantile of sorted, non-empty data
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
