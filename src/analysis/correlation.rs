//! Pearson correlation between columns

use crate::dataset::Dataset;
use crate::error::{Result, WineError};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Symmetric matrix of pairwise Pearson coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Array2<f64>,
}

impl CorrelationMatrix {
    /// Coefficient between two named columns
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[[i, j]])
    }
}

/// Pearson coefficient; 0 when either side has no variance
pub fn pearson(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let n = x.len();
    if n < 2 || n != y.len() {
        return 0.0;
    }

    let x_mean = x.mean().unwrap_or(0.0);
    let y_mean = y.mean().unwrap_or(0.0);

    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;

    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sum_xy += dx * dy;
        sum_x2 += dx * dx;
        sum_y2 += dy * dy;
    }

    let denom = (sum_x2 * sum_y2).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        sum_xy / denom
    }
}

/// Correlation of every column with every other column
pub fn correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    let records = dataset.records();
    let n = records.ncols();

    let mut values = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        values[[i, i]] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(records.column(i), records.column(j));
            values[[i, j]] = r;
            values[[j, i]] = r;
        }
    }

    CorrelationMatrix {
        columns: dataset.columns().to_vec(),
        values,
    }
}

/// Correlation of each feature with the target, strongest first
pub fn target_correlations(dataset: &Dataset, target: &str) -> Result<Vec<(String, f64)>> {
    let target_idx = dataset.column_index(target)?;
    if dataset.n_rows() < 2 {
        return Err(WineError::InvalidInput(
            "correlation needs at least 2 rows".to_string(),
        ));
    }

    let target_col = dataset.records().column(target_idx);
    let mut correlations: Vec<(String, f64)> = dataset
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != target_idx)
        .map(|(i, name)| (name.clone(), pearson(dataset.records().column(i), target_col)))
        .collect();

    correlations.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
    Ok(correlations)
}
