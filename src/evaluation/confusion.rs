//! Confusion matrix over a fixed label order

use crate::error::{Result, WineError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Square grid of counts; rows are true labels, columns are predicted labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    labels: Vec<i64>,
    counts: Array2<usize>,
}

impl ConfusionMatrix {
    /// Count `(true, predicted)` pairs along the axes given by `labels`.
    ///
    /// Pairs with either label outside `labels` are not counted.
    pub fn new(y_true: &Array1<i64>, y_pred: &Array1<i64>, labels: &[i64]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(WineError::LengthMismatch {
                left_name: "y_true",
                left: y_true.len(),
                right_name: "y_pred",
                right: y_pred.len(),
            });
        }
        check_label_order(labels)?;

        let position = |label: &i64| labels.iter().position(|l| l == label);

        let mut counts = Array2::<usize>::zeros((labels.len(), labels.len()));
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            if let (Some(r), Some(c)) = (position(t), position(p)) {
                counts[[r, c]] += 1;
            }
        }

        Ok(Self {
            labels: labels.to_vec(),
            counts,
        })
    }

    /// Axis labels, in order
    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    /// Raw count grid
    pub fn counts(&self) -> &Array2<usize> {
        &self.counts
    }

    /// Count for a `(true, predicted)` label pair
    pub fn get(&self, true_label: i64, predicted_label: i64) -> Option<usize> {
        let r = self.labels.iter().position(|&l| l == true_label)?;
        let c = self.labels.iter().position(|&l| l == predicted_label)?;
        Some(self.counts[[r, c]])
    }

    /// Grid as nested rows
    pub fn to_rows(&self) -> Vec<Vec<usize>> {
        self.counts.rows().into_iter().map(|row| row.to_vec()).collect()
    }

    /// Number of counted pairs
    pub fn total(&self) -> usize {
        self.counts.sum()
    }

    /// Sum of the diagonal
    pub fn correct(&self) -> usize {
        self.counts.diag().sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self
            .counts
            .iter()
            .map(|c| c.to_string().len())
            .chain(self.labels.iter().map(|l| l.to_string().len()))
            .max()
            .unwrap_or(1)
            .max(3);
        let head = "true\\pred".len();

        write!(f, "{:>head$}", "true\\pred", head = head)?;
        for label in &self.labels {
            write!(f, " {:>cell$}", label, cell = cell)?;
        }
        writeln!(f)?;

        for (label, row) in self.labels.iter().zip(self.counts.rows()) {
            write!(f, "{:>head$}", label, head = head)?;
            for count in row {
                write!(f, " {:>cell$}", count, cell = cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Reject empty or duplicated label orders
pub(crate) fn check_label_order(labels: &[i64]) -> Result<()> {
    if labels.is_empty() {
        return Err(WineError::InvalidInput("label order is empty".to_string()));
    }
    let mut sorted = labels.to_vec();
    sorted.sort_unstable();
    if sorted.windows(2).any(|w| w[0] == w[1]) {
        return Err(WineError::InvalidInput(format!("label order {:?} contains duplicates", labels)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_rows_are_true_columns_are_predicted() {
        let y_true = array![5, 6, 5, 7];
        let y_pred = array![5, 6, 6, 7];

        let cm = ConfusionMatrix::new(&y_true, &y_pred, &[5, 6, 7]).unwrap();
        assert_eq!(cm.to_rows(), vec![vec![1, 1, 0], vec![0, 1, 0], vec![0, 0, 1]]);
        assert_eq!(cm.get(5, 6), Some(1));
        assert_eq!(cm.get(6, 5), Some(0));
        assert_eq!(cm.correct(), 3);
    }

    #[test]
    fn test_fixed_axes_include_unseen_labels() {
        let y_true = array![5, 6];
        let y_pred = array![5, 5];

        let cm = ConfusionMatrix::new(&y_true, &y_pred, &[3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(cm.counts().dim(), (6, 6));
        assert_eq!(cm.total(), 2);
        assert_eq!(cm.get(3, 3), Some(0));
    }

    #[test]
    fn test_labels_outside_order_are_skipped() {
        let y_true = array![5, 9];
        let y_pred = array![5, 5];

        let cm = ConfusionMatrix::new(&y_true, &y_pred, &[5, 6]).unwrap();
        assert_eq!(cm.total(), 1);
        assert_eq!(cm.get(9, 5), None);
    }

    #[test]
    fn test_length_mismatch() {
        let err = ConfusionMatrix::new(&array![1, 2], &array![1], &[1, 2]).unwrap_err();
        assert!(matches!(err, WineError::LengthMismatch { left: 2, right: 1, .. }));
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        assert!(ConfusionMatrix::new(&array![1], &array![1], &[1, 1]).is_err());
    }

    #[test]
    fn test_display_layout() {
        let cm = ConfusionMatrix::new(&array![3, 4], &array![3, 3], &[3, 4]).unwrap();
        let text = cm.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "        3   1   0");
        assert_eq!(lines[2], "        4   1   0");
    }
}
