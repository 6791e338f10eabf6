//! Classification evaluation
//!
//! [`evaluate`] turns aligned true/predicted labels into an
//! [`EvaluationReport`]: per-class precision, recall, F1 and support, overall
//! accuracy, macro and support-weighted averages, and a [`ConfusionMatrix`]
//! over a caller-supplied label order.
//!
//! Undefined ratios (no predicted or no true instances of a class) are
//! reported as 0 rather than treated as errors.

mod confusion;
mod report;

pub use confusion::ConfusionMatrix;

use crate::error::{Result, WineError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default confusion-matrix axes for wine quality
pub const WINE_LABELS: [i64; 6] = [3, 4, 5, 6, 7, 8];

/// Quality figures for a single class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: i64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// Number of true instances
    pub support: usize,
}

impl ClassMetrics {
    /// Metrics from raw counts, applying the zero-division policy
    fn from_counts(label: i64, true_positive: usize, predicted: usize, actual: usize) -> Self {
        let precision = ratio(true_positive, predicted);
        let recall = ratio(true_positive, actual);
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            label,
            precision,
            recall,
            f1_score,
            support: actual,
        }
    }

    /// All-zero metrics for a class never seen
    fn absent(label: i64) -> Self {
        Self::from_counts(label, 0, 0, 0)
    }
}

/// Averaged metrics across classes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Result of evaluating one set of predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// One entry per label seen in either sequence, sorted by label
    pub per_class: Vec<ClassMetrics>,
    /// Fraction of exact matches
    pub accuracy: f64,
    /// Unweighted mean over `per_class`
    pub macro_avg: AverageMetrics,
    /// Support-weighted mean over `per_class`
    pub weighted_avg: AverageMetrics,
    /// Counts over the requested label order
    pub confusion_matrix: ConfusionMatrix,
    /// Number of evaluated samples
    pub n_samples: usize,
}

impl EvaluationReport {
    /// Metrics for `label`; zeros when the label never occurred
    pub fn metrics_for(&self, label: i64) -> ClassMetrics {
        self.per_class
            .iter()
            .find(|m| m.label == label)
            .copied()
            .unwrap_or_else(|| ClassMetrics::absent(label))
    }

    /// Labels that have a per-class row
    pub fn labels(&self) -> Vec<i64> {
        self.per_class.iter().map(|m| m.label).collect()
    }
}

/// Evaluate predictions against ground truth.
///
/// `label_order` fixes the confusion-matrix axes independently of the labels
/// present in the data.
pub fn evaluate(y_true: &Array1<i64>, y_pred: &Array1<i64>, label_order: &[i64]) -> Result<EvaluationReport> {
    if y_true.len() != y_pred.len() {
        return Err(WineError::LengthMismatch {
            left_name: "y_true",
            left: y_true.len(),
            right_name: "y_pred",
            right: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(WineError::InvalidInput("cannot evaluate zero predictions".to_string()));
    }

    let confusion_matrix = ConfusionMatrix::new(y_true, y_pred, label_order)?;

    // label -> (true positives, predicted count, actual count)
    let mut tallies: BTreeMap<i64, (usize, usize, usize)> = BTreeMap::new();
    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        tallies.entry(t).or_default().2 += 1;
        tallies.entry(p).or_default().1 += 1;
        if t == p {
            tallies.entry(t).or_default().0 += 1;
        }
    }

    let per_class: Vec<ClassMetrics> = tallies
        .into_iter()
        .map(|(label, (tp, predicted, actual))| ClassMetrics::from_counts(label, tp, predicted, actual))
        .collect();

    let n_samples = y_true.len();
    let correct = y_true.iter().zip(y_pred.iter()).filter(|(t, p)| t == p).count();
    let accuracy = correct as f64 / n_samples as f64;

    let n_classes = per_class.len() as f64;
    let macro_avg = AverageMetrics {
        precision: per_class.iter().map(|m| m.precision).sum::<f64>() / n_classes,
        recall: per_class.iter().map(|m| m.recall).sum::<f64>() / n_classes,
        f1_score: per_class.iter().map(|m| m.f1_score).sum::<f64>() / n_classes,
        support: n_samples,
    };

    let weighted_avg = AverageMetrics {
        precision: weighted_mean(&per_class, n_samples, |m| m.precision),
        recall: weighted_mean(&per_class, n_samples, |m| m.recall),
        f1_score: weighted_mean(&per_class, n_samples, |m| m.f1_score),
        support: n_samples,
    };

    Ok(EvaluationReport {
        per_class,
        accuracy,
        macro_avg,
        weighted_avg,
        confusion_matrix,
        n_samples,
    })
}

fn weighted_mean(per_class: &[ClassMetrics], n_samples: usize, metric: impl Fn(&ClassMetrics) -> f64) -> f64 {
    per_class.iter().map(|m| metric(m) * m.support as f64).sum::<f64>() / n_samples as f64
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_small_multiclass_scenario() {
        let y_true = array![5, 6, 5, 7];
        let y_pred = array![5, 6, 6, 7];

        let report = evaluate(&y_true, &y_pred, &[5, 6, 7]).unwrap();

        assert_eq!(
            report.confusion_matrix.to_rows(),
            vec![vec![1, 1, 0], vec![0, 1, 0], vec![0, 0, 1]]
        );

        let six = report.metrics_for(6);
        assert!((six.precision - 0.5).abs() < EPS);
        assert!((six.recall - 1.0).abs() < EPS);
        assert!((six.f1_score - 2.0 / 3.0).abs() < EPS);
        assert_eq!(six.support, 1);

        let five = report.metrics_for(5);
        assert!((five.precision - 1.0).abs() < EPS);
        assert!((five.recall - 0.5).abs() < EPS);
        assert_eq!(five.support, 2);

        assert!((report.accuracy - 0.75).abs() < EPS);
    }

    #[test]
    fn test_zero_division_policy() {
        let y_true = array![5, 5, 6];
        let y_pred = array![5, 5, 5];

        let report = evaluate(&y_true, &y_pred, &WINE_LABELS).unwrap();

        // 6 is never predicted: precision undefined -> 0
        let six = report.metrics_for(6);
        assert_eq!(six.precision, 0.0);
        assert_eq!(six.recall, 0.0);
        assert_eq!(six.f1_score, 0.0);

        // 3 occurs nowhere
        let three = report.metrics_for(3);
        assert_eq!((three.precision, three.recall, three.f1_score, three.support), (0.0, 0.0, 0.0, 0));
    }

    #[test]
    fn test_per_class_covers_predicted_only_labels() {
        let y_true = array![5, 5];
        let y_pred = array![5, 8];

        let report = evaluate(&y_true, &y_pred, &WINE_LABELS).unwrap();
        assert_eq!(report.labels(), vec![5, 8]);
        assert_eq!(report.metrics_for(8).support, 0);
    }

    #[test]
    fn test_averages() {
        let y_true = array![5, 6, 5, 7];
        let y_pred = array![5, 6, 6, 7];
        let report = evaluate(&y_true, &y_pred, &[5, 6, 7]).unwrap();

        // precision: 1.0, 0.5, 1.0
        assert!((report.macro_avg.precision - 2.5 / 3.0).abs() < EPS);
        // weighted by support 2, 1, 1
        assert!((report.weighted_avg.precision - (2.0 + 0.5 + 1.0) / 4.0).abs() < EPS);
        // weighted recall equals accuracy
        assert!((report.weighted_avg.recall - report.accuracy).abs() < EPS);
        assert_eq!(report.macro_avg.support, 4);
    }

    #[test]
    fn test_length_mismatch() {
        let err = evaluate(&array![5, 6], &array![5], &WINE_LABELS).unwrap_err();
        assert!(matches!(err, WineError::LengthMismatch { .. }));
    }

    #[test]
    fn test_empty_input() {
        let empty = Array1::<i64>::zeros(0);
        assert!(matches!(evaluate(&empty, &empty, &WINE_LABELS), Err(WineError::InvalidInput(_))));
    }

    #[test]
    fn test_report_serializes() {
        let report = evaluate(&array![5, 6], &array![5, 6], &[5, 6]).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"accuracy\":1.0"));
    }
}
