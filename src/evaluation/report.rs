//! Plain-text rendering of an evaluation report

use super::{AverageMetrics, EvaluationReport};
use std::fmt;

const WEIGHTED_AVG: &str = "weighted avg";

impl fmt::Display for EvaluationReport {
    /// Column layout mirrors the familiar precision/recall/f1/support table.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .per_class
            .iter()
            .map(|m| m.label.to_string().len())
            .chain(std::iter::once(WEIGHTED_AVG.len()))
            .max()
            .unwrap_or(WEIGHTED_AVG.len());

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "",
            "precision",
            "recall",
            "f1-score",
            "support",
            width = width
        )?;
        writeln!(f)?;

        for m in &self.per_class {
            writeln!(
                f,
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label,
                m.precision,
                m.recall,
                m.f1_score,
                m.support,
                width = width
            )?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.n_samples,
            width = width
        )?;
        average_row(f, "macro avg", &self.macro_avg, width)?;
        average_row(f, WEIGHTED_AVG, &self.weighted_avg, width)
    }
}

fn average_row(f: &mut fmt::Formatter<'_>, name: &str, avg: &AverageMetrics, width: usize) -> fmt::Result {
    writeln!(
        f,
        "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
        name,
        avg.precision,
        avg.recall,
        avg.f1_score,
        avg.support,
        width = width
    )
}

#[cfg(test)]
mod tests {
    use crate::evaluation::evaluate;
    use ndarray::array;

    #[test]
    fn test_text_layout() {
        let report = evaluate(&array![5, 6, 5, 7], &array![5, 6, 6, 7], &[5, 6, 7]).unwrap();
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], format!("{}precision    recall  f1-score   support", " ".repeat(14)));
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "           5       1.00      0.50      0.67         2");
        assert_eq!(lines[3], "           6       0.50      1.00      0.67         1");
        assert_eq!(lines[4], "           7       1.00      1.00      1.00         1");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], format!("    accuracy{}0.75{}4", " ".repeat(27), " ".repeat(9)));
        assert!(lines[7].starts_with("   macro avg"));
        assert!(lines[8].starts_with("weighted avg"));
    }
}
