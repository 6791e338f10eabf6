//! End-to-end run: drop features, split, extract, scale, fit, predict, evaluate.
//!
//! Every random choice is driven by a seed in [`PipelineConfig`], so two runs
//! with the same config on the same data produce the same report.

mod config;

pub use config::PipelineConfig;

use crate::dataset::{extract_features_and_target, Dataset};
use crate::error::{Result, WineError};
use crate::evaluation::{evaluate, EvaluationReport};
use crate::preprocessing::{scale_split, ScalingPolicy};
use crate::training::{RandomForest, TrainTestSplitter};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Everything a run produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub n_train: usize,
    pub n_test: usize,
    pub scaling: ScalingPolicy,
    /// Feature columns the model was trained on
    pub feature_names: Vec<String>,
    /// Metrics on the held-out rows
    pub report: EvaluationReport,
    /// `(feature, importance)`, most important first
    pub feature_importances: Vec<(String, f64)>,
    pub elapsed_secs: f64,
}

impl PipelineOutcome {
    /// Write as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Runs the wine quality pipeline under a fixed configuration
#[derive(Debug, Clone)]
pub struct PipelineRunner {
    config: PipelineConfig,
}

impl PipelineRunner {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Drop configured features and split into `(train, test)`
    pub fn prepare(&self, dataset: &Dataset) -> Result<(Dataset, Dataset)> {
        self.config.validate()?;
        dataset.column_index(&self.config.target_column)?;

        let dataset = if self.config.drop_features.is_empty() {
            dataset.clone()
        } else {
            debug!(dropped = ?self.config.drop_features, "Dropping feature columns");
            dataset.drop_columns(&self.config.drop_features)?
        };

        TrainTestSplitter::new(self.config.test_fraction)?
            .with_random_state(self.config.split_seed)
            .split(&dataset)
    }

    /// Run every stage and evaluate on the held-out split
    pub fn run(&self, dataset: &Dataset) -> Result<PipelineOutcome> {
        let start = Instant::now();
        info!(rows = dataset.n_rows(), columns = dataset.n_columns(), "Starting pipeline");

        let (train, test) = self.prepare(dataset)?;
        info!(train = train.n_rows(), test = test.n_rows(), seed = self.config.split_seed, "Split data");

        let target_index = train.column_index(&self.config.target_column)?;
        let feature_names = train.feature_names(target_index);
        let (x_train, y_train) = extract_features_and_target(&train, target_index)?;
        let (x_test, y_test) = extract_features_and_target(&test, target_index)?;

        let scaled = scale_split(self.config.scaling, x_train, x_test)?;
        if let Some(scaler) = &scaled.scaler {
            debug!(policy = %self.config.scaling, mean = ?scaler.mean(), scale = ?scaler.scale(), "Fitted scaler");
        }

        let mut forest = RandomForest::from_config(&self.config.forest);
        forest.fit(&scaled.x_train, &y_train)?;
        info!(
            trees = forest.n_trees(),
            classes = ?forest.classes(),
            random_state = self.config.forest.random_state,
            "Fitted random forest"
        );

        let y_pred = forest.predict(&scaled.x_test)?;
        if y_pred.len() != y_test.len() {
            return Err(WineError::LengthMismatch {
                left_name: "predictions",
                left: y_pred.len(),
                right_name: "test targets",
                right: y_test.len(),
            });
        }

        let report = evaluate(&y_test, &y_pred, &self.config.label_order)?;
        info!(accuracy = report.accuracy, samples = report.n_samples, "Evaluated on test split");

        let mut feature_importances: Vec<(String, f64)> = match forest.feature_importances() {
            Some(imp) => feature_names.iter().cloned().zip(imp.iter().copied()).collect(),
            None => Vec::new(),
        };
        feature_importances.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(PipelineOutcome {
            n_train: train.n_rows(),
            n_test: test.n_rows(),
            scaling: self.config.scaling,
            feature_names,
            report,
            feature_importances,
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::ForestConfig;
    use ndarray::Array2;

    /// Two features that separate three quality levels
    fn separable(n: usize) -> Dataset {
        let records = Array2::from_shape_fn((n, 3), |(row, col)| {
            let label = 5 + (row % 3) as i64;
            match col {
                0 => label as f64 * 2.0 + (row % 7) as f64 * 0.01,
                1 => (row % 11) as f64,
                _ => label as f64,
            }
        });
        Dataset::new(vec!["signal".into(), "noise".into(), "quality".into()], records).unwrap()
    }

    fn small_config() -> PipelineConfig {
        PipelineConfig::default()
            .with_label_order(vec![5, 6, 7])
            .with_forest(ForestConfig::default().with_n_estimators(10))
    }

    #[test]
    fn test_run_learns_separable_data() {
        let outcome = PipelineRunner::new(small_config()).run(&separable(90)).unwrap();

        assert_eq!(outcome.n_test, 18);
        assert_eq!(outcome.n_train, 72);
        assert_eq!(outcome.report.n_samples, 18);
        assert!(outcome.report.accuracy > 0.8, "accuracy {}", outcome.report.accuracy);
        assert_eq!(outcome.feature_names, vec!["signal".to_string(), "noise".to_string()]);
        assert_eq!(outcome.feature_importances[0].0, "signal");
    }

    #[test]
    fn test_drop_features() {
        let config = small_config().with_drop_features(vec!["noise".to_string()]);
        let outcome = PipelineRunner::new(config).run(&separable(60)).unwrap();
        assert_eq!(outcome.feature_names, vec!["signal".to_string()]);

        let bad = small_config().with_drop_features(vec!["density".to_string()]);
        assert!(matches!(
            PipelineRunner::new(bad).run(&separable(60)),
            Err(WineError::SchemaError(_))
        ));
    }

    #[test]
    fn test_missing_target_column() {
        let mut config = small_config();
        config.target_column = "grade".to_string();
        assert!(matches!(
            PipelineRunner::new(config).run(&separable(30)),
            Err(WineError::SchemaError(_))
        ));
    }

    #[test]
    fn test_scaling_policies_agree_on_separable_data() {
        let data = separable(90);
        let applied = PipelineRunner::new(small_config()).run(&data).unwrap();
        let disabled = PipelineRunner::new(small_config().with_scaling(ScalingPolicy::Disabled))
            .run(&data)
            .unwrap();

        assert_eq!(applied.scaling, ScalingPolicy::Applied);
        assert_eq!(disabled.scaling, ScalingPolicy::Disabled);
        assert_eq!(applied.report.confusion_matrix, disabled.report.confusion_matrix);
    }
}
