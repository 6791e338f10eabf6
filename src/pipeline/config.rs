//! Pipeline configuration

use crate::dataset::TARGET_COLUMN;
use crate::error::{Result, WineError};
use crate::evaluation::WINE_LABELS;
use crate::preprocessing::ScalingPolicy;
use crate::training::ForestConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for one end-to-end run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Label column
    pub target_column: String,
    /// Fraction of rows held out for testing
    pub test_fraction: f64,
    /// Seed for the train/test shuffle
    pub split_seed: u64,
    /// Confusion-matrix axes
    pub label_order: Vec<i64>,
    /// Whether standardized features reach the classifier
    pub scaling: ScalingPolicy,
    /// Feature columns removed before splitting
    pub drop_features: Vec<String>,
    /// Classifier hyperparameters
    pub forest: ForestConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_column: TARGET_COLUMN.to_string(),
            test_fraction: 0.2,
            split_seed: 42,
            label_order: WINE_LABELS.to_vec(),
            scaling: ScalingPolicy::Applied,
            drop_features: Vec::new(),
            forest: ForestConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Write as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn with_split_seed(mut self, seed: u64) -> Self {
        self.split_seed = seed;
        self
    }

    pub fn with_label_order(mut self, labels: Vec<i64>) -> Self {
        self.label_order = labels;
        self
    }

    pub fn with_scaling(mut self, policy: ScalingPolicy) -> Self {
        self.scaling = policy;
        self
    }

    pub fn with_drop_features(mut self, features: Vec<String>) -> Self {
        self.drop_features = features;
        self
    }

    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(WineError::ConfigError(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.target_column.trim().is_empty() {
            return Err(WineError::ConfigError("target_column is empty".to_string()));
        }
        if self.drop_features.iter().any(|f| f == &self.target_column) {
            return Err(WineError::ConfigError(format!(
                "cannot drop the target column '{}'",
                self.target_column
            )));
        }

        let mut labels = self.label_order.clone();
        labels.sort_unstable();
        labels.dedup();
        if labels.is_empty() || labels.len() != self.label_order.len() {
            return Err(WineError::ConfigError(format!(
                "label_order must be non-empty and distinct, got {:?}",
                self.label_order
            )));
        }

        self.forest.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::MaxFeatures;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.target_column, "quality");
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.split_seed, 42);
        assert_eq!(config.label_order, vec![3, 4, 5, 6, 7, 8]);
        assert_eq!(config.scaling, ScalingPolicy::Applied);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(PipelineConfig::default().with_test_fraction(1.0).validate().is_err());
        assert!(PipelineConfig::default().with_test_fraction(0.0).validate().is_err());
        assert!(PipelineConfig::default().with_label_order(vec![5, 5]).validate().is_err());
        assert!(PipelineConfig::default().with_label_order(vec![]).validate().is_err());
        assert!(PipelineConfig::default()
            .with_drop_features(vec!["quality".to_string()])
            .validate()
            .is_err());
    }

    #[test]
    fn test_json_file_roundtrip_with_partial_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"test_fraction": 0.25, "scaling": "discarded", "forest": {"n_estimators": 10, "max_features": "log2"}}"#,
        )
        .unwrap();

        let config = PipelineConfig::from_json_file(&path).unwrap();
        assert_eq!(config.test_fraction, 0.25);
        assert_eq!(config.scaling, ScalingPolicy::Discarded);
        assert_eq!(config.forest.n_estimators, 10);
        assert_eq!(config.forest.max_features, MaxFeatures::Log2);
        assert_eq!(config.split_seed, 42);

        let out = dir.path().join("saved.json");
        config.save(&out).unwrap();
        assert_eq!(PipelineConfig::from_json_file(&out).unwrap(), config);
    }
}
