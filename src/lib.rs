//! Wine quality - reproducible classification of red wine quality
//!
//! This crate loads the physicochemical wine dataset, partitions it with a
//! seeded shuffle, standardizes features, trains a random forest and reports
//! per-class precision/recall/F1 together with a confusion matrix.
//!
//! # Modules
//!
//! - [`dataset`] - CSV loading and the 12-column wine schema
//! - [`analysis`] - Descriptive statistics, correlations, per-quality means
//! - [`preprocessing`] - Standard scaling and the scaling policy
//! - [`training`] - Train/test split, decision trees, random forest
//! - [`evaluation`] - Classification metrics and confusion matrix
//! - [`pipeline`] - Configured end-to-end run
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data
pub mod dataset;
pub mod analysis;

// Modelling
pub mod preprocessing;
pub mod training;
pub mod evaluation;
pub mod pipeline;

// Services
pub mod cli;

pub use error::{Result, WineError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{Result, WineError};

    // Data
    pub use crate::dataset::{extract_features_and_target, DataLoader, Dataset, TARGET_COLUMN, WINE_COLUMNS};

    // Analysis
    pub use crate::analysis::{correlation_matrix, describe, group_means, null_report, target_correlations};

    // Preprocessing
    pub use crate::preprocessing::{scale_split, ScalingPolicy, StandardScaler};

    // Training
    pub use crate::training::{train_test_split, ForestConfig, MaxFeatures, RandomForest, TrainTestSplitter};

    // Evaluation
    pub use crate::evaluation::{evaluate, ConfusionMatrix, EvaluationReport, WINE_LABELS};

    // Pipeline
    pub use crate::pipeline::{PipelineConfig, PipelineOutcome, PipelineRunner};
}
