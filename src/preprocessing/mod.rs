//! Feature preprocessing
//!
//! Standardization of the feature matrix and the policy deciding whether the
//! scaled matrix actually reaches the classifier.

mod scaler;

pub use scaler::StandardScaler;

use crate::error::{Result, WineError};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// How the scaling stage feeds the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalingPolicy {
    /// Fit on train, transform train and test, train on the scaled matrix
    #[default]
    Applied,
    /// Fit and transform train, then train on the raw features anyway
    Discarded,
    /// Skip the stage
    Disabled,
}

impl FromStr for ScalingPolicy {
    type Err = WineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "applied" => Ok(ScalingPolicy::Applied),
            "discarded" => Ok(ScalingPolicy::Discarded),
            "disabled" | "none" => Ok(ScalingPolicy::Disabled),
            other => Err(WineError::ConfigError(format!(
                "unknown scaling policy '{}' (expected applied, discarded or disabled)",
                other
            ))),
        }
    }
}

impl fmt::Display for ScalingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalingPolicy::Applied => "applied",
            ScalingPolicy::Discarded => "discarded",
            ScalingPolicy::Disabled => "disabled",
        };
        f.write_str(name)
    }
}

/// Output of the scaling stage
#[derive(Debug, Clone)]
pub struct ScaledSplit {
    /// Train features handed to `fit`
    pub x_train: Array2<f64>,
    /// Test features handed to `predict`
    pub x_test: Array2<f64>,
    /// Scaler fitted on train, if the stage ran
    pub scaler: Option<StandardScaler>,
}

/// Run the scaling stage on a train/test pair under `policy`.
///
/// The scaler only ever sees train rows.
pub fn scale_split(policy: ScalingPolicy, x_train: Array2<f64>, x_test: Array2<f64>) -> Result<ScaledSplit> {
    match policy {
        ScalingPolicy::Applied => {
            let mut scaler = StandardScaler::new();
            let train_scaled = scaler.fit_transform(&x_train)?;
            let test_scaled = scaler.transform(&x_test)?;
            Ok(ScaledSplit {
                x_train: train_scaled,
                x_test: test_scaled,
                scaler: Some(scaler),
            })
        }
        ScalingPolicy::Discarded => {
            let mut scaler = StandardScaler::new();
            let discarded = scaler.fit_transform(&x_train)?;
            debug!(rows = discarded.nrows(), "Scaled train features computed and discarded");
            Ok(ScaledSplit {
                x_train,
                x_test,
                scaler: Some(scaler),
            })
        }
        ScalingPolicy::Disabled => Ok(ScaledSplit {
            x_train,
            x_test,
            scaler: None,
        }),
    }
}
