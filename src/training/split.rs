//! Seeded train/test partitioning

use crate::dataset::Dataset;
use crate::error::{Result, WineError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Row indices of a single train/test split
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Shuffled holdout splitter
#[derive(Debug, Clone)]
pub struct TrainTestSplitter {
    test_fraction: f64,
    random_state: u64,
}

impl TrainTestSplitter {
    /// Create a splitter holding out `test_fraction` of the rows
    pub fn new(test_fraction: f64) -> Result<Self> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(WineError::InvalidInput(format!(
                "test_fraction must be in (0, 1), got {}",
                test_fraction
            )));
        }
        Ok(Self {
            test_fraction,
            random_state: 0,
        })
    }

    /// Set random state for reproducibility
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Number of test rows for a dataset of `n_samples` rows
    pub fn test_size(&self, n_samples: usize) -> usize {
        (n_samples as f64 * self.test_fraction).ceil() as usize
    }

    /// Permute `0..n_samples` and cut it into test and train indices.
    ///
    /// The first `test_size` permuted rows form the test side; both sides keep
    /// permutation order.
    pub fn split_indices(&self, n_samples: usize) -> Result<SplitIndices> {
        if n_samples == 0 {
            return Err(WineError::InvalidInput("cannot split an empty dataset".to_string()));
        }

        let n_test = self.test_size(n_samples);
        if n_test == 0 || n_test >= n_samples {
            return Err(WineError::InvalidInput(format!(
                "test_fraction {} leaves an empty side for {} samples ({} test)",
                self.test_fraction, n_samples, n_test
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        indices.shuffle(&mut rng);

        let train_indices = indices.split_off(n_test);
        Ok(SplitIndices {
            train_indices,
            test_indices: indices,
        })
    }

    /// Split a dataset into `(train, test)`
    pub fn split(&self, dataset: &Dataset) -> Result<(Dataset, Dataset)> {
        let split = self.split_indices(dataset.n_rows())?;
        Ok((
            dataset.select_rows(&split.train_indices),
            dataset.select_rows(&split.test_indices),
        ))
    }
}

/// Split `dataset` into `(train, test)` with a seeded shuffle
pub fn train_test_split(dataset: &Dataset, test_fraction: f64, seed: u64) -> Result<(Dataset, Dataset)> {
    TrainTestSplitter::new(test_fraction)?
        .with_random_state(seed)
        .split(dataset)
}
