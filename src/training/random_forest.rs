//! Random forest classifier

use super::config::{ForestConfig, MaxFeatures};
use super::decision_tree::{Criterion, DecisionTree};
use crate::error::{Result, WineError};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bagged ensemble of decision trees combined by majority vote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Individual trees
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Maximum features per split
    pub max_features: MaxFeatures,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Random state
    pub random_state: u64,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
    /// Number of features
    n_features: usize,
    /// Sorted distinct training labels
    classes: Vec<i64>,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::from_config(&ForestConfig::default())
    }
}

impl RandomForest {
    /// Create an unfitted forest of `n_estimators` trees with default settings
    pub fn new(n_estimators: usize) -> Self {
        Self::from_config(&ForestConfig::default().with_n_estimators(n_estimators))
    }

    /// Create an unfitted forest from a configuration
    pub fn from_config(config: &ForestConfig) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators: config.n_estimators,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
            max_features: config.max_features,
            bootstrap: config.bootstrap,
            criterion: config.criterion,
            random_state: config.random_state,
            feature_importances: None,
            n_features: 0,
            classes: Vec::new(),
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set max features strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Enable or disable bootstrap sampling
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Fit the forest to training data.
    ///
    /// Tree `i` draws its bootstrap sample and split features from a generator
    /// seeded with `random_state + i`, so the fitted forest does not depend on
    /// how rayon schedules the trees.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<&mut Self> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(WineError::FitError(format!(
                "feature matrix has {} rows but target has {}",
                n_samples,
                y.len()
            )));
        }
        if n_samples == 0 {
            return Err(WineError::FitError("cannot fit on zero samples".to_string()));
        }
        if self.n_estimators == 0 {
            return Err(WineError::FitError("n_estimators must be at least 1".to_string()));
        }

        let mut classes: Vec<i64> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        if classes.len() < 2 {
            return Err(WineError::FitError(format!(
                "target needs at least 2 distinct classes, found {:?}",
                classes
            )));
        }

        self.classes = classes;
        self.n_features = x.ncols();
        let max_features = self.max_features.resolve(self.n_features);

        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| -> Result<DecisionTree> {
                let seed = self.random_state.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let mut tree = DecisionTree::new()
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf)
                    .with_max_features(max_features)
                    .with_criterion(self.criterion);
                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }

                if self.bootstrap {
                    let sample_indices: Vec<usize> =
                        (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                    let x_boot = x.select(Axis(0), &sample_indices);
                    let y_boot = y.select(Axis(0), &sample_indices);

                    tree = tree.with_random_state(rng.next_u64());
                    tree.fit(&x_boot, &y_boot)?;
                } else {
                    tree = tree.with_random_state(rng.next_u64());
                    tree.fit(x, y)?;
                }

                Ok(tree)
            })
            .collect::<Result<Vec<DecisionTree>>>()?;

        self.trees = trees;
        self.compute_feature_importances();

        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        if self.trees.is_empty() {
            return;
        }

        let mut total_importances = Array1::<f64>::zeros(self.n_features);
        for imp in self.trees.iter().filter_map(|t| t.feature_importances()) {
            total_importances += imp;
        }
        total_importances /= self.trees.len() as f64;

        let total = total_importances.sum();
        if total > 0.0 {
            total_importances /= total;
        }

        self.feature_importances = Some(total_importances);
    }

    /// Per-sample vote counts, one column per entry of [`classes`](Self::classes)
    fn vote_counts(&self, x: &Array2<f64>) -> Result<Array2<usize>> {
        if self.trees.is_empty() {
            return Err(WineError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(WineError::SchemaError(format!(
                "forest fitted on {} features, got {}",
                self.n_features,
                x.ncols()
            )));
        }

        let all_predictions: Vec<Array1<i64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let mut votes = Array2::<usize>::zeros((x.nrows(), self.classes.len()));
        for preds in &all_predictions {
            for (i, label) in preds.iter().enumerate() {
                if let Ok(class_idx) = self.classes.binary_search(label) {
                    votes[[i, class_idx]] += 1;
                }
            }
        }

        Ok(votes)
    }

    /// Predict one label per row by majority vote; ties go to the smallest label
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<i64>> {
        let votes = self.vote_counts(x)?;

        Ok(votes
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (idx, &count) in row.iter().enumerate() {
                    if count > row[best] {
                        best = idx;
                    }
                }
                self.classes[best]
            })
            .collect())
    }

    /// Fraction of trees voting for each class, columns ordered as [`classes`](Self::classes)
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let votes = self.vote_counts(x)?;
        let n_trees = self.trees.len() as f64;
        Ok(votes.mapv(|v| v as f64 / n_trees))
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Sorted labels seen during fit
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Get number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_blobs() -> (Array2<f64>, Array1<i64>) {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.1],
            [0.2, 0.2],
            [1.0, 1.0],
            [1.1, 1.1],
            [1.2, 1.2],
        ];
        let y = array![5, 5, 5, 7, 7, 7];
        (x, y)
    }

    #[test]
    fn test_classifier() {
        let (x, y) = two_blobs();

        let mut rf = RandomForest::new(10).with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let predictions = rf.predict(&x).unwrap();
        let correct = predictions.iter().zip(y.iter()).filter(|(p, a)| p == a).count();

        assert!(correct >= 5, "only {} of 6 correct", correct);
        assert_eq!(rf.n_trees(), 10);
        assert_eq!(rf.classes(), &[5, 7]);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = two_blobs();
        let probe = array![[0.5, 0.5], [0.6, 0.4], [0.05, 1.15]];

        let mut a = RandomForest::new(25).with_random_state(7);
        let mut b = RandomForest::new(25).with_random_state(7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict(&probe).unwrap(), b.predict(&probe).unwrap());
        assert_eq!(a.predict_proba(&probe).unwrap(), b.predict_proba(&probe).unwrap());
    }

    #[test]
    fn test_predict_proba_rows_sum_to_one() {
        let (x, y) = two_blobs();

        let mut rf = RandomForest::new(10).with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let proba = rf.predict_proba(&x).unwrap();
        assert_eq!(proba.dim(), (6, 2));
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_feature_importances_normalized() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]];
        let y = array![0, 0, 1, 1];

        let mut rf = RandomForest::new(10).with_random_state(42).with_max_features(MaxFeatures::All);
        rf.fit(&x, &y).unwrap();

        let importances = rf.feature_importances().unwrap();
        assert_eq!(importances.len(), 2);
        assert!((importances.sum() - 1.0).abs() < 1e-9);
        assert!(importances[0] >= importances[1]);
    }

    #[test]
    fn test_single_class_is_fit_error() {
        let x = array![[1.0], [2.0]];
        let y = array![6, 6];
        let err = RandomForest::new(5).fit(&x, &y).unwrap_err();
        assert!(matches!(err, WineError::FitError(_)));
    }

    #[test]
    fn test_row_mismatch_is_fit_error() {
        let x = array![[1.0], [2.0]];
        let y = array![6, 5, 4];
        assert!(matches!(RandomForest::new(5).fit(&x, &y), Err(WineError::FitError(_))));
    }

    #[test]
    fn test_predict_before_fit() {
        let rf = RandomForest::new(5);
        assert!(matches!(rf.predict(&array![[1.0]]), Err(WineError::ModelNotFitted)));
    }

    #[test]
    fn test_without_bootstrap_fits_training_data() {
        let (x, y) = two_blobs();
        let mut rf = RandomForest::new(3).with_bootstrap(false).with_max_features(MaxFeatures::All);
        rf.fit(&x, &y).unwrap();
        assert_eq!(rf.predict(&x).unwrap(), y);
    }
}
