//! Model training
//!
//! Seeded train/test splitting and a CART-based random forest classifier.

mod config;
pub mod decision_tree;
pub mod random_forest;
pub mod split;

pub use config::{ForestConfig, MaxFeatures};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use random_forest::RandomForest;
pub use split::{train_test_split, SplitIndices, TrainTestSplitter};
