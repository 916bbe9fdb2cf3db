//!
//! # Emotion recognition with decision trees
//! `emotree-trees` classifies records of binary attributes, such as facial action units, into
//! one of several classes with an ensemble of binary decision trees.
//!
//! # The big picture
//!
//! `emotree-trees` builds on the dataset, metrics and hyperparameter machinery of the `emotree`
//! crate. It provides
//!
//! * [decision trees](DecisionTree) induced with information gain over binary attributes, and
//!   reduced-error pruning against a validation set,
//! * a [one-vs-rest ensemble](OneVsRest) with one tree per class, combining the trees with
//!   [priority or random aggregation](Aggregation),
//! * a parallel [k-fold cross-validation](CrossValidationParams) harness reporting per-fold and
//!   averaged confusion matrices.
//!

mod cross_validation;
mod decision_trees;
mod ensemble;

pub use cross_validation::*;
pub use decision_trees::*;
pub use ensemble::*;

// Re-export the common Result alias for convenience
pub use emotree::error::Result;
