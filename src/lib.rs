//! `emotree` learns one-vs-rest decision tree classifiers from binary attribute vectors.
//!
//! This crate holds the shared foundation: the [`Dataset`] container with its rotating k-fold
//! partitions, the error type, hyperparameter checking through [`ParamGuard`] and the traits
//! every learner implements. The learning algorithms themselves live in `emotree-trees`.
//!
//! ## Data model
//!
//! A record is a fixed-width vector of attributes, each zero or one, stored as one row of an
//! `Array2<u8>`. Every record carries exactly one class label in `[1, n_classes]`. Learners for a
//! single class see the same records with boolean targets instead, see
//! [`Dataset::one_vs_rest`].
//!

pub mod dataset;
pub mod error;
mod metrics_classification;
mod param_guard;
pub mod prelude;
pub mod traits;

pub use dataset::{Dataset, DatasetBase, Label};
pub use param_guard::ParamGuard;

/// Common metrics functions for classification
pub mod metrics {
    pub use crate::metrics_classification::{percent_correct, ConfusionMatrix, ToConfusionMatrix};
}
