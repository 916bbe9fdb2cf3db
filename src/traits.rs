//! Provide traits for different classes of algorithms
//!

use crate::dataset::DatasetBase;
use std::error::Error;

/// Fittable algorithms
///
/// A fittable algorithm takes a dataset and creates a concept of some kind about it. For example
/// a decision tree learns which attributes separate the targets, a one-vs-rest ensemble learns
/// one such tree per class.
///
/// The hyperparameters are checked before fitting, see `ParamGuard`.
pub trait Fit<R, T, E: Error + From<crate::error::Error>> {
    type Object;

    fn fit(&self, dataset: &DatasetBase<R, T>) -> Result<Self::Object, E>;
}

/// Predict with model
///
/// A fitted model maps a set of records to a set of targets, one target per record.
pub trait Predict<R, T> {
    fn predict(&self, x: R) -> T;
}
