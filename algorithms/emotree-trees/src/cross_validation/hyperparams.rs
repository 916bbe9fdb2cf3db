use emotree::{
    error::{Error, Result},
    ParamGuard,
};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::{Aggregation, OneVsRestParams, PruneParams};

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrossValidationValidParams {
    n_attributes: usize,
    k_folds: usize,
    ensemble: OneVsRestParams,
    prune: PruneParams,
    pruning: bool,
    shuffle: bool,
    seed: u64,
}

impl CrossValidationValidParams {
    pub fn n_attributes(&self) -> usize {
        self.n_attributes
    }

    pub fn k_folds(&self) -> usize {
        self.k_folds
    }

    pub fn ensemble(&self) -> &OneVsRestParams {
        &self.ensemble
    }

    pub fn prune(&self) -> &PruneParams {
        &self.prune
    }

    pub fn pruning(&self) -> bool {
        self.pruning
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// The set of hyperparameters of a k-fold cross-validation run
///
/// Every round trains a [one-vs-rest ensemble](struct.OneVsRest.html) on `k - 2` folds, prunes
/// it with the validation fold and scores it on the test fold.
///
/// Defaults:
/// * `n_attributes = 45`
/// * `k_folds = 10`
/// * `ensemble = OneVsRest::params()`, six classes and priority aggregation
/// * `prune = PruneParams::new()`
/// * `pruning = true`
/// * `shuffle = true`
/// * `seed = 42`
///
/// ### Example
///
/// ```rust
/// use emotree::prelude::*;
/// use emotree_trees::CrossValidationParams;
/// use ndarray::Array2;
///
/// // class 1 iff attribute 0 is set
/// let records = Array2::from_shape_fn((30, 3), |(i, j)| ((i >> j) & 1) as u8);
/// let targets = records.column(0).mapv(|a| if a == 1 { 1usize } else { 2 });
/// let dataset = Dataset::new(records, targets);
///
/// let report = CrossValidationParams::new()
///     .n_attributes(3)
///     .n_classes(2)
///     .k_folds(3)
///     .evaluate(&dataset)
///     .unwrap();
///
/// assert_eq!(report.folds().len(), 3);
/// assert_eq!(report.mean_accuracy(), 100.0);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrossValidationParams(CrossValidationValidParams);

impl CrossValidationParams {
    pub fn new() -> Self {
        Self(CrossValidationValidParams {
            n_attributes: 45,
            k_folds: 10,
            ensemble: OneVsRestParams::new(),
            prune: PruneParams::new(),
            pruning: true,
            shuffle: true,
            seed: 42,
        })
    }

    /// Sets the number of attributes every record must have
    pub fn n_attributes(mut self, n_attributes: usize) -> Self {
        self.0.n_attributes = n_attributes;
        self
    }

    /// Sets the number of folds, at least three
    pub fn k_folds(mut self, k_folds: usize) -> Self {
        self.0.k_folds = k_folds;
        self
    }

    pub fn ensemble(mut self, ensemble: OneVsRestParams) -> Self {
        self.0.ensemble = ensemble;
        self
    }

    /// Sets the number of classes of the ensemble
    pub fn n_classes(mut self, n_classes: usize) -> Self {
        self.0.ensemble = self.0.ensemble.n_classes(n_classes);
        self
    }

    /// Switch between random and priority aggregation
    pub fn random_aggregation(mut self, random: bool) -> Self {
        let aggregation = if random {
            Aggregation::Random
        } else {
            Aggregation::Priority
        };
        self.0.ensemble = self.0.ensemble.aggregation(aggregation);
        self
    }

    pub fn prune(mut self, prune: PruneParams) -> Self {
        self.0.prune = prune;
        self
    }

    /// Sets the accuracy change the pruning loop compares against
    pub fn prune_threshold(mut self, threshold: f64) -> Self {
        self.0.prune = self.0.prune.threshold(threshold);
        self
    }

    /// Enable or disable reduced-error pruning with the validation fold
    pub fn pruning(mut self, pruning: bool) -> Self {
        self.0.pruning = pruning;
        self
    }

    /// Shuffle the records before partitioning
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.0.shuffle = shuffle;
        self
    }

    /// Sets the seed of the shuffle, every fold derives its own generator from it
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl Default for CrossValidationParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamGuard for CrossValidationParams {
    type Checked = CrossValidationValidParams;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.k_folds < 3 {
            return Err(Error::Parameters(format!(
                "at least three folds are required for test, validation and training, got {}",
                self.0.k_folds
            )));
        }
        if self.0.n_attributes == 0 {
            return Err(Error::Parameters(
                "records need at least one attribute".into(),
            ));
        }

        self.0.ensemble.check_ref()?;
        if self.0.pruning {
            self.0.prune.check_ref()?;
        }

        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
