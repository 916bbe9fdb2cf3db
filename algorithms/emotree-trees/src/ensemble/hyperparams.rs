use emotree::{
    error::{Error, Result},
    ParamGuard,
};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::{DecisionTree, DecisionTreeValidParams, OneVsRest};

/// How the outputs of the per-class trees are combined into a single class
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Aggregation {
    /// Prefer the positive tree whose leaf is closest to the root, then the lowest leaf entropy.
    /// Without positive trees, prefer the deepest negative leaf.
    Priority,
    /// Pick a positive tree uniformly at random, or any class if no tree is positive
    Random,
}

/// When repeated pruning passes stop
///
/// Every pass prunes all trees once and measures the change of the mean per-tree validation
/// accuracy.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Halting {
    /// Continue while a pass improves accuracy by more than the threshold
    WhileImproving,
    /// Continue while a pass changes accuracy by at most the threshold
    WhileStalled,
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PruneValidParams {
    threshold: f64,
    halting: Halting,
    max_passes: usize,
}

impl PruneValidParams {
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn halting(&self) -> Halting {
        self.halting
    }

    pub fn max_passes(&self) -> usize {
        self.max_passes
    }
}

/// Control of the pruning loop
///
/// Defaults:
/// * `threshold = 0.001`
/// * `halting = Halting::WhileImproving`
/// * `max_passes = 16`
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PruneParams(PruneValidParams);

impl PruneParams {
    pub fn new() -> Self {
        Self(PruneValidParams {
            threshold: 0.001,
            halting: Halting::WhileImproving,
            max_passes: 16,
        })
    }

    /// Sets the change in mean validation accuracy the halting rule compares against
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.0.threshold = threshold;
        self
    }

    pub fn halting(mut self, halting: Halting) -> Self {
        self.0.halting = halting;
        self
    }

    /// Sets the hard limit of pruning passes
    pub fn max_passes(mut self, max_passes: usize) -> Self {
        self.0.max_passes = max_passes;
        self
    }
}

impl Default for PruneParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamGuard for PruneParams {
    type Checked = PruneValidParams;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if !self.0.threshold.is_finite() || self.0.threshold < 0.0 {
            Err(Error::Parameters(format!(
                "pruning threshold should be a non-negative number, but was {}",
                self.0.threshold
            )))
        } else if self.0.max_passes == 0 {
            Err(Error::Parameters(
                "at least one pruning pass is required".into(),
            ))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// The set of hyperparameters of a [one-vs-rest ensemble](struct.OneVsRest.html).
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OneVsRestValidParams {
    n_classes: usize,
    max_depth: Option<usize>,
    aggregation: Aggregation,
    seed: u64,
}

impl OneVsRestValidParams {
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Hyperparameters shared by the trees of the ensemble
    pub fn tree(&self) -> Result<DecisionTreeValidParams> {
        DecisionTree::params()
            .max_depth(self.max_depth)
            .seed(self.seed)
            .check()
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OneVsRestParams(OneVsRestValidParams);

impl OneVsRestParams {
    pub fn new() -> Self {
        Self(OneVsRestValidParams {
            n_classes: 6,
            max_depth: None,
            aggregation: Aggregation::Priority,
            seed: 42,
        })
    }

    /// Sets the number of classes, one tree is trained per class
    pub fn n_classes(mut self, n_classes: usize) -> Self {
        self.0.n_classes = n_classes;
        self
    }

    /// Sets the optional depth limit of every tree
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.0.max_depth = max_depth;
        self
    }

    pub fn aggregation(mut self, aggregation: Aggregation) -> Self {
        self.0.aggregation = aggregation;
        self
    }

    /// Sets the seed for attribute tie-breaks and random aggregation
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl Default for OneVsRestParams {
    fn default() -> Self {
        Self::new()
    }
}

impl OneVsRest {
    /// Defaults are provided if the optional parameters are not specified:
    /// * `n_classes = 6`
    /// * `max_depth = None`
    /// * `aggregation = Aggregation::Priority`
    /// * `seed = 42`
    // Violates the convention that new should return a value of type `Self`
    #[allow(clippy::new_ret_no_self)]
    pub fn params() -> OneVsRestParams {
        OneVsRestParams::new()
    }
}

impl ParamGuard for OneVsRestParams {
    type Checked = OneVsRestValidParams;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.n_classes < 2 {
            Err(Error::Parameters(format!(
                "at least two classes are required, but got {}",
                self.0.n_classes
            )))
        } else if self.0.max_depth == Some(0) {
            Err(Error::Parameters(
                "maximal depth should be greater than zero".into(),
            ))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
