use emotree::{
    error::{Error, Result},
    ParamGuard,
};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::DecisionTree;

/// The set of hyperparameters that can be specified for fitting a
/// [decision tree](struct.DecisionTree.html).
///
/// ### Example
///
/// ```rust
/// use emotree::prelude::*;
/// use emotree_trees::DecisionTree;
/// use ndarray::array;
///
/// // attribute 0 decides the target on its own
/// let dataset = Dataset::new(
///     array![[1, 0, 0], [0, 1, 0], [1, 1, 0], [0, 0, 1]],
///     array![true, false, true, false],
/// );
///
/// let tree = DecisionTree::params().seed(7).fit(&dataset).unwrap();
///
/// assert_eq!(tree.features(), vec![0]);
/// assert_eq!(tree.predict(dataset.records()), dataset.targets);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecisionTreeValidParams {
    max_depth: Option<usize>,
    seed: u64,
}

impl DecisionTreeValidParams {
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecisionTreeParams(DecisionTreeValidParams);

impl DecisionTreeParams {
    pub fn new() -> Self {
        Self(DecisionTreeValidParams {
            max_depth: None,
            seed: 42,
        })
    }

    /// Sets the optional limit to the depth of the decision tree
    ///
    /// Without a limit the depth is still bounded by the number of attributes, since every
    /// attribute is used at most once along a path.
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.0.max_depth = max_depth;
        self
    }

    /// Sets the seed of the random source which breaks ties between equally good attributes
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl Default for DecisionTreeParams {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    /// Defaults are provided if the optional parameters are not specified:
    /// * `max_depth = None`
    /// * `seed = 42`
    // Violates the convention that new should return a value of type `Self`
    #[allow(clippy::new_ret_no_self)]
    pub fn params() -> DecisionTreeParams {
        DecisionTreeParams::new()
    }
}

impl ParamGuard for DecisionTreeParams {
    type Checked = DecisionTreeValidParams;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.max_depth == Some(0) {
            Err(Error::Parameters(
                "maximal depth should be greater than zero, use a single leaf otherwise".into(),
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
