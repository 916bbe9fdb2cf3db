use ndarray::{Array1, Array2, ArrayView1};
use rand::{rngs::SmallRng, rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use emotree::{
    dataset::Records,
    error::{Error, Result},
    traits::*,
    Dataset, DatasetBase,
};

use super::aggregation::{priority_vote, random_vote};
use super::{Aggregation, Halting, OneVsRestValidParams, PruneValidParams};
use crate::{DecisionTree, LeafOutcome};

/// A one-vs-rest ensemble of decision trees
///
/// The tree at index `i` separates class `i + 1` from all other classes. To classify a record
/// every tree is evaluated and the outcomes are combined according to the configured
/// [`Aggregation`].
///
/// ### Example
///
/// ```rust
/// use emotree::prelude::*;
/// use emotree_trees::OneVsRest;
/// use ndarray::array;
///
/// let dataset = Dataset::new(
///     array![[1, 0, 0], [0, 1, 0], [0, 0, 1], [1, 0, 1], [0, 1, 1], [1, 1, 0]],
///     array![1usize, 2, 3, 1, 2, 1],
/// );
///
/// let ensemble = OneVsRest::params().n_classes(3).fit(&dataset).unwrap();
/// let predictions = ensemble.predict(dataset.records()).unwrap();
///
/// assert_eq!(predictions.len(), dataset.nsamples());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct OneVsRest {
    trees: Vec<DecisionTree>,
    priorities: Option<Array1<f64>>,
    aggregation: Aggregation,
    seed: u64,
}

/// Summary of the repeated pruning passes over an ensemble
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PruneSummary {
    /// Number of full passes over all trees
    pub passes: usize,
    /// Internal nodes collapsed over all passes
    pub collapsed: usize,
    /// Mean validation accuracy of the trees before the first pass
    pub accuracy_before: f64,
    /// Mean validation accuracy of the trees after the last pass
    pub accuracy_after: f64,
}

impl OneVsRestValidParams {
    /// Fit one tree per class
    ///
    /// Every tree draws its attribute tie-breaks from its own generator, seeded from `rng`, so
    /// the trees do not depend on each other.
    pub fn fit_with_rng<R: Rng>(&self, dataset: &Dataset<usize>, rng: &mut R) -> Result<OneVsRest> {
        if dataset.records.nrows() != dataset.targets.len() {
            return Err(Error::MismatchedLengths {
                records: dataset.records.nrows(),
                targets: dataset.targets.len(),
            });
        }
        if let Some(label) = dataset
            .targets
            .iter()
            .find(|label| **label == 0 || **label > self.n_classes())
        {
            return Err(Error::LabelOutOfRange {
                label: *label,
                n_classes: self.n_classes(),
            });
        }

        let tree_params = self.tree()?;
        let trees = (1..=self.n_classes())
            .map(|class| {
                let mut tree_rng = SmallRng::seed_from_u64(rng.gen());
                tree_params.fit_with_rng(&dataset.one_vs_rest(class), &mut tree_rng)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            n_classes = self.n_classes(),
            max_depth = trees.iter().map(|t| t.max_depth()).max().unwrap_or(0),
            "fitted one-vs-rest ensemble"
        );

        Ok(OneVsRest {
            trees,
            priorities: None,
            aggregation: self.aggregation(),
            seed: rng.gen(),
        })
    }
}

impl Fit<Array2<u8>, Array1<usize>, Error> for OneVsRestValidParams {
    type Object = OneVsRest;

    fn fit(&self, dataset: &DatasetBase<Array2<u8>, Array1<usize>>) -> Result<Self::Object> {
        let mut rng = StdRng::seed_from_u64(self.seed());
        self.fit_with_rng(dataset, &mut rng)
    }
}

impl OneVsRest {
    /// The trees, ordered by class
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn n_classes(&self) -> usize {
        self.trees.len()
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    /// Tree priorities used to break ties in priority aggregation, if set
    pub fn priorities(&self) -> Option<&Array1<f64>> {
        self.priorities.as_ref()
    }

    /// Attach tree priorities, e.g. computed by [`OneVsRest::tree_priority`]
    pub fn set_priorities(&mut self, priorities: Array1<f64>) -> Result<()> {
        if priorities.len() != self.trees.len() {
            return Err(Error::Parameters(format!(
                "expected {} tree priorities, got {}",
                self.trees.len(),
                priorities.len()
            )));
        }

        self.priorities = Some(priorities);
        Ok(())
    }

    /// Accuracy of each tree on its one-vs-rest view of `validation`
    pub fn tree_priority(&self, validation: &Dataset<usize>) -> Result<Array1<f64>> {
        self.check_records(&validation.records)?;

        self.trees
            .iter()
            .enumerate()
            .map(|(idx, tree)| {
                tree.accuracy_for(&validation.records, &validation.binary_targets(idx + 1))
            })
            .collect()
    }

    /// Mean of the tree priorities on `validation`
    pub fn mean_tree_accuracy(&self, validation: &Dataset<usize>) -> Result<f64> {
        Ok(self.tree_priority(validation)?.mean().unwrap_or(0.0))
    }

    /// The leaf reached in every tree by a single record
    ///
    /// ### Panics
    ///
    /// If `x` is shorter than an attribute tested by one of the trees
    pub fn outcomes(&self, x: ArrayView1<u8>) -> Vec<LeafOutcome> {
        self.trees.iter().map(|tree| tree.classify(x)).collect()
    }

    /// Predict the class of every record, drawing random choices from `rng`
    pub fn predict_with_rng<R: Rng>(&self, x: &Array2<u8>, rng: &mut R) -> Result<Array1<usize>> {
        self.check_records(x)?;
        let priorities = self.priorities.as_ref().and_then(|p| p.as_slice());

        x.rows()
            .into_iter()
            .map(|row| {
                let outcomes = self.outcomes(row);
                let class = match self.aggregation {
                    Aggregation::Priority => priority_vote(&outcomes, priorities),
                    Aggregation::Random => random_vote(&outcomes, rng),
                };

                class.ok_or_else(|| Error::InvalidState("ensemble has no trees".to_string()))
            })
            .collect()
    }

    /// Prune every tree until the halting rule stops
    ///
    /// One pass prunes each tree once with its one-vs-rest view of `validation`. After every
    /// pass the change of the mean tree accuracy is compared with the threshold:
    /// `Halting::WhileImproving` continues while the change exceeds it, `Halting::WhileStalled`
    /// continues while it does not. At most `max_passes` passes run.
    pub fn prune(
        &mut self,
        validation: &Dataset<usize>,
        params: &PruneValidParams,
    ) -> Result<PruneSummary> {
        self.check_records(&validation.records)?;

        let targets = (1..=self.trees.len())
            .map(|class| validation.binary_targets(class))
            .collect::<Vec<_>>();

        let initial = self.mean_tree_accuracy(validation)?;
        let mut summary = PruneSummary {
            passes: 0,
            collapsed: 0,
            accuracy_before: initial,
            accuracy_after: initial,
        };

        while summary.passes < params.max_passes() {
            let before = summary.accuracy_after;

            for (tree, targets) in self.trees.iter_mut().zip(targets.iter()) {
                summary.collapsed += tree.prune_with(&validation.records, targets)?.collapsed;
            }
            summary.passes += 1;
            summary.accuracy_after = self.mean_tree_accuracy(validation)?;

            let change = summary.accuracy_after - before;
            debug!(pass = summary.passes, change, "pruning pass");

            let proceed = match params.halting() {
                Halting::WhileImproving => change > params.threshold(),
                Halting::WhileStalled => change.abs() <= params.threshold(),
            };
            if !proceed {
                break;
            }
        }

        Ok(summary)
    }

    fn check_records(&self, records: &Array2<u8>) -> Result<()> {
        match self.trees.first() {
            Some(tree) if tree.num_features() != records.nfeatures() => Err(Error::FeatureCount {
                expected: tree.num_features(),
                found: records.nfeatures(),
            }),
            _ => Ok(()),
        }
    }
}

impl<'a> Predict<&'a Array2<u8>, Result<Array1<usize>>> for OneVsRest {
    /// Predict 1-based class labels
    ///
    /// Random aggregation draws from a generator seeded at fitting time, so repeated calls
    /// return the same labels.
    fn predict(&self, x: &'a Array2<u8>) -> Result<Array1<usize>> {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        self.predict_with_rng(x, &mut rng)
    }
}
