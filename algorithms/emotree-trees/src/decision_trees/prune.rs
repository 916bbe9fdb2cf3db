//! Reduced-error pruning
//!
//! Every internal node is visited bottom-up and replaced by a leaf predicting the majority of its
//! training records whenever that leaf classifies the validation records reaching the node at
//! least as well as the subtree does. Since only records reaching a node are affected by
//! collapsing it, the accuracy of the whole tree on the validation set never decreases.
use ndarray::{Array1, Array2};

use emotree::{dataset::Records, error::Result, Dataset};

use super::{DecisionTree, Leaf, TreeNode};

/// Summary of a single pruning pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    /// Validation records classified correctly after the pass
    pub correct: usize,
    /// Number of internal nodes collapsed into leaves
    pub collapsed: usize,
}

fn count_correct(targets: &Array1<bool>, rows: &[usize], value: bool) -> usize {
    rows.iter().filter(|row| targets[**row] == value).count()
}

impl TreeNode {
    fn prune_rows(
        &mut self,
        records: &Array2<u8>,
        targets: &Array1<bool>,
        rows: &[usize],
    ) -> PruneOutcome {
        let (replacement, outcome) = match self {
            TreeNode::Leaf(leaf) => {
                return PruneOutcome {
                    correct: count_correct(targets, rows, leaf.value),
                    collapsed: 0,
                }
            }
            TreeNode::Internal(internal) => {
                let attribute = internal.attribute;
                let (zeros, ones): (Vec<usize>, Vec<usize>) = rows
                    .iter()
                    .partition(|row| records[(**row, attribute)] == 0);

                let mut subtree = PruneOutcome::default();
                for (child, rows) in internal.children.iter_mut().zip([zeros, ones].iter()) {
                    let outcome = child.prune_rows(records, targets, rows);
                    subtree.correct += outcome.correct;
                    subtree.collapsed += outcome.collapsed;
                }

                let leaf = Leaf::majority(internal.distribution);
                let as_leaf = count_correct(targets, rows, leaf.value);

                if as_leaf >= subtree.correct {
                    (
                        Some(leaf),
                        PruneOutcome {
                            correct: as_leaf,
                            collapsed: subtree.collapsed + 1,
                        },
                    )
                } else {
                    (None, subtree)
                }
            }
        };

        if let Some(leaf) = replacement {
            *self = TreeNode::Leaf(leaf);
        }

        outcome
    }
}

impl DecisionTree {
    /// Prune the tree with a held-out validation set
    ///
    /// Performs one bottom-up pass of reduced-error pruning. A second pass with the same
    /// validation set does not change the tree any further.
    pub fn prune(&mut self, validation: &Dataset<bool>) -> Result<PruneOutcome> {
        self.prune_with(&validation.records, &validation.targets)
    }

    /// Prune with validation records and their one-vs-rest targets, see [`DecisionTree::prune`]
    pub fn prune_with(
        &mut self,
        records: &Array2<u8>,
        targets: &Array1<bool>,
    ) -> Result<PruneOutcome> {
        self.check_records(records, targets)?;

        let rows = (0..records.nsamples()).collect::<Vec<_>>();
        Ok(self.root_node_mut().prune_rows(records, targets, &rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision_trees::{Distribution, Internal};
    use emotree::{error::Error, traits::Fit};
    use ndarray::{array, Array};
    use ndarray_rand::{rand_distr::Uniform, RandomExt};
    use rand::{rngs::SmallRng, SeedableRng};

    fn leaf(value: bool) -> TreeNode {
        TreeNode::Leaf(Leaf {
            value,
            entropy: 0.0,
        })
    }

    /// Splits on attribute 0, then on attribute 1 inside the one branch
    fn two_level_tree() -> DecisionTree {
        DecisionTree::from_root(
            TreeNode::Internal(Internal {
                attribute: 0,
                distribution: Distribution::new(3, 5),
                children: Box::new([
                    leaf(false),
                    TreeNode::Internal(Internal {
                        attribute: 1,
                        distribution: Distribution::new(3, 1),
                        children: Box::new([leaf(false), leaf(true)]),
                    }),
                ]),
            }),
            2,
        )
    }

    #[test]
    fn useless_split_is_collapsed() -> Result<()> {
        let mut tree = two_level_tree();

        // attribute 1 does not matter on the validation set, the majority leaf is as good
        let validation = Dataset::new(
            array![[1, 0], [1, 1], [0, 0], [0, 1]],
            array![true, true, false, false],
        );

        let outcome = tree.prune(&validation)?;

        assert_eq!(outcome.collapsed, 1);
        assert_eq!(outcome.correct, 4);
        assert_eq!(tree.num_leaves(), 2);
        assert_eq!(tree.features(), vec![0]);

        Ok(())
    }

    #[test]
    fn useful_split_is_kept() -> Result<()> {
        let mut tree = two_level_tree();

        let validation = Dataset::new(
            array![[1, 0], [1, 1], [1, 1], [0, 0], [0, 1]],
            array![false, true, true, false, false],
        );

        let outcome = tree.prune(&validation)?;

        assert_eq!(outcome.collapsed, 0);
        assert_eq!(outcome.correct, 5);
        assert_eq!(tree, two_level_tree());

        Ok(())
    }

    #[test]
    fn unreached_subtrees_are_collapsed() -> Result<()> {
        let mut tree = two_level_tree();

        // no validation record reaches the subtree below attribute 0 == 1
        let validation = Dataset::new(array![[0, 0], [0, 1]], array![false, false]);
        let outcome = tree.prune(&validation)?;

        assert_eq!(outcome.correct, 2);
        assert_eq!(outcome.collapsed, 2);
        assert_eq!(tree.num_nodes(), 1);
        assert_eq!(tree.root_node().prediction(), Some(false));

        Ok(())
    }

    #[test]
    fn pruning_is_idempotent_and_never_hurts() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..10 {
            let records = Array::random_using((120, 6), Uniform::new(0u8, 2), &mut rng);
            // noisy copy of attribute 2
            let targets = records
                .rows()
                .into_iter()
                .map(|r| (r[2] == 1) ^ (r[4] & r[5] == 1))
                .collect::<Array1<bool>>();
            let dataset = Dataset::new(records, targets);

            let training = dataset.select(&(0..80).collect::<Vec<_>>());
            let validation = dataset.select(&(80..120).collect::<Vec<_>>());

            let mut tree = DecisionTree::params().fit(&training)?;
            let before = tree.accuracy(&validation)?;

            tree.prune(&validation)?;
            let after = tree.accuracy(&validation)?;
            assert!(after >= before);

            let pruned = tree.clone();
            let outcome = tree.prune(&validation)?;
            assert_eq!(outcome.collapsed, 0);
            assert_eq!(tree, pruned);
        }

        Ok(())
    }

    #[test]
    fn wrong_width_is_rejected() {
        let mut tree = two_level_tree();
        let validation = Dataset::new(array![[0, 0, 1]], array![false]);

        assert!(matches!(
            tree.prune(&validation),
            Err(Error::FeatureCount {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn narrow_records_are_rejected() -> Result<()> {
        // the root tests attribute 2, a single column record would index past the end
        let tree = DecisionTree::from_root(
            TreeNode::Internal(Internal {
                attribute: 2,
                distribution: Distribution::new(1, 1),
                children: Box::new([leaf(false), leaf(true)]),
            }),
            3,
        );
        let narrow = Dataset::new(array![[0], [1]], array![false, true]);

        assert!(matches!(
            tree.accuracy(&narrow),
            Err(Error::FeatureCount {
                expected: 3,
                found: 1
            })
        ));
        assert!(matches!(
            tree.accuracy(&Dataset::new(array![[0, 0, 1]], array![true, false])),
            Err(Error::MismatchedLengths {
                records: 1,
                targets: 2
            })
        ));

        let wide = Dataset::new(array![[0, 0, 0], [1, 1, 1]], array![false, true]);
        assert_eq!(tree.accuracy(&wide)?, 1.0);

        Ok(())
    }
}
