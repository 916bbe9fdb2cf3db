//! Binary decision trees over binary attributes
//!
use std::collections::HashSet;
use std::fmt;

use ndarray::{Array1, Array2, ArrayView1};
use rand::{rngs::SmallRng, Rng, SeedableRng};

use super::entropy::{best_split_attribute, Distribution};
use super::{AttributeSet, DecisionTreeValidParams, NodeIter};
use emotree::{
    dataset::Records,
    error::{Error, Result},
    traits::*,
    Dataset, DatasetBase,
};

/// A leaf of the decision tree
///
/// The entropy is the entropy of the target distribution the leaf was created from, zero for
/// pure leaves. It ranks the confidence of leaves when the trees of an ensemble disagree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leaf {
    pub value: bool,
    pub entropy: f64,
}

impl Leaf {
    /// A leaf predicting the majority value of `distribution`, ties predict `false`
    pub fn majority(distribution: Distribution) -> Self {
        Leaf {
            value: distribution.majority(),
            entropy: distribution.entropy(),
        }
    }

    /// A leaf of a pure target set
    pub fn pure(value: bool) -> Self {
        Leaf {
            value,
            entropy: 0.0,
        }
    }
}

/// An internal node splitting on a binary attribute
///
/// `children[0]` receives the records where the attribute is zero, `children[1]` the records
/// where it is one. The training distribution is kept so the node can be collapsed into a leaf
/// during pruning.
#[derive(Clone, Debug, PartialEq)]
pub struct Internal {
    pub attribute: usize,
    pub distribution: Distribution,
    pub children: Box<[TreeNode; 2]>,
}

/// A node in the decision tree
#[derive(Clone, Debug, PartialEq)]
pub enum TreeNode {
    Leaf(Leaf),
    Internal(Internal),
}

/// The leaf reached by a record, together with its depth below the root
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeafOutcome {
    pub positive: bool,
    pub entropy: f64,
    pub depth: usize,
}

impl LeafOutcome {
    pub fn new(positive: bool, entropy: f64, depth: usize) -> Self {
        LeafOutcome {
            positive,
            entropy,
            depth,
        }
    }
}

impl TreeNode {
    /// Returns true if the node has no children
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf(_))
    }

    /// Returns `Some(value)` for leaf nodes and `None` for internal nodes.
    pub fn prediction(&self) -> Option<bool> {
        match self {
            TreeNode::Leaf(leaf) => Some(leaf.value),
            TreeNode::Internal(_) => None,
        }
    }

    /// Returns the split attribute for internal nodes and `None` for leaves
    pub fn attribute(&self) -> Option<usize> {
        match self {
            TreeNode::Leaf(_) => None,
            TreeNode::Internal(node) => Some(node.attribute),
        }
    }

    /// Returns both children, first the zero then the one branch. Leaves have none.
    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Leaf(_) => &[],
            TreeNode::Internal(node) => &node.children[..],
        }
    }

    /// Walk from this node to a leaf along the attribute values of `x`
    ///
    /// ### Panics
    ///
    /// If `x` is shorter than an attribute tested on the path
    pub fn classify(&self, x: ArrayView1<u8>) -> LeafOutcome {
        let mut node = self;
        let mut depth = 0;

        loop {
            match node {
                TreeNode::Leaf(leaf) => return LeafOutcome::new(leaf.value, leaf.entropy, depth),
                TreeNode::Internal(internal) => {
                    node = &internal.children[(x[internal.attribute] != 0) as usize];
                    depth += 1;
                }
            }
        }
    }

    /// Recursively fits the node
    ///
    /// `rows` selects the records reaching this node, `attributes` holds the attributes not used
    /// on the path from the root. Before returning, `attributes` is restored to its state at
    /// entry.
    pub(crate) fn fit<R: Rng>(
        records: &Array2<u8>,
        targets: &Array1<bool>,
        rows: &[usize],
        attributes: &mut AttributeSet,
        hyperparameters: &DecisionTreeValidParams,
        depth: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::NotEnoughSamples);
        }

        let distribution = Distribution::of_rows(targets, rows);

        // every target has the same value
        if distribution.is_pure() {
            return Ok(TreeNode::Leaf(Leaf::pure(targets[rows[0]])));
        }

        let depth_exhausted = hyperparameters
            .max_depth()
            .map(|max_depth| depth >= max_depth)
            .unwrap_or(false);

        if attributes.is_empty() || depth_exhausted {
            return Ok(TreeNode::Leaf(Leaf::majority(distribution)));
        }

        let attribute = best_split_attribute(records, targets, rows, attributes, rng)?;

        let (zeros, ones): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|row| records[(**row, attribute)] == 0);

        let zero = Self::fit_branch(
            records,
            targets,
            &zeros,
            distribution,
            attribute,
            attributes,
            hyperparameters,
            depth,
            rng,
        )?;
        let one = Self::fit_branch(
            records,
            targets,
            &ones,
            distribution,
            attribute,
            attributes,
            hyperparameters,
            depth,
            rng,
        )?;

        Ok(TreeNode::Internal(Internal {
            attribute,
            distribution,
            children: Box::new([zero, one]),
        }))
    }

    /// Fit one branch of a split on `attribute`
    ///
    /// An empty branch becomes a leaf of the parent distribution. Otherwise the attribute is
    /// removed for the recursion into this branch only and restored afterwards.
    #[allow(clippy::too_many_arguments)]
    fn fit_branch<R: Rng>(
        records: &Array2<u8>,
        targets: &Array1<bool>,
        rows: &[usize],
        parent: Distribution,
        attribute: usize,
        attributes: &mut AttributeSet,
        hyperparameters: &DecisionTreeValidParams,
        depth: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if rows.is_empty() {
            return Ok(TreeNode::Leaf(Leaf::majority(parent)));
        }

        attributes.remove(attribute);
        let child = Self::fit(
            records,
            targets,
            rows,
            attributes,
            hyperparameters,
            depth + 1,
            rng,
        );
        attributes.restore(attribute);

        child
    }
}

impl TreeNode {
    fn fmt_branch(
        &self,
        f: &mut fmt::Formatter,
        depth: usize,
        branch: Option<usize>,
    ) -> fmt::Result {
        if let Some(branch) = branch {
            write!(f, "{:width$}|-{}: ", "", branch, width = 2 * (depth - 1))?;
        }

        match self {
            TreeNode::Leaf(leaf) => {
                writeln!(f, "leaf {} (entropy {:.3})", leaf.value, leaf.entropy)
            }
            TreeNode::Internal(internal) => {
                writeln!(
                    f,
                    "attribute {} ({} positive, {} negative)",
                    internal.attribute,
                    internal.distribution.positives,
                    internal.distribution.negatives
                )?;
                for (branch, child) in internal.children.iter().enumerate() {
                    child.fmt_branch(f, depth + 1, Some(branch))?;
                }

                Ok(())
            }
        }
    }
}

/// A fitted decision tree model for one-vs-rest classification.
///
/// ### Structure
/// A decision tree structure is a binary tree where:
/// * Each internal node tests a single binary attribute. Records where the attribute is zero fall
///   in the first subtree, the others in the second one. Every internal node has exactly two
///   children.
/// * Leaf nodes make predictions, `true` if the record belongs to the class of the tree.
///
/// ### Algorithm
///
/// Starting with all training records and all attributes, the tree is induced recursively:
///
/// * If all targets agree, the node becomes a leaf with that value and entropy zero;
/// * If no attribute is left, the node becomes a leaf with the majority value and the entropy of
///   the targets;
/// * Otherwise the attribute with the highest information gain is chosen (ties are broken
///   randomly), and one subtree is induced for each value of the attribute, without that
///   attribute. A value no record takes becomes a leaf with the majority of the parent.
///
/// Every attribute is used at most once along a path, so the depth of the tree never exceeds the
/// number of attributes.
///
/// ### Predictions
///
/// To predict, the tree is traversed from the root to a leaf, choosing children according to the
/// attributes of the record. The prediction is the value of the reached leaf.
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionTree {
    root_node: TreeNode,
    num_features: usize,
}

impl DecisionTreeValidParams {
    /// Fit a tree with every attribute eligible, breaking ties with `rng`
    pub fn fit_with_rng<R: Rng>(&self, dataset: &Dataset<bool>, rng: &mut R) -> Result<DecisionTree> {
        let mut attributes = AttributeSet::all(dataset.nfeatures());
        self.fit_with_attributes(dataset, &mut attributes, rng)
    }

    /// Fit a tree using only the eligible `attributes`
    ///
    /// The set is returned to its initial state once the tree is built.
    pub fn fit_with_attributes<R: Rng>(
        &self,
        dataset: &Dataset<bool>,
        attributes: &mut AttributeSet,
        rng: &mut R,
    ) -> Result<DecisionTree> {
        if dataset.records.nrows() != dataset.targets.len() {
            return Err(Error::MismatchedLengths {
                records: dataset.records.nrows(),
                targets: dataset.targets.len(),
            });
        }
        if let Some(attribute) = attributes.iter().find(|a| *a >= dataset.nfeatures()) {
            return Err(Error::Parameters(format!(
                "attribute {} does not exist in records with {} attributes",
                attribute,
                dataset.nfeatures()
            )));
        }

        let rows = (0..dataset.nsamples()).collect::<Vec<_>>();
        let root_node = TreeNode::fit(
            &dataset.records,
            &dataset.targets,
            &rows,
            attributes,
            self,
            0,
            rng,
        )?;

        Ok(DecisionTree {
            root_node,
            num_features: dataset.nfeatures(),
        })
    }
}

impl Fit<Array2<u8>, Array1<bool>, Error> for DecisionTreeValidParams {
    type Object = DecisionTree;

    /// Fit a decision tree using `hyperparamters` on the dataset consisting of
    /// a matrix of binary attributes `x` and an array of binary targets `y`.
    fn fit(&self, dataset: &DatasetBase<Array2<u8>, Array1<bool>>) -> Result<Self::Object> {
        let mut rng = SmallRng::seed_from_u64(self.seed());
        self.fit_with_rng(dataset, &mut rng)
    }
}

impl<'a> Predict<&'a Array2<u8>, Array1<bool>> for DecisionTree {
    /// Make predictions for each row of a matrix of binary attributes `x`.
    ///
    /// ### Panics
    ///
    /// If `x` has fewer columns than the attributes the tree splits on. Use
    /// [`DecisionTree::accuracy`] for a checked evaluation.
    fn predict(&self, x: &'a Array2<u8>) -> Array1<bool> {
        x.rows()
            .into_iter()
            .map(|row| self.classify(row).positive)
            .collect()
    }
}

/// Render the tree one node per line, children indented below their parent and prefixed with
/// the attribute value leading to them
impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.root_node.fmt_branch(f, 0, None)
    }
}

impl DecisionTree {
    /// Create a tree from a root node, e.g. one built by hand
    pub fn from_root(root_node: TreeNode, num_features: usize) -> Self {
        DecisionTree {
            root_node,
            num_features,
        }
    }

    /// Create a depth-first node iterator, yielding each node with its depth
    pub fn iter_nodes(&self) -> NodeIter<'_> {
        // queue of nodes yet to explore
        let queue = vec![(0, &self.root_node)];

        NodeIter::new(queue)
    }

    /// Return the attributes this tree splits on, in ascending order
    pub fn features(&self) -> Vec<usize> {
        let fitted_features = self
            .iter_nodes()
            .filter_map(|(_, node)| node.attribute())
            .collect::<HashSet<_>>();

        let mut features = fitted_features.into_iter().collect::<Vec<_>>();
        features.sort_unstable();
        features
    }

    /// Return root node of the tree
    pub fn root_node(&self) -> &TreeNode {
        &self.root_node
    }

    pub(crate) fn root_node_mut(&mut self) -> &mut TreeNode {
        &mut self.root_node
    }

    /// Number of attributes of the records the tree was fitted on
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Return max depth of the tree, the depth of a single leaf is zero
    pub fn max_depth(&self) -> usize {
        self.iter_nodes()
            .fold(0, |max, (depth, _)| usize::max(max, depth))
    }

    /// Return the number of leaves in this tree
    pub fn num_leaves(&self) -> usize {
        self.iter_nodes().filter(|(_, node)| node.is_leaf()).count()
    }

    /// Return the number of nodes in this tree
    pub fn num_nodes(&self) -> usize {
        self.iter_nodes().count()
    }

    /// Classify a single record, returning the reached leaf and its depth
    ///
    /// ### Panics
    ///
    /// If `x` is shorter than an attribute tested on the path
    pub fn classify(&self, x: ArrayView1<u8>) -> LeafOutcome {
        self.root_node.classify(x)
    }

    /// Fraction of records whose prediction equals the boolean target, zero for an empty set
    ///
    /// # Errors
    ///
    /// * `Error::MismatchedLengths` if records and targets differ in length
    /// * `Error::FeatureCount` if the records do not have the width the tree was fitted on
    pub fn accuracy(&self, dataset: &Dataset<bool>) -> Result<f64> {
        self.accuracy_for(&dataset.records, &dataset.targets)
    }

    pub(crate) fn accuracy_for(
        &self,
        records: &Array2<u8>,
        targets: &Array1<bool>,
    ) -> Result<f64> {
        self.check_records(records, targets)?;
        if records.nsamples() == 0 {
            return Ok(0.0);
        }

        let correct = records
            .rows()
            .into_iter()
            .zip(targets.iter())
            .filter(|(row, target)| self.classify(row.view()).positive == **target)
            .count();

        Ok(correct as f64 / records.nsamples() as f64)
    }

    /// Records must pair up with the targets and have the width the tree was fitted on
    pub(crate) fn check_records(
        &self,
        records: &Array2<u8>,
        targets: &Array1<bool>,
    ) -> Result<()> {
        if records.nsamples() != targets.len() {
            return Err(Error::MismatchedLengths {
                records: records.nsamples(),
                targets: targets.len(),
            });
        }
        if records.nfeatures() != self.num_features {
            return Err(Error::FeatureCount {
                expected: self.num_features,
                found: records.nfeatures(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;
    use emotree::ParamGuard;
    use ndarray::{array, Array};
    use ndarray_rand::{rand_distr::Uniform, RandomExt};
    use rand::rngs::SmallRng;

    fn leaf(value: bool, entropy: f64) -> TreeNode {
        TreeNode::Leaf(Leaf { value, entropy })
    }

    #[test]
    fn pure_targets_give_a_pure_leaf() -> Result<()> {
        let dataset = Dataset::new(array![[1, 0], [0, 1], [1, 1]], array![true, true, true]);
        let model = DecisionTree::params().fit(&dataset)?;

        assert_eq!(model.root_node(), &leaf(true, 0.0));
        assert_eq!(model.max_depth(), 0);

        let dataset = Dataset::new(array![[1, 0], [0, 1]], array![false, false]);
        let model = DecisionTree::params().fit(&dataset)?;
        assert_eq!(model.root_node(), &leaf(false, 0.0));

        Ok(())
    }

    #[test]
    fn no_attributes_give_a_majority_leaf() -> Result<()> {
        let dataset = Dataset::new(
            array![[1], [1], [1], [1]],
            array![true, true, true, false],
        );
        let params = DecisionTree::params().check()?;
        let mut attributes = AttributeSet::from_indices(1, &[]);
        let mut rng = SmallRng::seed_from_u64(42);

        let model = params.fit_with_attributes(&dataset, &mut attributes, &mut rng)?;
        match model.root_node() {
            TreeNode::Leaf(leaf) => {
                assert!(leaf.value);
                assert_abs_diff_eq!(leaf.entropy, 0.811278, epsilon = 1e-6);
            }
            node => panic!("expected a leaf, got {:?}", node),
        }

        Ok(())
    }

    #[test]
    fn empty_branch_uses_parent_distribution() -> Result<()> {
        // attribute 0 is always one, attribute 1 carries no information either
        let dataset = Dataset::new(
            array![[1, 0], [1, 0], [1, 0]],
            array![true, false, true],
        );
        let model = DecisionTree::params().fit(&dataset)?;

        let root = match model.root_node() {
            TreeNode::Internal(root) => root,
            node => panic!("expected an internal root, got {:?}", node),
        };
        let parent = Leaf::majority(Distribution::new(2, 1));
        let empty_branch = if root.attribute == 0 { 0 } else { 1 };

        assert_eq!(root.children[empty_branch], TreeNode::Leaf(parent));
        assert_eq!(root.distribution, Distribution::new(2, 1));

        // every internal node has two children
        assert!(model
            .iter_nodes()
            .all(|(_, node)| node.is_leaf() || node.children().len() == 2));

        Ok(())
    }

    #[test]
    fn attribute_set_is_restored() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(42);
        let records = Array::random_using((60, 8), Uniform::new(0u8, 2), &mut rng);
        let targets = records.rows().into_iter().map(|r| r[0] ^ r[3] == 1).collect();
        let dataset = Dataset::new(records, targets);

        let params = DecisionTree::params().check()?;
        let mut attributes = AttributeSet::from_indices(8, &[0, 2, 3, 5]);
        let before = attributes.clone();

        let model = params.fit_with_attributes(&dataset, &mut attributes, &mut rng)?;

        assert_eq!(attributes, before);
        assert!(model.features().iter().all(|a| before.contains(*a)));
        assert!(model.max_depth() <= before.len());

        Ok(())
    }

    #[test]
    fn depth_is_bounded_by_attributes() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(42);

        for nattributes in 1..8 {
            let records = Array::random_using((80, nattributes), Uniform::new(0u8, 2), &mut rng);
            let targets = Array::random_using(80, Uniform::new(0u8, 2), &mut rng).mapv(|t| t == 1);
            let dataset = Dataset::new(records, targets);

            let model = DecisionTree::params()
                .seed(nattributes as u64)
                .fit(&dataset)?;

            assert!(model.max_depth() <= nattributes);

            // no attribute is used twice on a path
            fn check_path(node: &TreeNode, used: &mut Vec<usize>) {
                if let TreeNode::Internal(internal) = node {
                    assert!(!used.contains(&internal.attribute));
                    used.push(internal.attribute);
                    for child in internal.children.iter() {
                        check_path(child, used);
                    }
                    used.pop();
                }
            }
            check_path(model.root_node(), &mut Vec::new());
        }

        Ok(())
    }

    #[test]
    fn max_depth_is_respected() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(42);
        let records = Array::random_using((100, 10), Uniform::new(0u8, 2), &mut rng);
        let targets = Array::random_using(100, Uniform::new(0u8, 2), &mut rng).mapv(|t| t == 1);
        let dataset = Dataset::new(records, targets);

        for max_depth in &[1, 2, 4] {
            let model = DecisionTree::params()
                .max_depth(Some(*max_depth))
                .fit(&dataset)?;
            assert!(model.max_depth() <= *max_depth);
        }

        assert!(DecisionTree::params().max_depth(Some(0)).check().is_err());

        Ok(())
    }

    #[test]
    fn xor_is_learned_exactly() -> Result<()> {
        let records = array![[0, 0, 1], [0, 1, 0], [1, 0, 1], [1, 1, 0]];
        let targets = array![false, true, true, false];
        let dataset = Dataset::new(records.clone(), targets.clone());

        let model = DecisionTree::params().fit(&dataset)?;

        assert_eq!(model.predict(&records), targets);
        assert_abs_diff_eq!(model.accuracy(&dataset)?, 1.0);

        Ok(())
    }

    #[test]
    fn classify_reports_depth_and_entropy() {
        let tree = DecisionTree::from_root(
            TreeNode::Internal(Internal {
                attribute: 1,
                distribution: Distribution::new(2, 2),
                children: Box::new([
                    leaf(false, 0.0),
                    TreeNode::Internal(Internal {
                        attribute: 0,
                        distribution: Distribution::new(2, 1),
                        children: Box::new([leaf(false, 0.5), leaf(true, 0.25)]),
                    }),
                ]),
            }),
            2,
        );

        assert_eq!(
            tree.classify(array![0, 0].view()),
            LeafOutcome::new(false, 0.0, 1)
        );
        assert_eq!(
            tree.classify(array![1, 1].view()),
            LeafOutcome::new(true, 0.25, 2)
        );
        assert_eq!(
            tree.classify(array![0, 1].view()),
            LeafOutcome::new(false, 0.5, 2)
        );

        assert_eq!(tree.max_depth(), 2);
        assert_eq!(tree.num_leaves(), 3);
        assert_eq!(tree.num_nodes(), 5);
        assert_eq!(tree.features(), vec![0, 1]);

        assert_eq!(
            tree.to_string(),
            "attribute 1 (2 positive, 2 negative)\n\
             |-0: leaf false (entropy 0.000)\n\
             |-1: attribute 0 (2 positive, 1 negative)\n\
             \x20 |-0: leaf false (entropy 0.500)\n\
             \x20 |-1: leaf true (entropy 0.250)\n"
        );
        assert_eq!(
            DecisionTree::from_root(leaf(true, 0.0), 2).to_string(),
            "leaf true (entropy 0.000)\n"
        );
    }

    #[test]
    fn empty_training_set_fails() {
        let dataset = Dataset::new(Array2::zeros((0, 3)), Array1::from(Vec::<bool>::new()));
        assert!(matches!(
            DecisionTree::params().fit(&dataset),
            Err(Error::NotEnoughSamples)
        ));
    }

    #[test]
    fn mismatched_targets_fail() {
        let dataset = Dataset::new(array![[0, 1], [1, 0]], array![true]);
        assert!(matches!(
            DecisionTree::params().fit(&dataset),
            Err(Error::MismatchedLengths { .. })
        ));
    }
}
