use std::collections::HashMap;

use ndarray::{Array1, Array2, Axis};
use rand::{seq::SliceRandom, Rng};

use super::{Dataset, DatasetBase, Label, Records};
use crate::error::{Error, Result};

impl<L: Label> Dataset<L> {
    /// Create a new dataset from records and targets
    ///
    /// The pairing is positional: the `i`-th row of `records` belongs to the `i`-th target. No
    /// checks are performed here, see [`Dataset::validate`] for that.
    pub fn new(records: Array2<u8>, targets: Array1<L>) -> Self {
        DatasetBase { records, targets }
    }

    /// Number of records in the dataset
    pub fn nsamples(&self) -> usize {
        self.records.nsamples()
    }

    /// Number of attributes per record
    pub fn nfeatures(&self) -> usize {
        self.records.nfeatures()
    }

    pub fn is_empty(&self) -> bool {
        self.nsamples() == 0
    }

    pub fn records(&self) -> &Array2<u8> {
        &self.records
    }

    pub fn targets(&self) -> &Array1<L> {
        &self.targets
    }

    /// Select a subset of the records and their targets
    ///
    /// Indices may repeat and appear in any order, the result follows the order of `indices`.
    pub fn select(&self, indices: &[usize]) -> Self {
        DatasetBase {
            records: self.records.select(Axis(0), indices),
            targets: self.targets.select(Axis(0), indices),
        }
    }

    /// Apply a single random permutation to records and targets
    ///
    /// Records and targets are permuted together, so every record keeps its target.
    pub fn shuffle<R: Rng>(&self, rng: &mut R) -> Self {
        let mut indices = (0..self.nsamples()).collect::<Vec<_>>();
        indices.shuffle(rng);

        self.select(&indices)
    }

    /// Map targets with a function `f`
    pub fn map_targets<T: Label, G: FnMut(&L) -> T>(&self, f: G) -> Dataset<T> {
        DatasetBase {
            records: self.records.clone(),
            targets: self.targets.map(f),
        }
    }

    /// Count how often each label occurs in the targets
    pub fn label_frequencies(&self) -> HashMap<L, usize> {
        let mut freqs = HashMap::new();
        for target in self.targets.iter() {
            *freqs.entry(target.clone()).or_insert(0) += 1;
        }

        freqs
    }
}

impl Dataset<usize> {
    /// Build a dataset from two parallel sequences
    ///
    /// Every row of `x` is a binary attribute vector, every element of `y` the class label of the
    /// row at the same position. All rows must have the width of the first one.
    pub fn from_rows(x: &[Vec<u8>], y: &[usize]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::MismatchedLengths {
                records: x.len(),
                targets: y.len(),
            });
        }

        let nfeatures = x.first().map(|row| row.len()).unwrap_or(0);
        if let Some(row) = x.iter().find(|row| row.len() != nfeatures) {
            return Err(Error::FeatureCount {
                expected: nfeatures,
                found: row.len(),
            });
        }

        let flat = x.iter().flatten().copied().collect::<Vec<_>>();
        let records = Array2::from_shape_vec((x.len(), nfeatures), flat)?;

        Ok(Dataset::new(records, Array1::from(y.to_vec())))
    }

    /// Check that the dataset is well formed
    ///
    /// Every record has to contain exactly `n_attributes` values, each of them zero or one, and
    /// every label has to lie in `[1, n_classes]`.
    pub fn validate(&self, n_attributes: usize, n_classes: usize) -> Result<()> {
        if self.records.nrows() != self.targets.len() {
            return Err(Error::MismatchedLengths {
                records: self.records.nrows(),
                targets: self.targets.len(),
            });
        }

        if self.nfeatures() != n_attributes {
            return Err(Error::FeatureCount {
                expected: n_attributes,
                found: self.nfeatures(),
            });
        }

        if let Some(((row, column), value)) = self.records.indexed_iter().find(|(_, v)| **v > 1) {
            return Err(Error::NonBinaryAttribute {
                row,
                column,
                value: *value,
            });
        }

        if let Some(label) = self
            .targets
            .iter()
            .find(|label| **label == 0 || **label > n_classes)
        {
            return Err(Error::LabelOutOfRange {
                label: *label,
                n_classes,
            });
        }

        Ok(())
    }

    /// Derive the one-vs-rest targets for `class`
    ///
    /// A target is `true` where the label equals `class` and `false` everywhere else.
    pub fn binary_targets(&self, class: usize) -> Array1<bool> {
        self.targets.map(|label| *label == class)
    }

    /// Derive the one-vs-rest dataset for `class`, see [`Dataset::binary_targets`]
    pub fn one_vs_rest(&self, class: usize) -> Dataset<bool> {
        self.map_targets(|label| *label == class)
    }
}
