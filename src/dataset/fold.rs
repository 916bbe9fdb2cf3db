//! Rotating k-fold partitions
//!
//! For round `i` of a `k`-fold cross-validation every record index `j` is assigned to exactly
//! one subset:
//!
//! * `j mod k == i` belongs to the test set
//! * `j mod k == (i + 1) mod k` belongs to the validation set
//! * everything else is training data
//!
//! so every round is a disjoint cover of the dataset with one test fold, one validation fold and
//! `k - 2` training folds.
use super::{Dataset, Label};
use crate::error::{Error, Result};

/// The subset a single record belongs to in one round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldAssignment {
    Test,
    Validation,
    Training,
}

impl FoldAssignment {
    /// Assign record `index` for round `round` of a `k`-fold partition
    pub fn of(index: usize, k: usize, round: usize) -> Self {
        let fold = index % k;
        if fold == round {
            FoldAssignment::Test
        } else if fold == (round + 1) % k {
            FoldAssignment::Validation
        } else {
            FoldAssignment::Training
        }
    }
}

/// The three disjoint subsets of one cross-validation round
#[derive(Debug, Clone)]
pub struct FoldPartition<L: Label> {
    pub training: Dataset<L>,
    pub validation: Dataset<L>,
    pub test: Dataset<L>,
}

impl<L: Label> Dataset<L> {
    /// Partition the dataset for round `round` of a `k`-fold cross-validation
    ///
    /// Records keep their relative order inside every subset.
    ///
    /// # Errors
    ///
    /// Fails with `Error::Parameters` if `k < 3`, since then no training fold remains, or if
    /// `round >= k`.
    pub fn fold_partition(&self, k: usize, round: usize) -> Result<FoldPartition<L>> {
        if k < 3 {
            return Err(Error::Parameters(format!(
                "at least three folds are required for test, validation and training, got {}",
                k
            )));
        }
        if round >= k {
            return Err(Error::Parameters(format!(
                "fold index {} is out of range for {} folds",
                round, k
            )));
        }

        let (mut test, mut validation, mut training) = (Vec::new(), Vec::new(), Vec::new());
        for index in 0..self.nsamples() {
            match FoldAssignment::of(index, k, round) {
                FoldAssignment::Test => test.push(index),
                FoldAssignment::Validation => validation.push(index),
                FoldAssignment::Training => training.push(index),
            }
        }

        Ok(FoldPartition {
            training: self.select(&training),
            validation: self.select(&validation),
            test: self.select(&test),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    fn indexed_dataset(n: usize) -> Dataset<usize> {
        // the single attribute column is unused, targets carry the original index
        Dataset::new(Array2::zeros((n, 1)), (0..n).collect::<Array1<_>>())
    }

    #[test]
    fn partitions_are_a_disjoint_cover() {
        let dataset = indexed_dataset(23);

        for round in 0..10 {
            let partition = dataset.fold_partition(10, round).unwrap();

            let mut all = partition
                .training
                .targets
                .iter()
                .chain(partition.validation.targets.iter())
                .chain(partition.test.targets.iter())
                .copied()
                .collect::<Vec<_>>();
            all.sort_unstable();
            assert_eq!(all, (0..23).collect::<Vec<_>>());

            assert!(partition.test.targets.iter().all(|i| i % 10 == round));
            assert!(partition
                .validation
                .targets
                .iter()
                .all(|i| i % 10 == (round + 1) % 10));
        }
    }

    #[test]
    fn last_round_wraps_validation() {
        let dataset = indexed_dataset(9);
        let partition = dataset.fold_partition(3, 2).unwrap();

        assert_eq!(partition.test.targets.to_vec(), vec![2, 5, 8]);
        assert_eq!(partition.validation.targets.to_vec(), vec![0, 3, 6]);
        assert_eq!(partition.training.targets.to_vec(), vec![1, 4, 7]);
    }

    #[test]
    fn too_few_folds() {
        let dataset = indexed_dataset(9);
        assert!(matches!(
            dataset.fold_partition(2, 0),
            Err(Error::Parameters(_))
        ));
        assert!(matches!(
            dataset.fold_partition(3, 3),
            Err(Error::Parameters(_))
        ));
    }

    #[test]
    fn assignment_of_index() {
        assert_eq!(FoldAssignment::of(14, 10, 4), FoldAssignment::Test);
        assert_eq!(FoldAssignment::of(15, 10, 4), FoldAssignment::Validation);
        assert_eq!(FoldAssignment::of(0, 10, 9), FoldAssignment::Validation);
        assert_eq!(FoldAssignment::of(3, 10, 9), FoldAssignment::Training);
    }
}
