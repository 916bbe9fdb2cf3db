//! Common metrics for performance evaluation of classifier
//!
//! Scoring is essential for classification tasks. This module implements the confusion matrix
//! over 1-based class labels together with the scores derived from it: accuracy, precision and
//! recall, and the averaging across cross-validation folds.
use std::fmt;

use ndarray::prelude::*;

use crate::dataset::Dataset;
use crate::error::{Error, Result};

/// Confusion matrix for multi-class evaluation
///
/// A confusion matrix shows predictions in a matrix, where rows correspond to the actual class
/// and columns to the predicted class. The diagonal entries are correct predictions. Class `c`
/// occupies row and column `c - 1`.
#[derive(Clone, PartialEq)]
pub struct ConfusionMatrix {
    matrix: Array2<usize>,
}

impl ConfusionMatrix {
    /// Create an empty matrix for `n_classes` classes
    pub fn zeros(n_classes: usize) -> Self {
        ConfusionMatrix {
            matrix: Array2::zeros((n_classes, n_classes)),
        }
    }

    /// Count (actual, predicted) label pairs
    pub fn from_labels(actual: &[usize], predicted: &[usize], n_classes: usize) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(Error::MismatchedLengths {
                records: predicted.len(),
                targets: actual.len(),
            });
        }

        let mut cm = ConfusionMatrix::zeros(n_classes);
        for (a, p) in actual.iter().zip(predicted.iter()) {
            for label in &[*a, *p] {
                if *label == 0 || *label > n_classes {
                    return Err(Error::LabelOutOfRange {
                        label: *label,
                        n_classes,
                    });
                }
            }
            cm.matrix[(a - 1, p - 1)] += 1;
        }

        Ok(cm)
    }

    pub fn n_classes(&self) -> usize {
        self.matrix.nrows()
    }

    /// The raw counts, rows are actual and columns predicted classes
    pub fn matrix(&self) -> &Array2<usize> {
        &self.matrix
    }

    /// Total number of counted predictions
    pub fn total(&self) -> usize {
        self.matrix.sum()
    }

    /// Return mean accuracy, zero for an empty matrix
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }

        self.matrix.diag().sum() as f64 / total as f64
    }

    /// Calculate precision for every class
    ///
    /// Classes which were never predicted have a precision of zero.
    pub fn precision(&self) -> Array1<f64> {
        let predicted = self.matrix.sum_axis(Axis(0));

        self.matrix
            .diag()
            .iter()
            .zip(predicted.iter())
            .map(|(a, b)| if *b == 0 { 0.0 } else { *a as f64 / *b as f64 })
            .collect()
    }

    /// Calculate recall for every class
    ///
    /// Classes which never occur have a recall of zero.
    pub fn recall(&self) -> Array1<f64> {
        let actual = self.matrix.sum_axis(Axis(1));

        self.matrix
            .diag()
            .iter()
            .zip(actual.iter())
            .map(|(a, b)| if *b == 0 { 0.0 } else { *a as f64 / *b as f64 })
            .collect()
    }

    /// Add the counts of `other` element-wise
    pub fn merge(&mut self, other: &ConfusionMatrix) -> Result<()> {
        if self.n_classes() != other.n_classes() {
            return Err(Error::Parameters(format!(
                "cannot merge confusion matrices of {} and {} classes",
                self.n_classes(),
                other.n_classes()
            )));
        }

        self.matrix += &other.matrix;
        Ok(())
    }

    /// Divide every count by `k`, e.g. the number of folds that were merged
    pub fn averaged(&self, k: usize) -> Array2<f64> {
        self.matrix.mapv(|count| count as f64 / k as f64)
    }
}

/// Percentage of predictions equal to the actual label at the same position
///
/// Returns zero for empty inputs. Extra elements of the longer slice are ignored.
pub fn percent_correct<L: PartialEq>(predicted: &[L], actual: &[L]) -> f64 {
    let total = predicted.len().min(actual.len());
    if total == 0 {
        return 0.0;
    }

    let correct = predicted
        .iter()
        .zip(actual.iter())
        .filter(|(p, a)| p == a)
        .count();

    correct as f64 / total as f64 * 100.0
}

/// Compare predicted class labels with the targets of a dataset
pub trait ToConfusionMatrix {
    fn confusion_matrix(&self, ground_truth: &Dataset<usize>, n_classes: usize)
        -> Result<ConfusionMatrix>;
}

impl ToConfusionMatrix for Array1<usize> {
    fn confusion_matrix(
        &self,
        ground_truth: &Dataset<usize>,
        n_classes: usize,
    ) -> Result<ConfusionMatrix> {
        ConfusionMatrix::from_labels(&ground_truth.targets.to_vec(), &self.to_vec(), n_classes)
    }
}

impl ToConfusionMatrix for [usize] {
    fn confusion_matrix(
        &self,
        ground_truth: &Dataset<usize>,
        n_classes: usize,
    ) -> Result<ConfusionMatrix> {
        ConfusionMatrix::from_labels(&ground_truth.targets.to_vec(), self, n_classes)
    }
}

/// Print a confusion matrix
impl fmt::Debug for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let len = self.n_classes();

        write!(f, "{:>8}", "")?;
        for j in 1..=len {
            write!(f, " {:>6}", j)?;
        }
        writeln!(f)?;

        for i in 0..len {
            write!(f, "{:>8}", i + 1)?;
            for j in 0..len {
                write!(f, " {:>6}", self.matrix[(i, j)])?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_confusion_matrix() {
        let actual = [1, 1, 2, 2, 3, 3];
        let predicted = [1, 2, 2, 2, 3, 1];

        let cm = ConfusionMatrix::from_labels(&actual, &predicted, 3).unwrap();

        assert_eq!(cm.matrix(), &array![[1, 1, 0], [0, 2, 0], [1, 0, 1]]);
        assert_eq!(cm.total(), 6);
        assert_abs_diff_eq!(cm.accuracy(), 4.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_precision_recall() {
        let actual = [1, 1, 2, 2, 3, 3];
        let predicted = [1, 2, 2, 2, 1, 1];

        let cm = ConfusionMatrix::from_labels(&actual, &predicted, 3).unwrap();

        let precision = cm.precision();
        let recall = cm.recall();

        assert_abs_diff_eq!(precision, array![1.0 / 3.0, 2.0 / 3.0, 0.0], epsilon = 1e-12);
        assert_abs_diff_eq!(recall, array![0.5, 1.0, 0.0], epsilon = 1e-12);
    }

    #[test]
    fn out_of_range_labels() {
        assert!(matches!(
            ConfusionMatrix::from_labels(&[1, 4], &[1, 1], 3),
            Err(Error::LabelOutOfRange {
                label: 4,
                n_classes: 3
            })
        ));
        assert!(matches!(
            ConfusionMatrix::from_labels(&[1, 1], &[0, 1], 3),
            Err(Error::LabelOutOfRange { label: 0, .. })
        ));
        assert!(matches!(
            ConfusionMatrix::from_labels(&[1, 1], &[1], 3),
            Err(Error::MismatchedLengths { .. })
        ));
    }

    #[test]
    fn merge_and_average() {
        let mut sum = ConfusionMatrix::zeros(2);
        let a = ConfusionMatrix::from_labels(&[1, 2, 2], &[1, 2, 1], 2).unwrap();
        let b = ConfusionMatrix::from_labels(&[1, 1, 2], &[2, 1, 2], 2).unwrap();

        sum.merge(&a).unwrap();
        sum.merge(&b).unwrap();

        assert_eq!(sum.matrix(), &array![[2, 1], [1, 2]]);
        assert_abs_diff_eq!(
            sum.averaged(2),
            array![[1.0, 0.5], [0.5, 1.0]],
            epsilon = 1e-12
        );

        assert!(sum.merge(&ConfusionMatrix::zeros(3)).is_err());
    }

    #[test]
    fn percentage_of_correct_predictions() {
        assert_abs_diff_eq!(percent_correct(&[1, 2, 3, 4], &[1, 2, 4, 4]), 75.0);
        assert_abs_diff_eq!(percent_correct::<usize>(&[], &[]), 0.0);
    }

    #[test]
    fn predictions_to_confusion_matrix() {
        let dataset = Dataset::new(array![[0], [1], [1]], array![1, 2, 2]);
        let prediction = array![1, 2, 1];

        let cm = prediction.confusion_matrix(&dataset, 2).unwrap();
        assert_eq!(cm.matrix(), &array![[1, 0], [1, 1]]);

        let collected: Vec<usize> = vec![1, 2, 1];
        let from_slice = collected.as_slice().confusion_matrix(&dataset, 2).unwrap();
        assert_eq!(from_slice.matrix(), cm.matrix());

        assert!(matches!(
            [1usize, 3, 1][..].confusion_matrix(&dataset, 2),
            Err(Error::LabelOutOfRange {
                label: 3,
                n_classes: 2
            })
        ));
    }
}
