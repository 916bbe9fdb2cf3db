use std::fmt;

use ndarray::{Array1, Array2};

use emotree::{
    error::{Error, Result},
    metrics::ConfusionMatrix,
};

use crate::PruneSummary;

/// Outcome of a single cross-validation round
#[derive(Clone, Debug, PartialEq)]
pub struct FoldReport {
    /// Index of the test fold
    pub fold: usize,
    /// Number of test records
    pub test_size: usize,
    /// Actual against predicted classes of the test records
    pub confusion_matrix: ConfusionMatrix,
    /// Percentage of correctly classified test records
    pub accuracy: f64,
    /// Validation accuracy of every unpruned tree, only for priority aggregation
    pub tree_priorities: Option<Array1<f64>>,
    /// Pruning passes run on the final ensemble, if pruning is enabled
    pub pruning: Option<PruneSummary>,
}

/// Aggregate of all rounds of a cross-validation run
#[derive(Clone, Debug, PartialEq)]
pub struct CrossValidationReport {
    folds: Vec<FoldReport>,
    confusion_matrix: ConfusionMatrix,
}

impl CrossValidationReport {
    /// Sum the confusion matrices of all folds
    ///
    /// Fails if no fold is given or the folds disagree on the number of classes.
    pub fn from_folds(folds: Vec<FoldReport>) -> Result<Self> {
        let mut confusion_matrix = match folds.first() {
            Some(fold) => ConfusionMatrix::zeros(fold.confusion_matrix.n_classes()),
            None => return Err(Error::NotEnoughSamples),
        };
        for fold in &folds {
            confusion_matrix.merge(&fold.confusion_matrix)?;
        }

        Ok(CrossValidationReport {
            folds,
            confusion_matrix,
        })
    }

    /// Per-fold reports, ordered by fold index
    pub fn folds(&self) -> &[FoldReport] {
        &self.folds
    }

    pub fn n_folds(&self) -> usize {
        self.folds.len()
    }

    /// Element-wise sum of the confusion matrices of all folds
    pub fn confusion_matrix(&self) -> &ConfusionMatrix {
        &self.confusion_matrix
    }

    /// The summed confusion matrix divided by the number of folds
    pub fn averaged_confusion_matrix(&self) -> Array2<f64> {
        self.confusion_matrix.averaged(self.n_folds())
    }

    /// Test accuracy of every fold in percent
    pub fn fold_accuracies(&self) -> Vec<f64> {
        self.folds.iter().map(|fold| fold.accuracy).collect()
    }

    /// Mean of the fold accuracies in percent
    pub fn mean_accuracy(&self) -> f64 {
        self.folds.iter().map(|fold| fold.accuracy).sum::<f64>() / self.n_folds() as f64
    }
}

impl fmt::Display for CrossValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for fold in &self.folds {
            writeln!(
                f,
                "fold {:>3}: {:>6.2}% of {} test records",
                fold.fold + 1,
                fold.accuracy,
                fold.test_size
            )?;
        }
        writeln!(f, "mean accuracy: {:.2}%", self.mean_accuracy())?;
        writeln!(f)?;

        let averaged = self.averaged_confusion_matrix();
        writeln!(f, "averaged confusion matrix (actual x predicted):")?;
        write!(f, "{:>8}", "")?;
        for j in 1..=averaged.ncols() {
            write!(f, " {:>7}", j)?;
        }
        writeln!(f)?;
        for (i, row) in averaged.rows().into_iter().enumerate() {
            write!(f, "{:>8}", i + 1)?;
            for count in row {
                write!(f, " {:>7.1}", count)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
