//! Datasets
//!
//! This module implements the dataset struct and various helper traits to extend its
//! functionality. Records are binary attribute vectors stored row-wise in an `Array2<u8>`,
//! targets are either multi-class labels in `[1, n_classes]` or one-vs-rest booleans.
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2};

use std::hash::Hash;

mod fold;
mod impl_dataset;

pub use fold::{FoldAssignment, FoldPartition};

/// Discrete labels
///
/// Labels are countable, comparable and hashable. Currently used types are `bool` for
/// one-vs-rest targets and `usize` for class labels.
pub trait Label: PartialEq + Eq + Hash + Clone {}

impl Label for bool {}
impl Label for usize {}

/// DatasetBase
///
/// This is the fundamental structure of a dataset. It contains a number of records about the data
/// and the targets associated with them. Pairing between a record and its target is positional
/// and preserved by every operation of this module.
///
/// # Fields
///
/// * `records`: a two-dimensional matrix with dimensionality (nsamples, nfeatures)
/// * `targets`: a one-dimensional array with dimensionality (nsamples)
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetBase<R, T> {
    pub records: R,
    pub targets: T,
}

/// Dataset
///
/// The most commonly used typed of dataset. It contains a number of binary records
/// stored as an `Array2` and a single target per record stored as an `Array1`.
pub type Dataset<L> = DatasetBase<Array2<u8>, Array1<L>>;

/// Record trait
pub trait Records: Sized {
    fn nsamples(&self) -> usize;
    fn nfeatures(&self) -> usize;
}

impl<S: Data<Elem = u8>> Records for ArrayBase<S, Ix2> {
    fn nsamples(&self) -> usize {
        self.nrows()
    }

    fn nfeatures(&self) -> usize {
        self.ncols()
    }
}
