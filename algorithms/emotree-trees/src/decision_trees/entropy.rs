//! Information theoretic scoring of candidate attributes
//!
use ndarray::{Array1, Array2};
use rand::{seq::SliceRandom, Rng};

use emotree::error::{Error, Result};

use super::AttributeSet;

/// Counts of positive and negative targets in a set of records
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Distribution {
    pub positives: usize,
    pub negatives: usize,
}

impl Distribution {
    pub fn new(positives: usize, negatives: usize) -> Self {
        Distribution {
            positives,
            negatives,
        }
    }

    /// Count the targets of the selected `rows`
    pub fn of_rows(targets: &Array1<bool>, rows: &[usize]) -> Self {
        let positives = rows.iter().filter(|row| targets[**row]).count();

        Distribution {
            positives,
            negatives: rows.len() - positives,
        }
    }

    pub fn total(&self) -> usize {
        self.positives + self.negatives
    }

    /// True if at most one of the two values occurs
    pub fn is_pure(&self) -> bool {
        self.positives == 0 || self.negatives == 0
    }

    /// The more frequent value, ties resolve to `false`
    pub fn majority(&self) -> bool {
        self.positives > self.negatives
    }

    pub fn entropy(&self) -> f64 {
        entropy(self.positives, self.negatives)
    }
}

/// Binary Shannon entropy of `p` positive and `n` negative samples
///
/// Zero if either count is zero.
pub fn entropy(p: usize, n: usize) -> f64 {
    if p == 0 || n == 0 {
        return 0.0;
    }

    let total = (p + n) as f64;
    let (p, n) = (p as f64 / total, n as f64 / total);

    -p * p.log2() - n * n.log2()
}

/// Information gain of splitting `rows` on `attribute`
///
/// The gain is the entropy of all rows minus the remainder, the entropy of the two partitions
/// weighted by their share of rows.
pub fn information_gain(
    records: &Array2<u8>,
    targets: &Array1<bool>,
    rows: &[usize],
    attribute: usize,
) -> f64 {
    let mut split = [Distribution::default(); 2];
    for row in rows {
        let side = &mut split[(records[(*row, attribute)] != 0) as usize];
        if targets[*row] {
            side.positives += 1;
        } else {
            side.negatives += 1;
        }
    }

    let total = split[0].total() + split[1].total();
    if total == 0 {
        return 0.0;
    }

    let remainder = split
        .iter()
        .map(|side| side.total() as f64 / total as f64 * side.entropy())
        .sum::<f64>();

    let parent = Distribution::new(
        split[0].positives + split[1].positives,
        split[0].negatives + split[1].negatives,
    );

    parent.entropy() - remainder
}

/// Select the attribute with maximal information gain
///
/// Ties between attributes with exactly the same gain are broken by a uniform random choice with
/// `rng`, not by the order of the attributes.
///
/// # Errors
///
/// Fails with `Error::InvalidState` if no attribute is eligible.
pub fn best_split_attribute<R: Rng>(
    records: &Array2<u8>,
    targets: &Array1<bool>,
    rows: &[usize],
    attributes: &AttributeSet,
    rng: &mut R,
) -> Result<usize> {
    let mut max_gain = f64::NEG_INFINITY;
    let mut best = Vec::new();

    for attribute in attributes.iter() {
        let gain = information_gain(records, targets, rows, attribute);

        if gain > max_gain {
            max_gain = gain;
            best.clear();
            best.push(attribute);
        } else if gain == max_gain {
            best.push(attribute);
        }
    }

    best.choose(rng).copied().ok_or_else(|| {
        Error::InvalidState("no eligible attribute left to split on".to_string())
    })
}
