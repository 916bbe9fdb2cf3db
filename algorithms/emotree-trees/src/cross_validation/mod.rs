//! k-fold cross-validation of one-vs-rest ensembles
//!
//! Every round holds out one fold for testing and the next fold for validation, the remaining
//! `k - 2` folds are used for training. Rounds are independent and run in parallel, one worker
//! per fold.
mod algorithm;
mod hyperparams;
mod report;

pub use hyperparams::*;
pub use report::*;
