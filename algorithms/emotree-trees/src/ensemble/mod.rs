//! One-vs-rest ensembles of decision trees
//!
mod aggregation;
mod algorithm;
mod hyperparams;

pub use aggregation::{priority_vote, random_vote};
pub use algorithm::*;
pub use hyperparams::*;
