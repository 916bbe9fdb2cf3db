mod algorithm;
mod attributes;
pub mod entropy;
mod hyperparams;
mod iter;
mod prune;

pub use algorithm::*;
pub use attributes::AttributeSet;
pub use entropy::{best_split_attribute, entropy, information_gain, Distribution};
pub use hyperparams::*;
pub use iter::*;
pub use prune::PruneOutcome;
