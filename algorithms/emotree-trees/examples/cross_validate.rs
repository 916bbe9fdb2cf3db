use emotree::prelude::*;
use emotree_trees::{CrossValidationParams, Halting, OneVsRest, PruneParams};
use ndarray::{Array, Array2};
use ndarray_rand::rand::{Rng, SeedableRng};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::SmallRng;
use tracing_subscriber::EnvFilter;

const N_ATTRIBUTES: usize = 45;
const N_CLASSES: usize = 6;

/// Generate records resembling facial action units
///
/// Every class activates a small group of attributes with high probability, all other attributes
/// fire occasionally.
fn synthetic_action_units(nsamples: usize, rng: &mut SmallRng) -> Dataset<usize> {
    let targets = Array::random_using(nsamples, Uniform::new(1, N_CLASSES + 1), rng);
    let mut records: Array2<u8> = Array2::zeros((nsamples, N_ATTRIBUTES));

    for (i, class) in targets.iter().enumerate() {
        for j in 0..N_ATTRIBUTES {
            let group = j % N_CLASSES + 1;
            let p = if group == *class { 0.7 } else { 0.1 };
            records[(i, j)] = rng.gen_bool(p) as u8;
        }
    }

    Dataset::new(records, targets)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut rng = SmallRng::seed_from_u64(42);
    let dataset = synthetic_action_units(1000, &mut rng);

    let shallow = OneVsRest::params()
        .n_classes(N_CLASSES)
        .max_depth(Some(3))
        .fit(&dataset)?;
    println!("tree for class 1, depth at most 3:\n{}", shallow.trees()[0]);

    for random in &[false, true] {
        let report = CrossValidationParams::new()
            .n_attributes(N_ATTRIBUTES)
            .n_classes(N_CLASSES)
            .k_folds(10)
            .random_aggregation(*random)
            .prune(PruneParams::new().halting(Halting::WhileImproving))
            .evaluate(&dataset)?;

        println!(
            "{} aggregation",
            if *random { "random" } else { "priority" }
        );
        println!("{}", report);

        let confusion_matrix = report.confusion_matrix();
        println!("precision per class: {:.3}", confusion_matrix.precision());
        println!("recall per class:    {:.3}\n", confusion_matrix.recall());
    }

    Ok(())
}
