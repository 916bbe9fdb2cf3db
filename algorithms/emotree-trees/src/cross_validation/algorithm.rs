use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use emotree::{
    dataset::FoldPartition,
    error::{Error, Result},
    metrics::{percent_correct, ToConfusionMatrix},
    Dataset, ParamGuard,
};

use super::{CrossValidationParams, CrossValidationReport, CrossValidationValidParams, FoldReport};
use crate::{Aggregation, OneVsRestValidParams, PruneValidParams};

impl CrossValidationValidParams {
    /// Run k-fold cross-validation on `dataset`
    ///
    /// The records are shuffled once, then every fold runs on its own worker: an ensemble is
    /// trained on the training folds, pruned with the validation fold and scored on the test
    /// fold. The run fails as soon as any fold fails, no partial report is produced.
    ///
    /// # Errors
    ///
    /// * the dataset does not match the configured attribute and class counts
    /// * `Error::NotEnoughSamples` if there are fewer records than folds
    #[instrument(skip_all, fields(k_folds = self.k_folds(), n_samples = dataset.nsamples()))]
    pub fn evaluate(&self, dataset: &Dataset<usize>) -> Result<CrossValidationReport> {
        let ensemble = self.ensemble().check()?;
        let prune = if self.pruning() {
            Some(self.prune().check()?)
        } else {
            None
        };

        dataset.validate(self.n_attributes(), ensemble.n_classes())?;
        if dataset.nsamples() < self.k_folds() {
            return Err(Error::NotEnoughSamples);
        }

        let mut rng = StdRng::seed_from_u64(self.seed());
        let dataset = if self.shuffle() {
            dataset.shuffle(&mut rng)
        } else {
            dataset.clone()
        };
        let seeds = (0..self.k_folds()).map(|_| rng.gen()).collect::<Vec<u64>>();

        info!(
            n_classes = ensemble.n_classes(),
            aggregation = ?ensemble.aggregation(),
            pruning = prune.is_some(),
            "starting cross-validation"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.k_folds())
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;

        let folds = pool.install(|| {
            seeds
                .into_par_iter()
                .enumerate()
                .map(|(fold, seed)| self.run_fold(&dataset, &ensemble, prune.as_ref(), fold, seed))
                .collect::<Result<Vec<_>>>()
        })?;

        let report = CrossValidationReport::from_folds(folds)?;
        info!(
            mean_accuracy = report.mean_accuracy(),
            "cross-validation complete"
        );

        Ok(report)
    }

    #[instrument(skip_all, fields(fold = fold))]
    fn run_fold(
        &self,
        dataset: &Dataset<usize>,
        ensemble: &OneVsRestValidParams,
        prune: Option<&PruneValidParams>,
        fold: usize,
        seed: u64,
    ) -> Result<FoldReport> {
        let FoldPartition {
            training,
            validation,
            test,
        } = dataset.fold_partition(self.k_folds(), fold)?;
        debug!(
            training = training.nsamples(),
            validation = validation.nsamples(),
            test = test.nsamples(),
            "partitioned records"
        );

        let mut rng = StdRng::seed_from_u64(seed);

        // priorities come from trees before pruning, random aggregation has no use for them
        let tree_priorities = match ensemble.aggregation() {
            Aggregation::Priority => {
                let unvalidated = ensemble.fit_with_rng(&training, &mut rng)?;
                Some(unvalidated.tree_priority(&validation)?)
            }
            Aggregation::Random => None,
        };
        if let Some(priorities) = &tree_priorities {
            debug!(?priorities, "tree priorities");
        }

        let mut model = ensemble.fit_with_rng(&training, &mut rng)?;
        let pruning = match prune {
            Some(params) => {
                let summary = model.prune(&validation, params)?;
                debug!(
                    passes = summary.passes,
                    collapsed = summary.collapsed,
                    before = summary.accuracy_before,
                    after = summary.accuracy_after,
                    "pruned ensemble"
                );
                Some(summary)
            }
            None => None,
        };
        if let Some(priorities) = &tree_priorities {
            model.set_priorities(priorities.clone())?;
        }

        let predictions = model.predict_with_rng(test.records(), &mut rng)?;
        let confusion_matrix = predictions.confusion_matrix(&test, ensemble.n_classes())?;
        let accuracy = percent_correct(&predictions.to_vec(), &test.targets.to_vec());
        debug!(accuracy, "fold complete");

        Ok(FoldReport {
            fold,
            test_size: test.nsamples(),
            confusion_matrix,
            accuracy,
            tree_priorities,
            pruning,
        })
    }
}

impl CrossValidationParams {
    /// Check the parameters and run k-fold cross-validation, see
    /// [`CrossValidationValidParams::evaluate`]
    pub fn evaluate(&self, dataset: &Dataset<usize>) -> Result<CrossValidationReport> {
        self.check_ref()?.evaluate(dataset)
    }
}
