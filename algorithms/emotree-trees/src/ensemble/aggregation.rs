//! Combination of the per-class tree outputs for a single record
//!
//! Both strategies only read the leaf outcomes, they never touch the ensemble. Classes are
//! returned as 1-based labels, the tree at index `i` votes for class `i + 1`.
use std::cmp::Ordering;

use rand::{seq::SliceRandom, Rng};

use crate::LeafOutcome;

/// Select a class by the confidence of the reached leaves
///
/// If any tree answers positive, the positive tree with the shallowest leaf wins, ties are broken
/// by the lowest leaf entropy. Without positive trees the deepest negative leaf wins, again
/// preferring low entropy. Remaining ties go to the tree with higher `priorities`, if given, and
/// finally to the lowest class.
///
/// Returns `None` for an ensemble without trees.
pub fn priority_vote(outcomes: &[LeafOutcome], priorities: Option<&[f64]>) -> Option<usize> {
    let any_positive = outcomes.iter().any(|outcome| outcome.positive);
    let priority = |idx: usize| {
        priorities
            .and_then(|priorities| priorities.get(idx))
            .copied()
            .unwrap_or(0.0)
    };

    // `Ordering::Less` marks the more confident of two trees
    let rank = |a: &(usize, &LeafOutcome), b: &(usize, &LeafOutcome)| {
        let depth = if any_positive {
            a.1.depth.cmp(&b.1.depth)
        } else {
            b.1.depth.cmp(&a.1.depth)
        };

        depth
            .then_with(|| {
                a.1.entropy
                    .partial_cmp(&b.1.entropy)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| {
                priority(b.0)
                    .partial_cmp(&priority(a.0))
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.0.cmp(&b.0))
    };

    outcomes
        .iter()
        .enumerate()
        .filter(|(_, outcome)| outcome.positive == any_positive)
        .min_by(rank)
        .map(|(idx, _)| idx + 1)
}

/// Select a positive tree uniformly at random, or any class if all trees answer negative
///
/// Returns `None` for an ensemble without trees.
pub fn random_vote<R: Rng>(outcomes: &[LeafOutcome], rng: &mut R) -> Option<usize> {
    if outcomes.is_empty() {
        return None;
    }

    let positives = outcomes
        .iter()
        .enumerate()
        .filter(|(_, outcome)| outcome.positive)
        .map(|(idx, _)| idx + 1)
        .collect::<Vec<_>>();

    match positives.choose(rng) {
        Some(class) => Some(*class),
        None => Some(rng.gen_range(1..=outcomes.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    fn leaves(triples: &[(bool, f64, usize)]) -> Vec<LeafOutcome> {
        triples
            .iter()
            .map(|(positive, entropy, depth)| LeafOutcome::new(*positive, *entropy, *depth))
            .collect()
    }

    #[test]
    fn positive_tree_wins_over_negative() {
        let outcomes = leaves(&[(true, 0.1, 2), (false, 0.2, 3)]);
        assert_eq!(priority_vote(&outcomes, None), Some(1));
    }

    #[test]
    fn shallowest_positive_wins() {
        let outcomes = leaves(&[(true, 0.0, 4), (false, 0.0, 1), (true, 0.9, 2), (true, 0.0, 3)]);
        assert_eq!(priority_vote(&outcomes, None), Some(3));
    }

    #[test]
    fn entropy_breaks_depth_ties() {
        let outcomes = leaves(&[(true, 0.5, 2), (true, 0.25, 2), (true, 0.75, 2)]);
        assert_eq!(priority_vote(&outcomes, None), Some(2));

        let outcomes = leaves(&[(false, 0.2, 5), (false, 0.0, 1), (false, 0.1, 5)]);
        assert_eq!(priority_vote(&outcomes, None), Some(3));
    }

    #[test]
    fn deepest_negative_wins_without_positives() {
        let outcomes = leaves(&[(false, 0.0, 1), (false, 0.9, 6), (false, 0.0, 3)]);
        assert_eq!(priority_vote(&outcomes, None), Some(2));
    }

    #[test]
    fn priorities_and_index_break_remaining_ties() {
        let outcomes = leaves(&[(true, 0.0, 2), (true, 0.0, 2), (true, 0.0, 2)]);

        assert_eq!(priority_vote(&outcomes, None), Some(1));
        assert_eq!(
            priority_vote(&outcomes, Some(&[0.5, 0.9, 0.7][..])),
            Some(2)
        );
        assert_eq!(
            priority_vote(&outcomes, Some(&[0.8, 0.8, 0.8][..])),
            Some(1)
        );
    }

    #[test]
    fn empty_ensemble_has_no_vote() {
        let mut rng = SmallRng::seed_from_u64(42);

        assert_eq!(priority_vote(&[], None), None);
        assert_eq!(random_vote(&[], &mut rng), None);
    }

    #[test]
    fn random_vote_picks_positive_trees() {
        let outcomes = leaves(&[(false, 0.0, 1), (true, 0.5, 3), (false, 0.0, 2), (true, 0.1, 1)]);
        let mut rng = SmallRng::seed_from_u64(42);

        let mut counts = [0usize; 5];
        for _ in 0..1000 {
            let class = random_vote(&outcomes, &mut rng).unwrap();
            counts[class] += 1;
        }

        assert_eq!(counts[1] + counts[3], 0);
        assert!(counts[2] > 400 && counts[4] > 400, "{:?}", counts);
    }

    #[test]
    fn random_vote_without_positives_is_uniform() {
        let outcomes = leaves(&[(false, 0.0, 1); 6]);
        let mut rng = SmallRng::seed_from_u64(7);
        let trials = 6000;

        let mut counts = [0usize; 7];
        for _ in 0..trials {
            let class = random_vote(&outcomes, &mut rng).unwrap();
            counts[class] += 1;
        }

        assert_eq!(counts[0], 0);
        // expected 1000 per class, standard deviation is about 29
        for count in &counts[1..] {
            assert!(*count > 850 && *count < 1150, "{:?}", counts);
        }
    }
}
