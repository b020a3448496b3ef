//! Cross-validated classifier fitting.
//!
//! The one batch step of the pipeline: positive and negative graphs are
//! vectorized into a materialized feature set, `n_iter_search` random
//! hyperparameter draws are each evaluated by k-fold cross-validation
//! (trials run in parallel), and the best draw is refit on all data.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::features::SparseVector;
use crate::graph::StructureGraph;
use crate::model::{HyperParams, SgdScorer};
use crate::traits::FeatureMapper;
use crate::types::SynthError;

/// Parameters of the hyperparameter search.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of cross-validation folds.
    pub cv: usize,
    /// Number of random hyperparameter draws.
    pub n_iter_search: usize,
    /// RNG seed for reproducible searches.
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            cv: 3,
            n_iter_search: 1,
            seed: 1,
        }
    }
}

const LEARNING_RATES: &[f32] = &[0.2, 0.1, 0.05, 0.01];
const L2_PENALTIES: &[f32] = &[1e-3, 1e-4, 1e-5];
const EPOCH_CHOICES: &[usize] = &[5, 10, 20];

/// Fits a classifier on positive and negative graphs.
///
/// # Errors
///
/// [`SynthError::Training`] when either class is empty.
pub fn fit<M>(
    positives: &[StructureGraph],
    negatives: &[StructureGraph],
    mapper: &M,
    dimensions: usize,
    config: &TrainConfig,
) -> Result<SgdScorer, SynthError>
where
    M: FeatureMapper + Sync,
{
    if positives.is_empty() || negatives.is_empty() {
        return Err(SynthError::Training(format!(
            "need both classes to train, got {} positives and {} negatives",
            positives.len(),
            negatives.len()
        )));
    }
    info!(
        "fitting on {} positive and {} negative graphs",
        positives.len(),
        negatives.len()
    );

    let samples: Vec<(SparseVector, f32)> = positives
        .par_iter()
        .map(|g| (mapper.transform(g), 1.0))
        .chain(negatives.par_iter().map(|g| (mapper.transform(g), 0.0)))
        .collect();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let draws: Vec<HyperParams> = (0..config.n_iter_search.max(1))
        .map(|_| HyperParams {
            learning_rate: *LEARNING_RATES.choose(&mut rng).unwrap(),
            l2: *L2_PENALTIES.choose(&mut rng).unwrap(),
            epochs: *EPOCH_CHOICES.choose(&mut rng).unwrap(),
        })
        .collect();

    let mut fold_order: Vec<usize> = (0..samples.len()).collect();
    fold_order.shuffle(&mut rng);
    let trial_seed: u64 = rng.gen();

    let scored: Vec<(f64, HyperParams)> = draws
        .par_iter()
        .map(|&params| {
            let score = cross_validate(&samples, &fold_order, dimensions, params, config.cv, trial_seed);
            debug!("trial {params:?} -> mean accuracy {score:.4}");
            (score, params)
        })
        .collect();

    let (best_score, best_params) = scored
        .into_iter()
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .ok_or_else(|| SynthError::Training("no hyperparameter trials ran".to_string()))?;
    info!("best trial {best_params:?} with mean CV accuracy {best_score:.4}");

    let mut refit_rng = StdRng::seed_from_u64(trial_seed);
    Ok(SgdScorer::train(
        &samples,
        dimensions,
        best_params,
        &mut refit_rng,
    ))
}

/// Mean held-out accuracy of `params` over `cv` folds.
fn cross_validate(
    samples: &[(SparseVector, f32)],
    fold_order: &[usize],
    dimensions: usize,
    params: HyperParams,
    cv: usize,
    seed: u64,
) -> f64 {
    let cv = cv.max(2).min(samples.len().max(2));
    let mut total = 0.0;
    for fold in 0..cv {
        let held_out: Vec<(SparseVector, f32)> = fold_order
            .iter()
            .enumerate()
            .filter(|(pos, _)| pos % cv == fold)
            .map(|(_, &idx)| samples[idx].clone())
            .collect();
        let train_set: Vec<(SparseVector, f32)> = fold_order
            .iter()
            .enumerate()
            .filter(|(pos, _)| pos % cv != fold)
            .map(|(_, &idx)| samples[idx].clone())
            .collect();
        if held_out.is_empty() || train_set.is_empty() {
            continue;
        }
        let mut rng = StdRng::seed_from_u64(seed ^ fold as u64);
        let model = SgdScorer::train(&train_set, dimensions, params, &mut rng);
        total += model.accuracy(&held_out);
    }
    total / cv as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::GraphVectorizer;
    use crate::traits::Scorer;
    use crate::types::parse_rna;

    fn graph(seq: &str) -> StructureGraph {
        StructureGraph::new("g", parse_rna(seq).unwrap())
    }

    #[test]
    fn test_fit_rejects_empty_class() {
        let mapper = GraphVectorizer::default();
        let result = fit(&[], &[graph("ACGU")], &mapper, 1 << 16, &TrainConfig::default());
        assert!(matches!(result, Err(SynthError::Training(_))));
    }

    #[test]
    fn test_fit_separates_distinct_compositions() {
        // GC-only positives against AU-only negatives are trivially
        // separable from label features alone.
        let mapper = GraphVectorizer::default();
        let positives: Vec<_> = (0..12).map(|_| graph("GCGCGCGCGC")).collect();
        let negatives: Vec<_> = (0..12).map(|_| graph("AUAUAUAUAU")).collect();
        let config = TrainConfig {
            cv: 3,
            n_iter_search: 3,
            seed: 42,
        };
        let model = fit(&positives, &negatives, &mapper, 1 << 16, &config).unwrap();
        let pos_score = mapper.predict(&graph("GCGCGCGCGC"), &model);
        let neg_score = mapper.predict(&graph("AUAUAUAUAU"), &model);
        assert!(pos_score > neg_score);
        assert!(pos_score > 0.0);
        assert!(neg_score < 0.0);
    }

    #[test]
    fn test_fit_is_reproducible_for_fixed_seed() {
        let mapper = GraphVectorizer::default();
        let positives: Vec<_> = (0..6).map(|_| graph("GCGCGC")).collect();
        let negatives: Vec<_> = (0..6).map(|_| graph("AUAUAU")).collect();
        let config = TrainConfig::default();
        let a = fit(&positives, &negatives, &mapper, 1 << 16, &config).unwrap();
        let b = fit(&positives, &negatives, &mapper, 1 << 16, &config).unwrap();
        let probe = mapper.transform(&graph("GCAUGC"));
        assert_eq!(a.score(&probe), b.score(&probe));
    }
}
