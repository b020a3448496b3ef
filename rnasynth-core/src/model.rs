//! Linear classification model.
//!
//! A plain linear model over hashed graph features, trained by stochastic
//! gradient descent on logistic loss. An unfit model scores everything 0;
//! such scores are well-formed but semantically meaningless, which is the
//! documented behavior when sampling before fitting.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::features::SparseVector;
use crate::traits::Scorer;

/// Hyperparameters of one SGD training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HyperParams {
    pub learning_rate: f32,
    pub l2: f32,
    pub epochs: usize,
}

impl Default for HyperParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            l2: 1e-4,
            epochs: 10,
        }
    }
}

/// Linear decision function `w . x + b`.
#[derive(Debug, Clone)]
pub struct SgdScorer {
    weights: Vec<f32>,
    bias: f32,
}

impl SgdScorer {
    /// Zero-weight model over a feature space of `dimensions` entries.
    pub fn untrained(dimensions: usize) -> Self {
        Self {
            weights: vec![0.0; dimensions],
            bias: 0.0,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.weights.len()
    }

    /// Fits one model by SGD on logistic loss over labeled feature
    /// vectors (`label` in `{0.0, 1.0}`). Sample order is reshuffled
    /// every epoch.
    pub fn train(
        samples: &[(SparseVector, f32)],
        dimensions: usize,
        params: HyperParams,
        rng: &mut StdRng,
    ) -> Self {
        let mut model = Self::untrained(dimensions);
        let mut order: Vec<usize> = (0..samples.len()).collect();
        for _epoch in 0..params.epochs {
            order.shuffle(rng);
            for &idx in &order {
                let (features, label) = &samples[idx];
                let margin = model.score(features) as f32;
                let predicted = sigmoid(margin);
                let gradient = predicted - label;
                for &(dim, value) in features.entries() {
                    let w = &mut model.weights[dim as usize];
                    *w -= params.learning_rate * (gradient * value + params.l2 * *w);
                }
                model.bias -= params.learning_rate * gradient;
            }
        }
        model
    }

    /// Classification accuracy at the 0 decision boundary.
    pub fn accuracy(&self, samples: &[(SparseVector, f32)]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let correct = samples
            .iter()
            .filter(|(features, label)| (self.score(features) > 0.0) == (*label > 0.5))
            .count();
        correct as f64 / samples.len() as f64
    }
}

impl Scorer for SgdScorer {
    fn score(&self, features: &SparseVector) -> f64 {
        let dot: f32 = features
            .entries()
            .iter()
            .map(|&(dim, value)| {
                self.weights.get(dim as usize).copied().unwrap_or(0.0) * value
            })
            .sum();
        (dot + self.bias) as f64
    }

    fn feature_weight(&self, index: u32) -> f64 {
        self.weights
            .get(index as usize)
            .copied()
            .unwrap_or(0.0) as f64
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
