//! Graph feature vectors.
//!
//! [`GraphVectorizer`] embeds a [`StructureGraph`] into a hashed sparse
//! feature space by iterative neighborhood relabeling: round 0 uses the
//! bare nucleotide label, each further round hashes a node's previous
//! label together with the sorted labels of its neighbors. Every label at
//! every round contributes one count to a `2^bits`-dimensional vector,
//! which is L2-normalized. The same per-node feature decomposition drives
//! importance back-annotation.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::graph::StructureGraph;
use crate::traits::{FeatureMapper, Scorer};

/// Sparse feature vector with entries sorted by dimension index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseVector {
    entries: Vec<(u32, f32)>,
}

impl SparseVector {
    /// Builds a vector from raw counts and L2-normalizes it.
    pub fn from_counts(counts: HashMap<u32, f32>) -> Self {
        let mut entries: Vec<(u32, f32)> = counts.into_iter().collect();
        entries.sort_unstable_by_key(|&(idx, _)| idx);
        let mut vector = Self { entries };
        vector.normalize();
        vector
    }

    pub fn entries(&self) -> &[(u32, f32)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// L2 norm.
    pub fn norm(&self) -> f32 {
        self.entries
            .iter()
            .map(|&(_, v)| v * v)
            .sum::<f32>()
            .sqrt()
    }

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, v) in &mut self.entries {
                *v /= norm;
            }
        }
    }
}

/// Hashed neighborhood-label vectorizer.
#[derive(Debug, Clone)]
pub struct GraphVectorizer {
    /// Number of relabeling rounds beyond the bare label.
    pub complexity: usize,
    /// Log2 of the feature-space dimensionality.
    pub bits: u32,
}

impl Default for GraphVectorizer {
    fn default() -> Self {
        Self {
            complexity: 2,
            bits: 16,
        }
    }
}

impl GraphVectorizer {
    pub fn dimensions(&self) -> usize {
        1usize << self.bits
    }

    /// Hashed feature indices rooted at each node, one entry per
    /// relabeling round: `features[node] = [idx_round0, idx_round1, ..]`.
    fn node_features(&self, graph: &StructureGraph) -> Vec<Vec<u32>> {
        let n = graph.len();
        let mask = (self.dimensions() - 1) as u64;
        let mut labels: Vec<u64> = (0..n).map(|i| hash_one(graph.label(i).to_char())).collect();
        let mut features: Vec<Vec<u32>> = labels
            .iter()
            .map(|&l| vec![(l & mask) as u32])
            .collect();

        for _round in 0..self.complexity {
            let mut next = Vec::with_capacity(n);
            for idx in 0..n {
                let mut neighborhood: Vec<u64> =
                    graph.neighbors(idx).iter().map(|&j| labels[j]).collect();
                neighborhood.sort_unstable();
                let mut hasher = DefaultHasher::new();
                labels[idx].hash(&mut hasher);
                neighborhood.hash(&mut hasher);
                let relabel = hasher.finish();
                features[idx].push((relabel & mask) as u32);
                next.push(relabel);
            }
            labels = next;
        }
        features
    }
}

fn hash_one<T: Hash>(value: T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

impl FeatureMapper for GraphVectorizer {
    fn transform(&self, graph: &StructureGraph) -> SparseVector {
        let mut counts: HashMap<u32, f32> = HashMap::new();
        for node_feats in self.node_features(graph) {
            for idx in node_feats {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        SparseVector::from_counts(counts)
    }

    fn annotate(&self, graph: &mut StructureGraph, scorer: &dyn Scorer) {
        let features = self.node_features(graph);
        // Norm of the full (unnormalized) count vector, so that per-node
        // contributions sum to the graph's decision score minus bias.
        let mut counts: HashMap<u32, f32> = HashMap::new();
        for node_feats in &features {
            for &idx in node_feats {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        let norm = counts.values().map(|v| v * v).sum::<f32>().sqrt();
        let scale = if norm > 0.0 { 1.0 / norm as f64 } else { 0.0 };

        for (idx, node_feats) in features.iter().enumerate() {
            let importance: f64 = node_feats
                .iter()
                .map(|&f| scorer.feature_weight(f) * scale)
                .sum();
            graph.set_importance(idx, importance);
        }
    }
}
