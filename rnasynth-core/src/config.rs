//! Pipeline configuration.

/// Configuration for the full synthesis pipeline.
///
/// Every recognized option of the extractor, folder, vectorizer, trainer,
/// designer and the control loop is enumerated here with its default, so
/// collaborators never receive untyped option bags.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    // Constraint extraction.
    /// Importance cutoff for sequence-constraint positions.
    ///
    /// **Default**: `0.0`
    pub importance_threshold_sequence_constraint: f64,
    /// Minimum adjacent important nucleotides forming a sequence constraint.
    ///
    /// **Default**: `1`
    pub min_size_connected_component_sequence_constraint: usize,
    /// Importance cutoff for structure-constraint basepairs.
    ///
    /// **Default**: `0.0`
    pub importance_threshold_structure_constraint: f64,
    /// Minimum adjacent important positions forming a structure constraint.
    ///
    /// **Default**: `1`
    pub min_size_connected_component_structure_constraint: usize,
    /// Minimum adjacent unpaired positions forming an unpaired region.
    ///
    /// **Default**: `1`
    pub min_size_connected_component_unpaired_structure_constraint: usize,

    // Folding.
    /// Minimum hairpin loop length.
    ///
    /// **Default**: `3`
    pub min_loop_length: usize,
    /// Bound on alternative structures per sequence in multi mode.
    ///
    /// **Default**: `3`
    pub max_structures_per_sequence: usize,
    /// Energy window (percent below the best structure) for alternatives.
    ///
    /// **Default**: `35.0`
    pub energy_range: f64,
    /// Split multi-mode structures into independent components.
    ///
    /// **Default**: `false`
    pub split_components: bool,

    // Vectorization.
    /// Neighborhood relabeling rounds.
    ///
    /// **Default**: `2`
    pub vectorizer_complexity: usize,
    /// Log2 of the hashed feature-space dimensionality.
    ///
    /// **Default**: `16`
    pub vectorizer_bits: u32,

    // Training.
    /// Cross-validation folds.
    ///
    /// **Default**: `3`
    pub cv: usize,
    /// Random hyperparameter draws.
    ///
    /// **Default**: `1`
    pub n_iter_search: usize,
    /// Worker threads for parallel trials; `None` keeps the rayon default.
    ///
    /// **Default**: `None`
    pub n_jobs: Option<usize>,

    // Synthesis loop.
    /// Designed sequences per extracted constraint record.
    ///
    /// **Default**: `3`
    pub n_synthesized_seqs_per_seed_seq: usize,
    /// Candidate structure graphs must score strictly above this before
    /// design.
    ///
    /// **Default**: `0.0`
    pub instance_score_threshold_in: f64,
    /// Designed sequences must score strictly above this after refolding.
    ///
    /// **Default**: `1.0`
    pub instance_score_threshold_out: f64,
    /// Chunk size of the negative-generation shuffle.
    ///
    /// **Default**: `2`
    pub shuffle_order: usize,
    /// Shuffled negatives per seed sequence.
    ///
    /// **Default**: `2`
    pub negative_shuffle_ratio: usize,

    // Design.
    /// Designer sampling restarts per call.
    ///
    /// **Default**: `10`
    pub design_restarts: usize,

    /// RNG seed for shuffling, search and design.
    ///
    /// **Default**: `1`
    pub rng_seed: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            importance_threshold_sequence_constraint: 0.0,
            min_size_connected_component_sequence_constraint: 1,
            importance_threshold_structure_constraint: 0.0,
            min_size_connected_component_structure_constraint: 1,
            min_size_connected_component_unpaired_structure_constraint: 1,
            min_loop_length: 3,
            max_structures_per_sequence: 3,
            energy_range: 35.0,
            split_components: false,
            vectorizer_complexity: 2,
            vectorizer_bits: 16,
            cv: 3,
            n_iter_search: 1,
            n_jobs: None,
            n_synthesized_seqs_per_seed_seq: 3,
            instance_score_threshold_in: 0.0,
            instance_score_threshold_out: 1.0,
            shuffle_order: 2,
            negative_shuffle_ratio: 2,
            design_restarts: 10,
            rng_seed: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference() {
        let config = SynthConfig::default();
        assert_eq!(config.instance_score_threshold_in, 0.0);
        assert_eq!(config.instance_score_threshold_out, 1.0);
        assert_eq!(config.n_synthesized_seqs_per_seed_seq, 3);
        assert_eq!(config.negative_shuffle_ratio, 2);
        assert_eq!(config.shuffle_order, 2);
        assert_eq!(config.cv, 3);
        assert_eq!(config.n_iter_search, 1);
    }
}
