//! The fit / sample / predict control loop.
//!
//! [`Synthesizer`] orchestrates folding, classification, constraint
//! extraction, design and filtering. One instance moves between two
//! conceptual states, untrained and trained: [`Synthesizer::fit`] replaces
//! the held model in place (repeated calls simply retrain), while
//! [`Synthesizer::sample`] and [`Synthesizer::predict`] are callable in
//! either state — scores from an unfit model are well-formed but
//! meaningless, which is the caller's responsibility to avoid.
//!
//! The two filtering stages of `sample` are intentionally asymmetric and
//! must stay that way: the pre-design gate scores several multi-structure
//! candidates per seed, the post-design gate scores exactly one
//! single-structure fold per synthesized sequence.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::SynthConfig;
use crate::constraints::ConstraintExtractor;
use crate::design::GcDesigner;
use crate::features::GraphVectorizer;
use crate::fold::NussinovFolder;
use crate::graph::StructureGraph;
use crate::model::SgdScorer;
use crate::shuffle::shuffled_variants;
use crate::training::{self, TrainConfig};
use crate::traits::{ConstraintDesigner, FeatureMapper, FoldMode, Folder};
use crate::types::{
    SeqRecord, SynthError, HEADER_DELIMITER, HEADER_PLACEHOLDER, SEQUENCE_PAD, STRUCTURE_PAD,
};

/// Sequence synthesizer driven by a trainable graph classifier.
pub struct Synthesizer<F, M, D> {
    config: SynthConfig,
    extractor: ConstraintExtractor,
    folder: F,
    mapper: M,
    designer: D,
    model: SgdScorer,
    shuffle_rng: StdRng,
    trained: bool,
}

impl Synthesizer<NussinovFolder, GraphVectorizer, GcDesigner> {
    /// Creates a synthesizer with the built-in folder, vectorizer and
    /// designer derived from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when the requested thread pool cannot be built.
    pub fn new(config: SynthConfig) -> Result<Self, SynthError> {
        if let Some(num_threads) = config.n_jobs {
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| SynthError::Training(format!("thread pool setup failed: {e}")))?;
        }
        let folder = NussinovFolder {
            min_loop_length: config.min_loop_length,
            max_structures_per_sequence: config.max_structures_per_sequence,
            energy_range: config.energy_range,
            split_components: config.split_components,
        };
        let mapper = GraphVectorizer {
            complexity: config.vectorizer_complexity,
            bits: config.vectorizer_bits,
        };
        let designer = GcDesigner::new(config.design_restarts, config.rng_seed);
        Ok(Self::with_collaborators(config, folder, mapper, designer))
    }
}

impl<F, M, D> Synthesizer<F, M, D>
where
    F: Folder,
    M: FeatureMapper + Sync,
    D: ConstraintDesigner,
{
    /// Creates a synthesizer over explicit collaborators. The model starts
    /// unfit (all scores 0) until [`fit`](Self::fit) is called.
    pub fn with_collaborators(config: SynthConfig, folder: F, mapper: M, designer: D) -> Self {
        let extractor = ConstraintExtractor {
            importance_threshold_sequence_constraint: config
                .importance_threshold_sequence_constraint,
            min_size_connected_component_sequence_constraint: config
                .min_size_connected_component_sequence_constraint,
            importance_threshold_structure_constraint: config
                .importance_threshold_structure_constraint,
            min_size_connected_component_structure_constraint: config
                .min_size_connected_component_structure_constraint,
            min_size_connected_component_unpaired_structure_constraint: config
                .min_size_connected_component_unpaired_structure_constraint,
        };
        let model = SgdScorer::untrained(1usize << config.vectorizer_bits);
        let shuffle_rng = StdRng::seed_from_u64(config.rng_seed);
        Self {
            config,
            extractor,
            folder,
            mapper,
            designer,
            model,
            shuffle_rng,
            trained: false,
        }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Whether a fit has replaced the initial unfit model.
    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Trains the classifier on seed sequences against shuffled negatives.
    ///
    /// Each seed is consumed once: its multi-structure folds become
    /// positive examples and the folds of its shuffled variants become
    /// negatives. The held model is replaced wholesale; calling `fit`
    /// again simply retrains.
    ///
    /// # Errors
    ///
    /// Fails on unfoldable sequences or when either class ends up empty.
    pub fn fit<I>(&mut self, seeds: I) -> Result<(), SynthError>
    where
        I: IntoIterator<Item = SeqRecord>,
    {
        let mut positives: Vec<StructureGraph> = Vec::new();
        let mut negatives: Vec<StructureGraph> = Vec::new();
        for (id, seq) in seeds {
            positives.extend(self.folder.fold(&id, &seq, FoldMode::Multi)?);
            let variants = shuffled_variants(
                &seq,
                self.config.shuffle_order,
                self.config.negative_shuffle_ratio,
                &mut self.shuffle_rng,
            );
            for (k, variant) in variants.into_iter().enumerate() {
                let neg_id = format!("{id}_shuffled_{k}");
                negatives.extend(self.folder.fold(&neg_id, &variant, FoldMode::Multi)?);
            }
        }

        let train_config = TrainConfig {
            cv: self.config.cv,
            n_iter_search: self.config.n_iter_search,
            seed: self.config.rng_seed,
        };
        self.model = training::fit(
            &positives,
            &negatives,
            &self.mapper,
            1usize << self.config.vectorizer_bits,
            &train_config,
        )?;
        self.trained = true;
        Ok(())
    }

    /// Synthesizes sequences from the given inputs.
    ///
    /// Single-pass lazy pipeline: multi-structure folding, the strict
    /// pre-design score gate, annotation + constraint extraction + design
    /// (several candidates per record), then the strict post-design gate
    /// on a single-structure refold. Per-item errors are yielded in
    /// place of the item; nothing is silently dropped.
    pub fn sample<'a, I>(
        &'a self,
        seqs: I,
    ) -> impl Iterator<Item = Result<SeqRecord, SynthError>> + 'a
    where
        I: IntoIterator<Item = SeqRecord>,
        I::IntoIter: 'a,
    {
        if !self.trained {
            debug!("sampling with an unfit model; scores are meaningless");
        }
        seqs.into_iter()
            .flat_map(move |(id, seq)| match self.folder.fold(&id, &seq, FoldMode::Multi) {
                Ok(graphs) => graphs.into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(e)],
            })
            .filter_map(move |item| self.in_gate(item))
            .flat_map(move |item| self.design_stage(item))
            .filter_map(move |item| self.out_gate(item))
    }

    /// Scores each input under the single-structure fold, in input order.
    pub fn predict<'a, I>(
        &'a self,
        seqs: I,
    ) -> impl Iterator<Item = Result<f64, SynthError>> + 'a
    where
        I: IntoIterator<Item = SeqRecord>,
        I::IntoIter: 'a,
    {
        seqs.into_iter()
            .map(move |(id, seq)| self.single_fold_score(&id, &seq))
    }

    /// Fits on the seed stream, then samples the same seeds.
    ///
    /// The stream is buffered once up front, so a one-pass source is
    /// sufficient: `fit` consumes the replay of the buffer and `sample`
    /// runs over the untouched copy.
    pub fn fit_sample<I>(
        &mut self,
        seeds: I,
    ) -> Result<impl Iterator<Item = Result<SeqRecord, SynthError>> + '_, SynthError>
    where
        I: IntoIterator<Item = SeqRecord>,
    {
        let buffered: Vec<SeqRecord> = seeds.into_iter().collect();
        info!("fit_sample over {} seed sequences", buffered.len());
        self.fit(buffered.iter().cloned())?;
        Ok(self.sample(buffered))
    }

    /// Pre-design gate: keep candidate graphs scoring strictly above the
    /// in-threshold. The boundary value itself is excluded.
    fn in_gate(
        &self,
        item: Result<StructureGraph, SynthError>,
    ) -> Option<Result<StructureGraph, SynthError>> {
        match item {
            Ok(graph) => {
                let score = self.mapper.predict(&graph, &self.model);
                (score > self.config.instance_score_threshold_in).then_some(Ok(graph))
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// Annotates a retained graph, extracts its constraint record and
    /// invokes the designer once per requested synthesis.
    fn design_stage(
        &self,
        item: Result<StructureGraph, SynthError>,
    ) -> Vec<Result<SeqRecord, SynthError>> {
        let mut graph = match item {
            Ok(graph) => graph,
            Err(e) => return vec![Err(e)],
        };
        self.mapper.annotate(&mut graph, &self.model);
        let record = match self.extractor.extract_one(&graph) {
            Ok(record) => record,
            Err(e) => return vec![Err(e)],
        };
        let structure_display = record
            .structure_constraint
            .replace(STRUCTURE_PAD, &HEADER_PLACEHOLDER.to_string());
        let sequence_display = record
            .sequence_constraint
            .replace(SEQUENCE_PAD, &HEADER_PLACEHOLDER.to_string());
        (0..self.config.n_synthesized_seqs_per_seed_seq)
            .map(|count| {
                let sequence = self.designer.design(&record);
                let header = format!(
                    "{id}{d}{count}{d}{structure_display}{d}{sequence_display}",
                    id = record.source_id,
                    d = HEADER_DELIMITER,
                );
                Ok((header, sequence))
            })
            .collect()
    }

    /// Post-design gate: refold the synthesized sequence in single mode
    /// and keep it only when its score is strictly above the
    /// out-threshold.
    fn out_gate(
        &self,
        item: Result<SeqRecord, SynthError>,
    ) -> Option<Result<SeqRecord, SynthError>> {
        match item {
            Ok((header, seq)) => match self.single_fold_score(&header, &seq) {
                Ok(score) => {
                    (score > self.config.instance_score_threshold_out).then_some(Ok((header, seq)))
                }
                Err(e) => Some(Err(e)),
            },
            Err(e) => Some(Err(e)),
        }
    }

    fn single_fold_score(&self, id: &str, seq: &str) -> Result<f64, SynthError> {
        let graphs = self.folder.fold(id, seq, FoldMode::Single)?;
        let graph = graphs.into_iter().next().ok_or_else(|| {
            SynthError::GraphMalformed("single-mode folder returned no graph".to_string())
        })?;
        Ok(self.mapper.predict(&graph, &self.model))
    }
}
