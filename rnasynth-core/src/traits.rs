//! Capability interfaces for the pipeline's collaborators.
//!
//! The synthesis engine only ever talks to its folding oracle, feature
//! mapper, classifier and designer through these traits, so each can be
//! swapped for an alternative backend or a test double.

use crate::constraints::ConstraintRecord;
use crate::features::SparseVector;
use crate::graph::StructureGraph;
use crate::types::SynthError;

/// Folding mode requested from a [`Folder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldMode {
    /// Exactly one lowest-energy structure per sequence.
    Single,
    /// A bounded number of alternative structures per sequence.
    Multi,
}

/// Turns a sequence into one or more secondary-structure graphs.
pub trait Folder {
    /// Folds `seq` under `mode`. [`FoldMode::Single`] must yield exactly
    /// one graph; [`FoldMode::Multi`] may yield several, each an
    /// independent candidate carrying the given `id`.
    fn fold(&self, id: &str, seq: &str, mode: FoldMode) -> Result<Vec<StructureGraph>, SynthError>;
}

/// Real-valued scoring model over feature vectors.
pub trait Scorer {
    /// Decision score of one feature vector.
    fn score(&self, features: &SparseVector) -> f64;

    /// Weight of a single feature dimension, used for back-annotation.
    fn feature_weight(&self, index: u32) -> f64;
}

/// Embeds graphs into feature vectors and back-annotates node importance.
pub trait FeatureMapper {
    /// Feature vector of one graph.
    fn transform(&self, graph: &StructureGraph) -> SparseVector;

    /// Decision score of one graph under `scorer`.
    fn predict(&self, graph: &StructureGraph, scorer: &dyn Scorer) -> f64 {
        scorer.score(&self.transform(graph))
    }

    /// Attaches a signed importance score to every node of `graph`,
    /// derived from `scorer`'s weights.
    fn annotate(&self, graph: &mut StructureGraph, scorer: &dyn Scorer);
}

/// Synthesizes one candidate sequence from a constraint record.
///
/// Design is best-effort: implementations return their best candidate and
/// never fail for non-convergence, so callers needing guaranteed
/// constraint satisfaction must re-validate independently.
pub trait ConstraintDesigner {
    /// One sequence over `{A, U, G, C}` with the same length as the
    /// record's constraint strings.
    fn design(&self, record: &ConstraintRecord) -> String;
}
