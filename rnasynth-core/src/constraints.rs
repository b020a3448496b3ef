//! Constraint extraction from annotated structure graphs.
//!
//! Turns a classifier-annotated [`StructureGraph`] into the constraint
//! record consumed by a sequence designer: a dot-bracket structure
//! constraint, a nucleotide sequence constraint, the GC content of the
//! source sequence, and the source graph id.
//!
//! Both constraint strings are driven by the same importance analysis:
//! drop every node scoring below a threshold, keep connected components of
//! the survivors that are large enough, and take the union. The sequence
//! constraint uses the *inverted* result (unimportant positions become
//! wildcards), the structure constraint the non-inverted one (a basepair is
//! retained only when both endpoints are important). This asymmetry is
//! carried over from the reference behavior deliberately.

use crate::graph::StructureGraph;
use crate::types::{SynthError, SEQUENCE_PAD, STRUCTURE_PAD};

/// Constraints extracted from one annotated graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintRecord {
    /// Dot-bracket string over `(`, `)`, `.` and [`STRUCTURE_PAD`].
    pub structure_constraint: String,
    /// Nucleotide string over `A`, `U`, `G`, `C` and [`SEQUENCE_PAD`].
    pub sequence_constraint: String,
    /// Fraction of G/C positions in the source sequence, in `[0, 1]`.
    pub gc_content: f64,
    /// Id of the graph the record was extracted from.
    pub source_id: String,
}

/// Extracts sequence and structure constraints from annotated graphs.
///
/// Thresholds and component sizes are held separately for the sequence
/// constraint, the paired part of the structure constraint, and the
/// unpaired part of the structure constraint.
#[derive(Debug, Clone)]
pub struct ConstraintExtractor {
    /// Importance cutoff for sequence-constraint positions.
    pub importance_threshold_sequence_constraint: f64,
    /// Minimum surviving-component size for sequence constraints.
    pub min_size_connected_component_sequence_constraint: usize,
    /// Importance cutoff for structure-constraint basepairs.
    pub importance_threshold_structure_constraint: f64,
    /// Minimum surviving-component size for structure constraints.
    pub min_size_connected_component_structure_constraint: usize,
    /// Minimum component size for unpaired regions.
    pub min_size_connected_component_unpaired_structure_constraint: usize,
}

impl Default for ConstraintExtractor {
    fn default() -> Self {
        Self {
            importance_threshold_sequence_constraint: 0.0,
            min_size_connected_component_sequence_constraint: 1,
            importance_threshold_structure_constraint: 0.0,
            min_size_connected_component_structure_constraint: 1,
            min_size_connected_component_unpaired_structure_constraint: 1,
        }
    }
}

impl ConstraintExtractor {
    /// Lazily extracts one [`ConstraintRecord`] per input graph, in input
    /// order. A malformed or empty graph fails its own record rather than
    /// being skipped.
    pub fn extract<'a, I>(
        &'a self,
        graphs: I,
    ) -> impl Iterator<Item = Result<ConstraintRecord, SynthError>> + 'a
    where
        I: IntoIterator<Item = StructureGraph>,
        I::IntoIter: 'a,
    {
        graphs.into_iter().map(move |g| self.extract_one(&g))
    }

    /// Extracts the constraint record of a single annotated graph.
    ///
    /// # Errors
    ///
    /// [`SynthError::ZeroNodeGraph`] for an empty graph,
    /// [`SynthError::GraphMalformed`] when a node lacks an importance
    /// annotation.
    pub fn extract_one(&self, graph: &StructureGraph) -> Result<ConstraintRecord, SynthError> {
        let gc_content = gc_content(graph)?;
        let sequence_constraint = self.sequence_constraint(graph)?;
        let structure_constraint = self.structure_constraint(graph)?;
        Ok(ConstraintRecord {
            structure_constraint,
            sequence_constraint,
            gc_content,
            source_id: graph.id().to_string(),
        })
    }

    /// Nodes surviving the importance cut and the component-size filter,
    /// as a membership mask. With `invert`, the complement against the
    /// full node set.
    pub fn important_node_set(
        graph: &StructureGraph,
        threshold: f64,
        min_component_size: usize,
        invert: bool,
    ) -> Result<Vec<bool>, SynthError> {
        let n = graph.len();
        let mut above = vec![false; n];
        for idx in 0..n {
            above[idx] = graph.importance_or_err(idx)? >= threshold;
        }
        let mut mask = vec![false; n];
        for component in graph.components_after_removal(|i| above[i]) {
            if component.len() >= min_component_size {
                for idx in component {
                    mask[idx] = true;
                }
            }
        }
        if invert {
            for flag in &mut mask {
                *flag = !*flag;
            }
        }
        Ok(mask)
    }

    /// Sequence constraint: every position defaults to its real nucleotide;
    /// positions in the inverted important set are padded to wildcards.
    fn sequence_constraint(&self, graph: &StructureGraph) -> Result<String, SynthError> {
        let mut chars: Vec<char> = (0..graph.len()).map(|i| graph.label(i).to_char()).collect();
        let unimportant = Self::important_node_set(
            graph,
            self.importance_threshold_sequence_constraint,
            self.min_size_connected_component_sequence_constraint,
            true,
        )?;
        for (idx, &pad) in unimportant.iter().enumerate() {
            if pad {
                chars[idx] = SEQUENCE_PAD;
            }
        }
        Ok(chars.into_iter().collect())
    }

    /// Structure constraint: basepairs whose endpoints are both important
    /// become brackets; qualifying unpaired regions become dots. The
    /// unpaired pass runs last and overwrites bracket marks at shared
    /// positions, matching the reference behavior exactly.
    fn structure_constraint(&self, graph: &StructureGraph) -> Result<String, SynthError> {
        let mut chars = vec![STRUCTURE_PAD; graph.len()];
        let important = Self::important_node_set(
            graph,
            self.importance_threshold_structure_constraint,
            self.min_size_connected_component_structure_constraint,
            false,
        )?;
        Self::mark_basepairs(graph, &important, &mut chars);
        // Order matters: the unpaired pass runs last and overwrites any
        // bracket at a shared position.
        Self::mark_unpaired(&self.unpaired_regions(graph), &mut chars);
        Ok(chars.into_iter().collect())
    }

    fn mark_basepairs(graph: &StructureGraph, important: &[bool], chars: &mut [char]) {
        for &(i, j) in graph.basepairs() {
            if important[i] && important[j] {
                chars[i] = '(';
                chars[j] = ')';
            }
        }
    }

    fn mark_unpaired(regions: &[usize], chars: &mut [char]) {
        for &idx in regions {
            chars[idx] = '.';
        }
    }

    /// Positions in unpaired regions: connected components of the graph
    /// with all paired nodes removed, of qualifying size.
    fn unpaired_regions(&self, graph: &StructureGraph) -> Vec<usize> {
        let mut regions = Vec::new();
        for component in graph.components_after_removal(|i| graph.partner(i).is_none()) {
            if component.len() >= self.min_size_connected_component_unpaired_structure_constraint {
                regions.extend(component);
            }
        }
        regions
    }
}

/// Fraction of nodes labeled G or C.
///
/// # Errors
///
/// [`SynthError::ZeroNodeGraph`] when the graph has no nodes.
pub fn gc_content(graph: &StructureGraph) -> Result<f64, SynthError> {
    if graph.is_empty() {
        return Err(SynthError::ZeroNodeGraph);
    }
    let gc = (0..graph.len()).filter(|&i| graph.label(i).is_gc()).count();
    Ok(gc as f64 / graph.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_rna;

    fn annotated_path(seq: &str, scores: &[f64]) -> StructureGraph {
        let mut g = StructureGraph::new("t", parse_rna(seq).unwrap());
        for (idx, &score) in scores.iter().enumerate() {
            g.set_importance(idx, score);
        }
        g
    }

    #[test]
    fn test_gc_content_exact() {
        let g = annotated_path("GCAU", &[0.0; 4]);
        assert_eq!(gc_content(&g).unwrap(), 0.5);
        let g = annotated_path("GGGG", &[0.0; 4]);
        assert_eq!(gc_content(&g).unwrap(), 1.0);
    }

    #[test]
    fn test_gc_content_zero_node_graph() {
        let g = StructureGraph::new("empty", vec![]);
        assert!(matches!(gc_content(&g), Err(SynthError::ZeroNodeGraph)));
    }

    #[test]
    fn test_important_node_set_path_example() {
        // 5-node path, scores [2, 2, -1, 2, 2], threshold 0, min size 1:
        // survivors split into {0,1} and {3,4}.
        let g = annotated_path("AAAAA", &[2.0, 2.0, -1.0, 2.0, 2.0]);
        let mask = ConstraintExtractor::important_node_set(&g, 0.0, 1, false).unwrap();
        assert_eq!(mask, vec![true, true, false, true, true]);
        let inverted = ConstraintExtractor::important_node_set(&g, 0.0, 1, true).unwrap();
        assert_eq!(inverted, vec![false, false, true, false, false]);
    }

    #[test]
    fn test_important_node_set_component_size_filter() {
        // min size 3 discards both 2-node survivor components.
        let g = annotated_path("AAAAA", &[2.0, 2.0, -1.0, 2.0, 2.0]);
        let mask = ConstraintExtractor::important_node_set(&g, 0.0, 3, false).unwrap();
        assert_eq!(mask, vec![false; 5]);
    }

    #[test]
    fn test_important_node_set_threshold_is_inclusive() {
        // A score exactly at the threshold survives the cut.
        let g = annotated_path("AA", &[0.0, -0.1]);
        let mask = ConstraintExtractor::important_node_set(&g, 0.0, 1, false).unwrap();
        assert_eq!(mask, vec![true, false]);
    }

    #[test]
    fn test_important_node_set_requires_annotation() {
        let g = StructureGraph::new("t", parse_rna("ACG").unwrap());
        assert!(matches!(
            ConstraintExtractor::important_node_set(&g, 0.0, 1, false),
            Err(SynthError::GraphMalformed(_))
        ));
    }

    #[test]
    fn test_sequence_constraint_pads_unimportant() {
        // Unimportant positions become N, important ones keep their base.
        let g = annotated_path("GCAUG", &[2.0, 2.0, -1.0, 2.0, 2.0]);
        let extractor = ConstraintExtractor::default();
        let record = extractor.extract_one(&g).unwrap();
        assert_eq!(record.sequence_constraint, "GCNUG");
    }

    #[test]
    fn test_constraint_lengths_match_graph() {
        let mut g = annotated_path("GGGCCC", &[1.0; 6]);
        g.add_basepair(0, 5).unwrap();
        let record = ConstraintExtractor::default().extract_one(&g).unwrap();
        assert_eq!(record.structure_constraint.len(), 6);
        assert_eq!(record.sequence_constraint.len(), 6);
    }

    #[test]
    fn test_basepair_needs_both_endpoints_important() {
        // Pair (0, 5): node 5 fails the cut, so neither side is marked.
        let mut g = annotated_path("GAAAAC", &[1.0, 1.0, 1.0, 1.0, 1.0, -1.0]);
        g.add_basepair(0, 5).unwrap();
        let extractor = ConstraintExtractor {
            // Disable the unpaired pass so bracket marks are observable.
            min_size_connected_component_unpaired_structure_constraint: 100,
            ..ConstraintExtractor::default()
        };
        let record = extractor.extract_one(&g).unwrap();
        assert!(!record.structure_constraint.contains('('));
        assert!(!record.structure_constraint.contains(')'));

        // Same pair with both endpoints important is marked on both sides.
        let mut g = annotated_path("GAAAAC", &[1.0; 6]);
        g.add_basepair(0, 5).unwrap();
        let record = extractor.extract_one(&g).unwrap();
        assert_eq!(record.structure_constraint, "(AAAA)");
    }

    #[test]
    fn test_hairpin_structure_constraint() {
        let mut g = annotated_path("GAC", &[1.0; 3]);
        g.add_basepair(0, 2).unwrap();
        let record = ConstraintExtractor::default().extract_one(&g).unwrap();
        assert_eq!(record.structure_constraint, "(.)");

        let mut g = annotated_path("GGAACC", &[1.0; 6]);
        g.add_basepair(0, 5).unwrap();
        g.add_basepair(1, 4).unwrap();
        let record = ConstraintExtractor::default().extract_one(&g).unwrap();
        assert_eq!(record.structure_constraint, "((..))");
    }

    #[test]
    fn test_unpaired_pass_overwrites_basepair_marks() {
        // A position holding a bracket that also falls inside an unpaired
        // region must end up as '.': the unpaired pass runs second and wins.
        let mut g = annotated_path("GAC", &[1.0; 3]);
        g.add_basepair(0, 2).unwrap();
        let important = vec![true; 3];
        let mut chars = vec![STRUCTURE_PAD; 3];
        ConstraintExtractor::mark_basepairs(&g, &important, &mut chars);
        assert_eq!(chars, vec!['(', STRUCTURE_PAD, ')']);
        ConstraintExtractor::mark_unpaired(&[0, 1], &mut chars);
        assert_eq!(chars, vec!['.', '.', ')']);
    }

    #[test]
    fn test_unpaired_component_size_filter() {
        // Unpaired run {2,3} of size 2 is dropped when the minimum is 3.
        let mut g = annotated_path("GGAACC", &[1.0; 6]);
        g.add_basepair(0, 5).unwrap();
        g.add_basepair(1, 4).unwrap();
        let extractor = ConstraintExtractor {
            min_size_connected_component_unpaired_structure_constraint: 3,
            ..ConstraintExtractor::default()
        };
        let record = extractor.extract_one(&g).unwrap();
        assert_eq!(record.structure_constraint, "((AA))");
    }

    #[test]
    fn test_extract_preserves_order_and_propagates_errors() {
        let good = annotated_path("GC", &[1.0, 1.0]);
        let empty = StructureGraph::new("empty", vec![]);
        let extractor = ConstraintExtractor::default();
        let results: Vec<_> = extractor.extract(vec![good, empty]).collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().source_id, "t");
        assert!(matches!(results[1], Err(SynthError::ZeroNodeGraph)));
    }

    #[test]
    fn test_extract_is_lazy() {
        let graphs: Vec<StructureGraph> =
            (0..3).map(|_| annotated_path("GC", &[1.0, 1.0])).collect();
        let extractor = ConstraintExtractor::default();
        let mut iter = extractor.extract(graphs);
        // Pulling one item must not require the rest.
        assert!(iter.next().unwrap().is_ok());
    }
}
