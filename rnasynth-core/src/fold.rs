//! Built-in secondary-structure folding.
//!
//! A self-contained [`Folder`] based on base-pair maximization (Nussinov
//! dynamic programming with a minimum hairpin loop). It stands in for an
//! external thermodynamic folder: single mode returns the structure with
//! the most basepairs, multi mode returns a bounded set of alternatives
//! obtained by sweeping the loop-size parameter, restricted to an energy
//! window around the best structure.

use std::collections::HashSet;

use crate::graph::StructureGraph;
use crate::traits::{FoldMode, Folder};
use crate::types::{parse_rna, Base, SynthError};

/// Base-pair-maximization folder.
#[derive(Debug, Clone)]
pub struct NussinovFolder {
    /// Minimum number of unpaired positions enclosed by a hairpin.
    pub min_loop_length: usize,
    /// Upper bound on alternative structures per sequence in multi mode.
    pub max_structures_per_sequence: usize,
    /// Percentage window below the best pair count; alternatives scoring
    /// outside it are discarded.
    pub energy_range: f64,
    /// Emit one graph per connected structural component in multi mode.
    pub split_components: bool,
}

impl Default for NussinovFolder {
    fn default() -> Self {
        Self {
            min_loop_length: 3,
            max_structures_per_sequence: 3,
            energy_range: 35.0,
            split_components: false,
        }
    }
}

impl NussinovFolder {
    fn build_graph(
        &self,
        id: &str,
        bases: &[Base],
        pairs: &[(usize, usize)],
    ) -> Result<StructureGraph, SynthError> {
        let mut graph = StructureGraph::new(id, bases.to_vec());
        for &(i, j) in pairs {
            graph.add_basepair(i, j)?;
        }
        Ok(graph)
    }

    fn fold_multi(&self, id: &str, bases: &[Base]) -> Result<Vec<StructureGraph>, SynthError> {
        let best_pairs = nussinov_pairs(bases, self.min_loop_length);
        let best_count = best_pairs.len();
        let cutoff = (best_count as f64 * (1.0 - self.energy_range / 100.0)).ceil();

        let mut seen: HashSet<Vec<(usize, usize)>> = HashSet::new();
        let mut graphs = Vec::new();
        // Sweeping the loop parameter upward yields progressively coarser
        // structures, standing in for shape-abstracted alternatives.
        let mut loop_length = self.min_loop_length;
        while graphs.len() < self.max_structures_per_sequence {
            let pairs = if loop_length == self.min_loop_length {
                best_pairs.clone()
            } else {
                nussinov_pairs(bases, loop_length)
            };
            let within_window = pairs.len() as f64 >= cutoff;
            let novel = seen.insert(pairs.clone());
            if novel && within_window {
                graphs.push(self.build_graph(id, bases, &pairs)?);
            }
            if pairs.is_empty() {
                break;
            }
            loop_length += 1;
        }

        if self.split_components {
            let mut split = Vec::new();
            for graph in graphs {
                let components = graph.components_after_removal(|_| true);
                if components.len() <= 1 {
                    split.push(graph);
                } else {
                    for (k, component) in components.iter().enumerate() {
                        let sub_id = format!("{}/{k}", graph.id());
                        split.push(graph.subgraph(component, sub_id));
                    }
                }
            }
            graphs = split;
        }
        Ok(graphs)
    }
}

impl Folder for NussinovFolder {
    fn fold(&self, id: &str, seq: &str, mode: FoldMode) -> Result<Vec<StructureGraph>, SynthError> {
        let bases = parse_rna(seq)?;
        match mode {
            FoldMode::Single => {
                let pairs = nussinov_pairs(&bases, self.min_loop_length);
                Ok(vec![self.build_graph(id, &bases, &pairs)?])
            }
            FoldMode::Multi => self.fold_multi(id, &bases),
        }
    }
}

/// Maximum-cardinality nested pairing with a minimum hairpin loop.
///
/// Standard Nussinov recurrence; returns the traceback as a list of
/// `(i, j)` pairs with `i < j`.
pub fn nussinov_pairs(bases: &[Base], min_loop: usize) -> Vec<(usize, usize)> {
    let n = bases.len();
    if n == 0 {
        return Vec::new();
    }
    let mut table = vec![vec![0u32; n]; n];
    for span in (min_loop + 1)..n {
        for i in 0..(n - span) {
            let j = i + span;
            let mut best = table[i][j - 1];
            for k in i..=j - min_loop - 1 {
                if bases[k].can_pair(bases[j]) {
                    let left = if k > i { table[i][k - 1] } else { 0 };
                    let inner = if k + 1 <= j - 1 { table[k + 1][j - 1] } else { 0 };
                    best = best.max(left + inner + 1);
                }
            }
            table[i][j] = best;
        }
    }

    let mut pairs = Vec::new();
    let mut stack = vec![(0usize, n - 1)];
    while let Some((i, j)) = stack.pop() {
        if i >= j || j - i <= min_loop {
            continue;
        }
        if table[i][j] == table[i][j - 1] {
            stack.push((i, j - 1));
            continue;
        }
        for k in i..=j - min_loop - 1 {
            if bases[k].can_pair(bases[j]) {
                let left = if k > i { table[i][k - 1] } else { 0 };
                let inner = if k + 1 <= j - 1 { table[k + 1][j - 1] } else { 0 };
                if left + inner + 1 == table[i][j] {
                    pairs.push((k, j));
                    if k > i {
                        stack.push((i, k - 1));
                    }
                    if k + 1 <= j - 1 {
                        stack.push((k + 1, j - 1));
                    }
                    break;
                }
            }
        }
    }
    pairs.sort_unstable();
    pairs
}
