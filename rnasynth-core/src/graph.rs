//! Secondary-structure graphs.
//!
//! A [`StructureGraph`] models one folded RNA molecule: nodes are sequence
//! positions with contiguous ids `0..N-1`, connected by backbone edges
//! (sequential adjacency) and basepair edges (each node in at most one
//! basepair). Nodes carry a nucleotide label and, once a classifier has
//! annotated the graph, a signed importance score.

use crate::types::{Base, SynthError};

/// Data attached to one graph node (one sequence position).
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Nucleotide at this position.
    pub label: Base,
    /// Signed importance score, set by classifier annotation.
    pub importance: Option<f64>,
}

/// One RNA secondary structure as a graph over sequence positions.
#[derive(Debug, Clone)]
pub struct StructureGraph {
    id: String,
    nodes: Vec<NodeData>,
    backbone: Vec<(usize, usize)>,
    basepairs: Vec<(usize, usize)>,
    /// Partner lookup; `pair_of[i] == Some(j)` iff `(i, j)` is a basepair.
    pair_of: Vec<Option<usize>>,
}

impl StructureGraph {
    /// Creates a graph with the canonical backbone (`i` adjacent to `i+1`)
    /// and no basepairs.
    pub fn new(id: impl Into<String>, labels: Vec<Base>) -> Self {
        let n = labels.len();
        let backbone = (1..n).map(|i| (i - 1, i)).collect();
        Self {
            id: id.into(),
            nodes: labels
                .into_iter()
                .map(|label| NodeData {
                    label,
                    importance: None,
                })
                .collect(),
            backbone,
            basepairs: Vec::new(),
            pair_of: vec![None; n],
        }
    }

    /// Builds a graph from externally supplied parts, validating the
    /// structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::GraphMalformed`] when node ids are not 0-based
    /// contiguous integers, an edge endpoint is out of range, or a node
    /// appears in more than one basepair.
    pub fn from_parts(
        id: impl Into<String>,
        nodes: Vec<(usize, NodeData)>,
        backbone: Vec<(usize, usize)>,
        basepairs: Vec<(usize, usize)>,
    ) -> Result<Self, SynthError> {
        let n = nodes.len();
        let mut slots: Vec<Option<NodeData>> = vec![None; n];
        for (idx, data) in nodes {
            let slot = slots.get_mut(idx).ok_or_else(|| {
                SynthError::GraphMalformed(format!(
                    "node id {idx} outside contiguous range 0..{n}"
                ))
            })?;
            if slot.is_some() {
                return Err(SynthError::GraphMalformed(format!(
                    "duplicate node id {idx}"
                )));
            }
            *slot = Some(data);
        }
        let nodes = slots
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| {
                slot.ok_or_else(|| SynthError::GraphMalformed(format!("missing node id {idx}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut graph = Self {
            id: id.into(),
            nodes,
            backbone: Vec::new(),
            basepairs: Vec::new(),
            pair_of: vec![None; n],
        };
        for (u, v) in backbone {
            graph.check_endpoint(u)?;
            graph.check_endpoint(v)?;
            graph.backbone.push((u, v));
        }
        for (i, j) in basepairs {
            graph.add_basepair(i, j)?;
        }
        Ok(graph)
    }

    fn check_endpoint(&self, idx: usize) -> Result<(), SynthError> {
        if idx >= self.nodes.len() {
            return Err(SynthError::GraphMalformed(format!(
                "edge endpoint {idx} outside graph of {} nodes",
                self.nodes.len()
            )));
        }
        Ok(())
    }

    /// Adds an undirected basepair edge `(i, j)`.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::GraphMalformed`] for out-of-range endpoints,
    /// self-pairs, or endpoints already engaged in another basepair.
    pub fn add_basepair(&mut self, i: usize, j: usize) -> Result<(), SynthError> {
        self.check_endpoint(i)?;
        self.check_endpoint(j)?;
        if i == j {
            return Err(SynthError::GraphMalformed(format!(
                "node {i} cannot pair with itself"
            )));
        }
        if self.pair_of[i].is_some() || self.pair_of[j].is_some() {
            return Err(SynthError::GraphMalformed(format!(
                "node {} already participates in a basepair",
                if self.pair_of[i].is_some() { i } else { j }
            )));
        }
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        self.basepairs.push((lo, hi));
        self.pair_of[i] = Some(j);
        self.pair_of[j] = Some(i);
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn label(&self, idx: usize) -> Base {
        self.nodes[idx].label
    }

    pub fn importance(&self, idx: usize) -> Option<f64> {
        self.nodes[idx].importance
    }

    /// Importance of a node, or [`SynthError::GraphMalformed`] when the
    /// graph has not been annotated.
    pub fn importance_or_err(&self, idx: usize) -> Result<f64, SynthError> {
        self.nodes[idx].importance.ok_or_else(|| {
            SynthError::GraphMalformed(format!("node {idx} has no importance annotation"))
        })
    }

    pub fn set_importance(&mut self, idx: usize, value: f64) {
        self.nodes[idx].importance = Some(value);
    }

    /// All basepair edges, each with the smaller node id first.
    pub fn basepairs(&self) -> &[(usize, usize)] {
        &self.basepairs
    }

    /// Basepair partner of a node, if any.
    pub fn partner(&self, idx: usize) -> Option<usize> {
        self.pair_of[idx]
    }

    /// Nucleotide string in node-id order.
    pub fn sequence(&self) -> String {
        self.nodes.iter().map(|n| n.label.to_char()).collect()
    }

    /// Neighbors over backbone and basepair edges.
    pub fn neighbors(&self, idx: usize) -> Vec<usize> {
        let mut out = Vec::with_capacity(3);
        for &(u, v) in &self.backbone {
            if u == idx {
                out.push(v);
            } else if v == idx {
                out.push(u);
            }
        }
        if let Some(j) = self.pair_of[idx] {
            out.push(j);
        }
        out
    }

    /// Connected components of the subgraph induced by nodes satisfying
    /// `keep`, over backbone and basepair edges.
    ///
    /// This is the pure replacement for copy-and-cut component analysis:
    /// the graph itself is never mutated, removal is expressed as a
    /// predicate. Component node lists are sorted; components are ordered
    /// by their smallest node.
    pub fn components_after_removal<F>(&self, keep: F) -> Vec<Vec<usize>>
    where
        F: Fn(usize) -> bool,
    {
        let n = self.nodes.len();
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
        for &(u, v) in &self.backbone {
            adjacency[u].push(v);
            adjacency[v].push(u);
        }
        for &(i, j) in &self.basepairs {
            adjacency[i].push(j);
            adjacency[j].push(i);
        }

        let mut visited = vec![false; n];
        let mut components = Vec::new();
        for start in 0..n {
            if visited[start] || !keep(start) {
                continue;
            }
            let mut component = Vec::new();
            let mut stack = vec![start];
            visited[start] = true;
            while let Some(node) = stack.pop() {
                component.push(node);
                for &next in &adjacency[node] {
                    if !visited[next] && keep(next) {
                        visited[next] = true;
                        stack.push(next);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    /// Extracts the induced subgraph on `nodes`, re-indexed to contiguous
    /// ids in ascending original-position order. Edges with an endpoint
    /// outside `nodes` are dropped.
    pub fn subgraph(&self, nodes: &[usize], id: impl Into<String>) -> Self {
        let mut sorted: Vec<usize> = nodes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let mut remap = vec![usize::MAX; self.nodes.len()];
        for (new_idx, &old_idx) in sorted.iter().enumerate() {
            remap[old_idx] = new_idx;
        }
        let n = sorted.len();
        let mut graph = Self {
            id: id.into(),
            nodes: sorted.iter().map(|&i| self.nodes[i].clone()).collect(),
            backbone: Vec::new(),
            basepairs: Vec::new(),
            pair_of: vec![None; n],
        };
        for &(u, v) in &self.backbone {
            if remap[u] != usize::MAX && remap[v] != usize::MAX {
                graph.backbone.push((remap[u], remap[v]));
            }
        }
        for &(i, j) in &self.basepairs {
            if remap[i] != usize::MAX && remap[j] != usize::MAX {
                // Cannot fail: the source graph already enforced uniqueness.
                let _ = graph.add_basepair(remap[i], remap[j]);
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_rna;

    fn path_graph(seq: &str) -> StructureGraph {
        StructureGraph::new("g", parse_rna(seq).unwrap())
    }

    #[test]
    fn test_new_builds_backbone() {
        let g = path_graph("ACGU");
        assert_eq!(g.len(), 4);
        assert_eq!(g.neighbors(0), vec![1]);
        assert_eq!(g.neighbors(2), vec![1, 3]);
        assert_eq!(g.sequence(), "ACGU");
    }

    #[test]
    fn test_basepair_partner_tracking() {
        let mut g = path_graph("GCGC");
        g.add_basepair(0, 3).unwrap();
        assert_eq!(g.partner(0), Some(3));
        assert_eq!(g.partner(3), Some(0));
        assert_eq!(g.basepairs(), &[(0, 3)]);
        assert!(g.neighbors(0).contains(&3));
    }

    #[test]
    fn test_basepair_rejects_double_pairing() {
        let mut g = path_graph("GCGC");
        g.add_basepair(0, 3).unwrap();
        assert!(matches!(
            g.add_basepair(0, 2),
            Err(SynthError::GraphMalformed(_))
        ));
    }

    #[test]
    fn test_basepair_rejects_self_pair() {
        let mut g = path_graph("GCGC");
        assert!(g.add_basepair(1, 1).is_err());
    }

    #[test]
    fn test_from_parts_roundtrip() {
        let nodes = vec![
            (
                0,
                NodeData {
                    label: Base::G,
                    importance: Some(1.0),
                },
            ),
            (
                1,
                NodeData {
                    label: Base::C,
                    importance: Some(-1.0),
                },
            ),
        ];
        let g = StructureGraph::from_parts("x", nodes, vec![(0, 1)], vec![(0, 1)]).unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.importance(1), Some(-1.0));
    }

    #[test]
    fn test_from_parts_rejects_gap_in_ids() {
        let nodes = vec![
            (
                0,
                NodeData {
                    label: Base::A,
                    importance: None,
                },
            ),
            (
                2,
                NodeData {
                    label: Base::A,
                    importance: None,
                },
            ),
        ];
        let result = StructureGraph::from_parts("x", nodes, vec![], vec![]);
        assert!(matches!(result, Err(SynthError::GraphMalformed(_))));
    }

    #[test]
    fn test_from_parts_rejects_duplicate_id() {
        let node = |label| NodeData {
            label,
            importance: None,
        };
        let nodes = vec![(0, node(Base::A)), (0, node(Base::C))];
        assert!(StructureGraph::from_parts("x", nodes, vec![], vec![]).is_err());
    }

    #[test]
    fn test_importance_or_err_on_unannotated_node() {
        let g = path_graph("AC");
        assert!(matches!(
            g.importance_or_err(0),
            Err(SynthError::GraphMalformed(_))
        ));
    }

    #[test]
    fn test_components_after_removal_split_path() {
        // Removing the middle node of a 5-path leaves {0,1} and {3,4}.
        let g = path_graph("AAAAA");
        let comps = g.components_after_removal(|i| i != 2);
        assert_eq!(comps, vec![vec![0, 1], vec![3, 4]]);
    }

    #[test]
    fn test_components_bridge_via_basepair() {
        // A basepair edge reconnects positions separated on the backbone.
        let mut g = path_graph("GAAAC");
        g.add_basepair(0, 4).unwrap();
        let comps = g.components_after_removal(|i| i != 2);
        assert_eq!(comps, vec![vec![0, 1, 3, 4]]);
    }

    #[test]
    fn test_subgraph_reindexes() {
        let mut g = path_graph("GACGU");
        g.add_basepair(1, 4).unwrap();
        let sub = g.subgraph(&[1, 2, 4], "sub");
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.sequence(), "ACU");
        // Old pair (1,4) becomes (0,2); backbone edge (3,4) is dropped.
        assert_eq!(sub.basepairs(), &[(0, 2)]);
    }
}
