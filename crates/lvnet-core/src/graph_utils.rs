use crate::{NodeId, PhaseCode, Segment};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashMap;

/// Canonical key of an undirected node pair: `(min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EdgeKey {
    low: NodeId,
    high: NodeId,
}

impl EdgeKey {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            EdgeKey { low: a, high: b }
        } else {
            EdgeKey { low: b, high: a }
        }
    }

    pub fn low(&self) -> NodeId {
        self.low
    }

    pub fn high(&self) -> NodeId {
        self.high
    }
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.low, self.high)
    }
}

/// A parallel segment whose phase differs from the one kept for its edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseConflict {
    pub edge: EdgeKey,
    pub kept_code: i64,
    pub discarded_code: i64,
}

/// Summary statistics produced by `graph stats`.
#[derive(Debug, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub connected_components: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    /// Independent cycles, `M - N + C`
    pub cyclomatic_number: usize,
}

/// Simple undirected graph of a circuit, built from its segment table.
///
/// Parallel segments collapse to one edge that keeps the first-seen phase
/// code. Node and neighbor iteration order depend only on segment order, so
/// every traversal over the graph is reproducible.
#[derive(Debug, Clone)]
pub struct CircuitGraph {
    graph: UnGraph<NodeId, EdgeKey>,
    index: HashMap<NodeId, NodeIndex>,
    phase_by_edge: HashMap<EdgeKey, i64>,
    conflicts: Vec<PhaseConflict>,
}

impl CircuitGraph {
    pub fn from_segments(segments: &[Segment]) -> Self {
        let mut builder = CircuitGraph {
            graph: UnGraph::default(),
            index: HashMap::new(),
            phase_by_edge: HashMap::new(),
            conflicts: Vec::new(),
        };
        for segment in segments {
            // self-loops are rejected before the graph is built
            if segment.is_self_loop() {
                continue;
            }
            builder.insert(segment.key(), segment.phase_code);
        }
        builder
    }

    fn insert(&mut self, key: EdgeKey, phase_code: i64) {
        if let Some(&kept_code) = self.phase_by_edge.get(&key) {
            if kept_code != phase_code {
                self.conflicts.push(PhaseConflict {
                    edge: key,
                    kept_code,
                    discarded_code: phase_code,
                });
            }
            return;
        }
        let low = self.node_index_or_insert(key.low);
        let high = self.node_index_or_insert(key.high);
        self.graph.add_edge(low, high, key);
        self.phase_by_edge.insert(key, phase_code);
    }

    fn node_index_or_insert(&mut self, node: NodeId) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }
        let idx = self.graph.add_node(node);
        self.index.insert(node, idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.index.contains_key(&node)
    }

    /// Nodes in first-seen order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices().map(move |idx| self.graph[idx])
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.graph.edge_references().map(|edge| *edge.weight())
    }

    /// Neighbors of `node`, ordered by the first segment that connects them.
    ///
    /// petgraph walks adjacency lists newest-first; sorting by edge index
    /// restores segment-table order.
    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        let Some(&idx) = self.index.get(&node) else {
            return Vec::new();
        };
        let mut incident: Vec<(usize, EdgeKey)> = self
            .graph
            .edges(idx)
            .map(|edge| (edge.id().index(), *edge.weight()))
            .collect();
        incident.sort_by_key(|&(edge_index, _)| edge_index);
        incident
            .into_iter()
            .map(|(_, key)| if key.low == node { key.high } else { key.low })
            .collect()
    }

    /// Raw phase code retained for an edge, if the edge exists.
    pub fn phase_code(&self, edge: EdgeKey) -> Option<i64> {
        self.phase_by_edge.get(&edge).copied()
    }

    /// Resolved phase of an edge; `None` when absent or out of range.
    pub fn phase(&self, edge: EdgeKey) -> Option<PhaseCode> {
        self.phase_code(edge).and_then(PhaseCode::from_code)
    }

    pub fn phase_conflicts(&self) -> &[PhaseConflict] {
        &self.conflicts
    }

    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }

    pub fn stats(&self) -> GraphStats {
        let node_count = self.node_count();
        let edge_count = self.edge_count();
        let degrees: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| self.graph.neighbors(idx).count())
            .collect();
        let min_degree = degrees.iter().copied().min().unwrap_or(0);
        let max_degree = degrees.iter().copied().max().unwrap_or(0);
        let avg_degree = if node_count == 0 {
            0.0
        } else {
            degrees.iter().sum::<usize>() as f64 / node_count as f64
        };
        let connected_components = self.component_count();
        GraphStats {
            node_count,
            edge_count,
            connected_components,
            min_degree,
            avg_degree,
            max_degree,
            cyclomatic_number: (edge_count + connected_components).saturating_sub(node_count),
        }
    }

    /// Export the circuit to a DOT string (Graphviz), labelling edges with their phase.
    pub fn to_dot(&self) -> String {
        let mut buffer = String::new();
        buffer.push_str("graph lvnet_circuit {\n");
        for idx in self.graph.node_indices() {
            buffer.push_str(&format!(
                "  n{} [label=\"{}\"];\n",
                idx.index(),
                self.graph[idx]
            ));
        }
        for edge in self.graph.edge_references() {
            let label = match self.phase(*edge.weight()) {
                Some(phase) => phase.name().to_string(),
                None => format!("?{}", self.phase_code(*edge.weight()).unwrap_or_default()),
            };
            buffer.push_str(&format!(
                "  n{} -- n{} [label=\"{}\"];\n",
                edge.source().index(),
                edge.target().index(),
                label
            ));
        }
        buffer.push('}');
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(a: i64, b: i64, phase: i64) -> Segment {
        Segment::new(NodeId::new(a), NodeId::new(b), phase)
    }

    #[test]
    fn parallel_segments_collapse_first_phase_wins() {
        let graph = CircuitGraph::from_segments(&[seg(1, 2, 1), seg(2, 1, 3), seg(2, 3, 7)]);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        let key = EdgeKey::new(NodeId::new(2), NodeId::new(1));
        assert_eq!(graph.phase(key), Some(PhaseCode::A));
        assert_eq!(
            graph.phase_conflicts(),
            &[PhaseConflict {
                edge: key,
                kept_code: 1,
                discarded_code: 3,
            }]
        );
    }

    #[test]
    fn neighbors_follow_segment_order() {
        let graph = CircuitGraph::from_segments(&[seg(1, 2, 7), seg(2, 3, 7), seg(4, 2, 7)]);
        assert_eq!(
            graph.neighbors(NodeId::new(2)),
            vec![NodeId::new(1), NodeId::new(3), NodeId::new(4)]
        );
        assert!(graph.neighbors(NodeId::new(9)).is_empty());
    }

    #[test]
    fn out_of_range_phase_resolves_to_none() {
        let graph = CircuitGraph::from_segments(&[seg(1, 2, 0)]);
        let key = EdgeKey::new(NodeId::new(1), NodeId::new(2));
        assert_eq!(graph.phase_code(key), Some(0));
        assert_eq!(graph.phase(key), None);
    }

    #[test]
    fn stats_count_components_and_cycles() {
        let graph = CircuitGraph::from_segments(&[
            seg(1, 2, 7),
            seg(2, 3, 7),
            seg(3, 1, 7),
            seg(10, 11, 1),
        ]);
        let stats = graph.stats();
        assert_eq!(stats.node_count, 5);
        assert_eq!(stats.edge_count, 4);
        assert_eq!(stats.connected_components, 2);
        assert_eq!(stats.cyclomatic_number, 1);
        assert_eq!(stats.min_degree, 1);
        assert_eq!(stats.max_degree, 2);
    }

    #[test]
    fn self_loops_are_not_inserted() {
        let graph = CircuitGraph::from_segments(&[seg(4, 4, 1), seg(4, 5, 1)]);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.neighbors(NodeId::new(4)), vec![NodeId::new(5)]);
    }

    #[test]
    fn dot_export_labels_phases() {
        let graph = CircuitGraph::from_segments(&[seg(1, 2, 4)]);
        let dot = graph.to_dot();
        assert!(dot.starts_with("graph lvnet_circuit {"));
        assert!(dot.contains("[label=\"AB\"]"));
    }
}
