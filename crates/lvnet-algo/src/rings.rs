//! Biconnected decomposition of the circuit graph.
//!
//! Uses the Hopcroft–Tarjan edge-stack algorithm with an explicit DFS stack
//! so long feeders do not exhaust the call stack. A component with a single
//! edge is a bridge; a component with three or more nodes is a ring.

use std::collections::{HashMap, HashSet};

use lvnet_core::{CircuitGraph, EdgeKey, NodeId};

/// Maximal biconnected subgraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiconnectedComponent {
    nodes: Vec<NodeId>,
    members: HashSet<NodeId>,
    edges: Vec<EdgeKey>,
}

impl BiconnectedComponent {
    /// `position` maps every graph node to its first-seen index; the cost is
    /// proportional to the component, not to the graph.
    fn from_edges(position: &HashMap<NodeId, usize>, mut edges: Vec<EdgeKey>) -> Self {
        edges.sort();
        let members: HashSet<NodeId> = edges.iter().flat_map(|e| [e.low(), e.high()]).collect();
        let mut nodes: Vec<NodeId> = members.iter().copied().collect();
        nodes.sort_by_key(|node| position.get(node).copied().unwrap_or(usize::MAX));
        Self {
            nodes,
            members,
            edges,
        }
    }

    /// Member nodes in graph order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Member edges, sorted.
    pub fn edges(&self) -> &[EdgeKey] {
        &self.edges
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    pub fn is_bridge(&self) -> bool {
        self.edges.len() == 1
    }

    pub fn is_ring(&self) -> bool {
        self.nodes.len() >= 3
    }

    /// Neighbors of `node` inside this component, in graph neighbor order.
    pub fn neighbors(&self, graph: &CircuitGraph, node: NodeId) -> Vec<NodeId> {
        graph
            .neighbors(node)
            .into_iter()
            .filter(|n| self.members.contains(n))
            .collect()
    }
}

struct Frame {
    node: NodeId,
    parent: Option<NodeId>,
    neighbors: Vec<NodeId>,
    next: usize,
}

impl Frame {
    fn new(graph: &CircuitGraph, node: NodeId, parent: Option<NodeId>) -> Self {
        Self {
            node,
            parent,
            neighbors: graph.neighbors(node),
            next: 0,
        }
    }
}

/// Splits the graph into biconnected components, in the order the DFS
/// completes them.
pub fn biconnected_components(graph: &CircuitGraph) -> Vec<BiconnectedComponent> {
    let mut discovery: HashMap<NodeId, usize> = HashMap::new();
    let mut low: HashMap<NodeId, usize> = HashMap::new();
    let mut edge_stack: Vec<EdgeKey> = Vec::new();
    let mut components = Vec::new();
    let mut clock = 0usize;
    let position: HashMap<NodeId, usize> = graph
        .nodes()
        .enumerate()
        .map(|(i, node)| (node, i))
        .collect();

    for start in graph.nodes() {
        if discovery.contains_key(&start) {
            continue;
        }
        discovery.insert(start, clock);
        low.insert(start, clock);
        clock += 1;
        let mut stack = vec![Frame::new(graph, start, None)];

        while let Some(frame) = stack.last_mut() {
            let u = frame.node;
            if frame.next < frame.neighbors.len() {
                let w = frame.neighbors[frame.next];
                frame.next += 1;
                let parent = frame.parent;
                match discovery.get(&w).copied() {
                    None => {
                        edge_stack.push(EdgeKey::new(u, w));
                        discovery.insert(w, clock);
                        low.insert(w, clock);
                        clock += 1;
                        stack.push(Frame::new(graph, w, Some(u)));
                    }
                    Some(disc_w) => {
                        if Some(w) != parent && disc_w < discovery[&u] {
                            edge_stack.push(EdgeKey::new(u, w));
                            let low_u = low[&u].min(disc_w);
                            low.insert(u, low_u);
                        }
                    }
                }
                continue;
            }

            let finished = stack.pop().map(|f| (f.node, f.parent));
            let Some((u, Some(p))) = finished else {
                continue;
            };
            let low_u = low[&u];
            if low_u < low[&p] {
                low.insert(p, low_u);
            }
            if low_u >= discovery[&p] {
                let closing = EdgeKey::new(p, u);
                let mut edges = Vec::new();
                while let Some(edge) = edge_stack.pop() {
                    edges.push(edge);
                    if edge == closing {
                        break;
                    }
                }
                components.push(BiconnectedComponent::from_edges(&position, edges));
            }
        }
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvnet_core::Segment;

    fn graph(edges: &[(i64, i64)]) -> CircuitGraph {
        let segments: Vec<Segment> = edges
            .iter()
            .map(|&(a, b)| Segment::new(NodeId::new(a), NodeId::new(b), 7))
            .collect();
        CircuitGraph::from_segments(&segments)
    }

    fn node_sets(components: &[BiconnectedComponent]) -> Vec<Vec<i64>> {
        let mut sets: Vec<Vec<i64>> = components
            .iter()
            .map(|c| {
                let mut ids: Vec<i64> = c.nodes().iter().map(|n| n.value()).collect();
                ids.sort();
                ids
            })
            .collect();
        sets.sort();
        sets
    }

    #[test]
    fn tree_decomposes_into_bridges() {
        let components = biconnected_components(&graph(&[(1, 2), (2, 3), (2, 4)]));
        assert_eq!(components.len(), 3);
        assert!(components.iter().all(BiconnectedComponent::is_bridge));
        assert!(!components.iter().any(BiconnectedComponent::is_ring));
    }

    #[test]
    fn ring_with_tail() {
        // 1-2-3-1 ring, 3-4 bridge
        let components = biconnected_components(&graph(&[(1, 2), (2, 3), (3, 1), (3, 4)]));
        assert_eq!(node_sets(&components), vec![vec![1, 2, 3], vec![3, 4]]);
        let ring = components.iter().find(|c| c.is_ring()).unwrap();
        assert_eq!(ring.edges().len(), 3);
        assert!(ring.contains(NodeId::new(1)));
        assert!(!ring.contains(NodeId::new(4)));
    }

    #[test]
    fn two_rings_sharing_a_cut_vertex() {
        // bow tie around node 3
        let components = biconnected_components(&graph(&[
            (1, 2),
            (2, 3),
            (3, 1),
            (3, 4),
            (4, 5),
            (5, 3),
        ]));
        assert_eq!(node_sets(&components), vec![vec![1, 2, 3], vec![3, 4, 5]]);
    }

    #[test]
    fn square_with_chord_is_one_block() {
        let components =
            biconnected_components(&graph(&[(1, 2), (2, 3), (3, 4), (4, 1), (1, 3)]));
        assert_eq!(node_sets(&components), vec![vec![1, 2, 3, 4]]);
        assert_eq!(components[0].edges().len(), 5);
    }

    #[test]
    fn every_edge_lands_in_exactly_one_component() {
        let g = graph(&[(1, 2), (2, 3), (3, 1), (3, 4), (4, 5), (5, 6), (6, 4), (6, 7)]);
        let components = biconnected_components(&g);
        let mut edges: Vec<EdgeKey> = components
            .iter()
            .flat_map(|c| c.edges().iter().copied())
            .collect();
        edges.sort();
        let mut expected: Vec<EdgeKey> = g.edges().collect();
        expected.sort();
        assert_eq!(edges, expected);
    }

    #[test]
    fn component_nodes_follow_graph_order() {
        let g = graph(&[(5, 9), (9, 2), (2, 5), (2, 7)]);
        let components = biconnected_components(&g);
        let ring = components.iter().find(|c| c.is_ring()).unwrap();
        assert_eq!(ring.nodes(), &[NodeId::new(5), NodeId::new(9), NodeId::new(2)]);
        let bridge = components.iter().find(|c| c.is_bridge()).unwrap();
        assert_eq!(bridge.nodes(), &[NodeId::new(2), NodeId::new(7)]);
    }

    #[test]
    fn long_tail_yields_one_bridge_per_segment() {
        let mut edges = vec![(1, 2), (2, 3), (3, 1)];
        edges.extend((3..20_003).map(|i| (i, i + 1)));
        let components = biconnected_components(&graph(&edges));
        assert_eq!(components.len(), 20_001);
        assert_eq!(components.iter().filter(|c| c.is_bridge()).count(), 20_000);
        let ring = components.iter().find(|c| c.is_ring()).unwrap();
        assert_eq!(ring.nodes().len(), 3);
        assert!(components
            .iter()
            .filter(|c| c.is_bridge())
            .all(|c| c.nodes().len() == 2));
    }

    #[test]
    fn component_neighbors_stay_inside() {
        let g = graph(&[(1, 2), (2, 3), (3, 1), (3, 4)]);
        let components = biconnected_components(&g);
        let ring = components.iter().find(|c| c.is_ring()).unwrap();
        let mut inside = ring.neighbors(&g, NodeId::new(3));
        inside.sort();
        assert_eq!(inside, vec![NodeId::new(1), NodeId::new(2)]);
    }
}
