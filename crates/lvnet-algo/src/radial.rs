//! Phase verification for circuits declared radial.
//!
//! The circuit is rooted at the slack node with a breadth-first traversal.
//! Every non-root node gets one parent and one parent edge, and phasing is
//! checked along each parent chain:
//!
//! 1. **Segment to segment**: for every node at depth ≥ 2, the edge from its
//!    grandparent must be allowed to feed the edge to it.
//! 2. **Segment to user**: every user at a node must be servable by the
//!    node's parent edge. Users at the root have no feeding edge; behind a
//!    single-phase transformer they must be on A, B or AB.

use std::collections::{HashMap, VecDeque};

use lvnet_core::{
    CircuitGraph, EdgeKey, NodeId, PhaseCode, PhaseCompatibility, TransformerKind, User,
};

use crate::PhasingViolation;

/// BFS spanning tree of the circuit graph.
#[derive(Debug, Clone)]
pub struct SpanningTree {
    root: NodeId,
    order: Vec<NodeId>,
    parent: HashMap<NodeId, NodeId>,
    parent_edge: HashMap<NodeId, EdgeKey>,
}

impl SpanningTree {
    /// Roots the tree at `slack`, or at the first graph node when the slack
    /// node is not in the graph. Returns `None` for an empty graph.
    ///
    /// Ties among equal-distance nodes follow the graph's neighbor order.
    pub fn bfs(graph: &CircuitGraph, slack: NodeId) -> Option<Self> {
        let root = if graph.contains(slack) {
            slack
        } else {
            graph.nodes().next()?
        };

        let mut tree = SpanningTree {
            root,
            order: vec![root],
            parent: HashMap::new(),
            parent_edge: HashMap::new(),
        };
        let mut queue = VecDeque::from([root]);
        while let Some(u) = queue.pop_front() {
            for v in graph.neighbors(u) {
                if v == root || tree.parent.contains_key(&v) {
                    continue;
                }
                tree.parent.insert(v, u);
                tree.parent_edge.insert(v, EdgeKey::new(u, v));
                tree.order.push(v);
                queue.push_back(v);
            }
        }
        Some(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent.get(&node).copied()
    }

    /// Edge connecting `node` to its parent; the feeding edge of the node.
    pub fn parent_edge(&self, node: NodeId) -> Option<EdgeKey> {
        self.parent_edge.get(&node).copied()
    }

    /// Nodes in discovery order, root first.
    pub fn discovery_order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Collects every grandparent-edge → parent-edge pair whose phases are
/// missing or incompatible, in discovery order.
pub fn check_segment_phasing(
    graph: &CircuitGraph,
    tree: &SpanningTree,
    compat: &PhaseCompatibility,
) -> Vec<PhasingViolation> {
    let mut violations = Vec::new();
    for &node in tree.discovery_order() {
        let (Some(parent), Some(downstream)) = (tree.parent(node), tree.parent_edge(node)) else {
            continue;
        };
        let Some(upstream) = tree.parent_edge(parent) else {
            continue;
        };
        let compatible = match (graph.phase(upstream), graph.phase(downstream)) {
            (Some(up), Some(down)) => compat.segment_feeds_segment(up, down),
            _ => false,
        };
        if !compatible {
            violations.push(PhasingViolation {
                upstream,
                downstream,
            });
        }
    }
    violations
}

/// Nodes hosting at least one user its feeding edge cannot serve.
///
/// Each node is reported once, in order of first appearance in the user
/// table. Nodes whose feeding edge has no resolvable phase are skipped.
pub fn check_user_phasing(
    graph: &CircuitGraph,
    tree: &SpanningTree,
    users: &[User],
    kind: TransformerKind,
    compat: &PhaseCompatibility,
) -> Vec<NodeId> {
    let mut bad_nodes = Vec::new();
    for (node, phases) in group_users_by_node(users) {
        let feeding = if node == tree.root() {
            None
        } else {
            tree.parent_edge(node)
        };
        let Some(edge) = feeding else {
            let root_ok = node != tree.root()
                || kind == TransformerKind::ThreePhase
                || phases
                    .iter()
                    .all(|&code| PhaseCode::code_admissible_for(code, TransformerKind::SinglePhase));
            if !root_ok {
                bad_nodes.push(node);
            }
            continue;
        };
        let Some(segment_phase) = graph.phase(edge) else {
            continue;
        };
        if phases
            .iter()
            .any(|&code| !compat.segment_feeds_user_code(segment_phase, code))
        {
            bad_nodes.push(node);
        }
    }
    bad_nodes
}

/// Groups user phase codes by node, keeping nodes in first-appearance order.
pub fn group_users_by_node(users: &[User]) -> Vec<(NodeId, Vec<i64>)> {
    let mut slots: HashMap<NodeId, usize> = HashMap::new();
    let mut groups: Vec<(NodeId, Vec<i64>)> = Vec::new();
    for user in users {
        let slot = *slots.entry(user.node).or_insert_with(|| {
            groups.push((user.node, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(user.phase_code);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvnet_core::Segment;

    fn n(id: i64) -> NodeId {
        NodeId::new(id)
    }

    fn graph(edges: &[(i64, i64, i64)]) -> CircuitGraph {
        let segments: Vec<Segment> = edges
            .iter()
            .map(|&(a, b, phase)| Segment::new(n(a), n(b), phase))
            .collect();
        CircuitGraph::from_segments(&segments)
    }

    #[test]
    fn bfs_builds_tree_over_all_reachable_nodes() {
        let g = graph(&[(1, 2, 7), (2, 3, 7), (1, 4, 7), (4, 5, 7)]);
        let tree = SpanningTree::bfs(&g, n(1)).unwrap();
        assert_eq!(tree.root(), n(1));
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.parent(n(1)), None);
        assert_eq!(tree.parent(n(3)), Some(n(2)));
        assert_eq!(tree.parent(n(5)), Some(n(4)));
        assert_eq!(tree.parent_edge(n(3)), Some(EdgeKey::new(n(2), n(3))));
    }

    #[test]
    fn bfs_falls_back_to_first_node_when_slack_missing() {
        let g = graph(&[(5, 6, 7)]);
        let tree = SpanningTree::bfs(&g, n(99)).unwrap();
        assert_eq!(tree.root(), n(5));
        assert!(SpanningTree::bfs(&graph(&[]), n(1)).is_none());
    }

    #[test]
    fn incompatible_consecutive_segments_are_reported() {
        let g = graph(&[(1, 2, 1), (2, 3, 3)]);
        let tree = SpanningTree::bfs(&g, n(1)).unwrap();
        let violations = check_segment_phasing(&g, &tree, &PhaseCompatibility::default());
        assert_eq!(
            violations,
            vec![PhasingViolation {
                upstream: EdgeKey::new(n(1), n(2)),
                downstream: EdgeKey::new(n(2), n(3)),
            }]
        );
    }

    #[test]
    fn missing_phase_counts_as_incompatible() {
        let g = graph(&[(1, 2, 7), (2, 3, 0)]);
        let tree = SpanningTree::bfs(&g, n(1)).unwrap();
        let violations = check_segment_phasing(&g, &tree, &PhaseCompatibility::default());
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn every_violation_is_collected() {
        let g = graph(&[(1, 2, 1), (2, 3, 2), (2, 4, 3), (4, 5, 1)]);
        let tree = SpanningTree::bfs(&g, n(1)).unwrap();
        let violations = check_segment_phasing(&g, &tree, &PhaseCompatibility::default());
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn users_checked_against_feeding_edge() {
        let g = graph(&[(1, 2, 7), (2, 3, 1)]);
        let tree = SpanningTree::bfs(&g, n(1)).unwrap();
        let users = vec![
            User::new(n(3), 1),
            User::new(n(3), 2),
            User::new(n(2), 3),
            User::new(n(3), 2),
        ];
        let bad = check_user_phasing(
            &g,
            &tree,
            &users,
            TransformerKind::ThreePhase,
            &PhaseCompatibility::default(),
        );
        assert_eq!(bad, vec![n(3)]);
    }

    #[test]
    fn root_users_behind_single_phase_transformer() {
        let g = graph(&[(1, 2, 1)]);
        let tree = SpanningTree::bfs(&g, n(1)).unwrap();
        let compat = PhaseCompatibility::default();
        let users = vec![User::new(n(1), 4), User::new(n(1), 3)];
        assert_eq!(
            check_user_phasing(&g, &tree, &users, TransformerKind::SinglePhase, &compat),
            vec![n(1)]
        );
        assert!(
            check_user_phasing(&g, &tree, &users, TransformerKind::ThreePhase, &compat).is_empty()
        );
    }

    #[test]
    fn grouping_keeps_first_appearance_order() {
        let users = vec![User::new(n(9), 1), User::new(n(2), 2), User::new(n(9), 3)];
        let groups = group_users_by_node(&users);
        assert_eq!(groups, vec![(n(9), vec![1, 3]), (n(2), vec![2])]);
    }
}
