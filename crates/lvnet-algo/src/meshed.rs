//! Phase verification for circuits declared meshed.
//!
//! A meshed circuit has no canonical root, so phasing is checked locally
//! inside each biconnected component: at every node, each pair of incident
//! component edges is tested as an adjacent segment pair. Loads are then
//! checked for feasibility: at least one incident edge must be able to serve
//! them.

use std::collections::BTreeSet;

use lvnet_core::{CircuitGraph, EdgeKey, NodeId, PhaseCompatibility, User};
use tracing::debug;

use crate::rings::{biconnected_components, BiconnectedComponent};
use crate::PhasingViolation;

/// Biconnected structure of a meshed circuit.
#[derive(Debug, Clone)]
pub struct MeshAnalysis {
    components: Vec<BiconnectedComponent>,
}

impl MeshAnalysis {
    pub fn new(graph: &CircuitGraph) -> Self {
        let components = biconnected_components(graph);
        let analysis = Self { components };
        debug!(
            components = analysis.components.len(),
            rings = analysis.rings().count(),
            bridges = analysis.bridges().count(),
            ring_nodes = analysis.ring_nodes().len(),
            "biconnected decomposition"
        );
        analysis
    }

    pub fn components(&self) -> &[BiconnectedComponent] {
        &self.components
    }

    pub fn rings(&self) -> impl Iterator<Item = &BiconnectedComponent> {
        self.components.iter().filter(|c| c.is_ring())
    }

    /// Single-segment components: the radial tails of the mesh.
    pub fn bridges(&self) -> impl Iterator<Item = &BiconnectedComponent> {
        self.components.iter().filter(|c| c.is_bridge())
    }

    /// Nodes belonging to at least one ring.
    pub fn ring_nodes(&self) -> BTreeSet<NodeId> {
        self.rings().flat_map(|c| c.nodes().iter().copied()).collect()
    }
}

/// Tests every `(a, v) → (v, c)` pair inside each component, with `a` before
/// `c` in neighbor order. Pairs with an unresolved phase are skipped.
pub fn check_ring_phasing(
    graph: &CircuitGraph,
    analysis: &MeshAnalysis,
    compat: &PhaseCompatibility,
) -> Vec<PhasingViolation> {
    let mut violations = Vec::new();
    for component in analysis.components() {
        for &v in component.nodes() {
            let neighbors = component.neighbors(graph, v);
            for (i, &a) in neighbors.iter().enumerate() {
                for &c in &neighbors[i + 1..] {
                    let upstream = EdgeKey::new(a, v);
                    let downstream = EdgeKey::new(v, c);
                    let (Some(up), Some(down)) = (graph.phase(upstream), graph.phase(downstream))
                    else {
                        continue;
                    };
                    if !compat.segment_feeds_segment(up, down) {
                        violations.push(PhasingViolation {
                            upstream,
                            downstream,
                        });
                    }
                }
            }
        }
    }
    violations
}

/// Sorted, deduplicated nodes hosting a user that no incident edge can serve.
///
/// Every user node is checked, whether or not it sits on a ring.
pub fn check_load_feasibility(
    graph: &CircuitGraph,
    users: &[User],
    compat: &PhaseCompatibility,
) -> Vec<NodeId> {
    let mut bad_nodes = BTreeSet::new();
    for user in users {
        let feasible = graph.neighbors(user.node).into_iter().any(|neighbor| {
            graph
                .phase(EdgeKey::new(user.node, neighbor))
                .is_some_and(|phase| compat.segment_feeds_user_code(phase, user.phase_code))
        });
        if !feasible {
            bad_nodes.insert(user.node);
        }
    }
    bad_nodes.into_iter().collect()
}
