//! Connectivity and radial/meshed classification.
//!
//! The computed class is only compared against the transformer's declared
//! topology flag; the phase verifiers always branch on the declared flag.

use lvnet_core::{CircuitGraph, ErrorCode, Topology};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TopologySummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub components: usize,
}

impl TopologySummary {
    pub fn of(graph: &CircuitGraph) -> Self {
        Self {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            components: graph.component_count(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.components <= 1
    }

    /// `M = N - 1`
    pub fn is_tree_shaped(&self) -> bool {
        self.edge_count + 1 == self.node_count
    }

    /// `M >= N`: at least one independent cycle
    pub fn has_cycle(&self) -> bool {
        self.node_count > 0 && self.edge_count >= self.node_count
    }

    /// Computed class, meaningful only for a connected graph.
    pub fn class(&self) -> Option<Topology> {
        if self.is_tree_shaped() {
            Some(Topology::Radial)
        } else if self.has_cycle() {
            Some(Topology::Meshed)
        } else {
            None
        }
    }
}

/// Checks connectivity and the declared flag, in report order: islands, then
/// a tree declared meshed, then a cyclic graph declared radial.
pub fn check_declared(summary: &TopologySummary, declared: Topology) -> Option<ErrorCode> {
    if !summary.is_connected() {
        return Some(ErrorCode::IslandedCircuit);
    }
    match (summary.class(), declared) {
        (Some(Topology::Radial), Topology::Meshed) => Some(ErrorCode::RadialMarkedMeshed),
        (Some(Topology::Meshed), Topology::Radial) => Some(ErrorCode::MeshedMarkedRadial),
        _ => None,
    }
}
