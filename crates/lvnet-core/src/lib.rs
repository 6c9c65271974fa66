//! # lvnet-core: Low-Voltage Circuit Data Model
//!
//! Provides the data structures shared by the verification pipeline: the four
//! input tables of a low-voltage distribution circuit, phase codes and their
//! compatibility rules, and the undirected circuit graph derived from the
//! segment table.
//!
//! ## Design Philosophy
//!
//! Inputs are kept close to the tabular data they come from. Categorical
//! columns (transformer kind, topology flag, phase codes, materials, ...) stay
//! as raw `i64` codes so that the membership checks in `lvnet-algo` can flag
//! out-of-range values instead of failing to construct the record. Typed
//! views such as [`Transformer::kind`] and [`PhaseCode::from_code`] are used
//! once a value has been validated.
//!
//! ## Quick Start
//!
//! ```rust
//! use lvnet_core::*;
//!
//! let input = CircuitInput {
//!     transformer: Transformer::new(NodeId::new(1), 3, 13.2, 0.22, 1),
//!     segments: vec![
//!         Segment::new(NodeId::new(1), NodeId::new(2), 1),
//!         Segment::new(NodeId::new(2), NodeId::new(3), 1),
//!     ],
//!     users: vec![User::new(NodeId::new(3), 1)],
//!     load_curve: LoadCurve::new(vec![1.0; 24]),
//! };
//!
//! let graph = CircuitGraph::from_segments(&input.segments);
//! assert_eq!(graph.node_count(), 3);
//! assert_eq!(graph.edge_count(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`phase`] - Phase codes and the segment/user compatibility tables
//! - [`graph_utils`] - Circuit graph construction and topological summaries
//! - [`codes`] - Numbered error codes used in verification reports
//! - [`report`] - Verification result and report rendering
//! - [`error`] - Error type for I/O, parsing and configuration failures

use serde::{Deserialize, Serialize};

pub mod codes;
pub mod error;
pub mod graph_utils;
pub mod phase;
pub mod report;

pub use codes::ErrorCode;
pub use error::{LvnetError, LvnetResult};
pub use graph_utils::{CircuitGraph, EdgeKey, GraphStats, PhaseConflict};
pub use phase::{CompatibilitySpec, PhaseCode, PhaseCompatibility};
pub use report::VerificationResult;

/// Value assigned by loaders to numeric cells that are empty or not finite.
///
/// No categorical column accepts a negative code, so a missing value always
/// fails its membership check.
pub const MISSING_CODE: i64 = -1;

/// Node identifier as it appears in the segment and user tables.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(i64);

impl NodeId {
    #[inline]
    pub fn new(value: i64) -> Self {
        NodeId(value)
    }
    #[inline]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transformer winding configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformerKind {
    SinglePhase,
    ThreePhase,
}

impl TransformerKind {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(TransformerKind::SinglePhase),
            3 => Some(TransformerKind::ThreePhase),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            TransformerKind::SinglePhase => 1,
            TransformerKind::ThreePhase => 3,
        }
    }
}

/// Declared circuit topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    Meshed,
    Radial,
}

impl Topology {
    pub fn from_flag(flag: i64) -> Option<Self> {
        match flag {
            0 => Some(Topology::Meshed),
            1 => Some(Topology::Radial),
            _ => None,
        }
    }

    pub fn flag(self) -> i64 {
        match self {
            Topology::Meshed => 0,
            Topology::Radial => 1,
        }
    }
}

/// Distribution transformer feeding the circuit. Its node is the slack node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transformer {
    pub node: NodeId,
    /// Raw kind code (1 = single-phase, 3 = three-phase)
    pub kind_code: i64,
    pub primary_voltage: f64,
    pub secondary_voltage: f64,
    /// Raw topology flag (0 = meshed, 1 = radial)
    pub topology_flag: i64,
}

impl Transformer {
    pub fn new(
        node: NodeId,
        kind_code: i64,
        primary_voltage: f64,
        secondary_voltage: f64,
        topology_flag: i64,
    ) -> Self {
        Self {
            node,
            kind_code,
            primary_voltage,
            secondary_voltage,
            topology_flag,
        }
    }

    pub fn kind(&self) -> Option<TransformerKind> {
        TransformerKind::from_code(self.kind_code)
    }

    pub fn topology(&self) -> Option<Topology> {
        Topology::from_flag(self.topology_flag)
    }

    /// Identifier printed at the top of every report.
    pub fn circuit_id(&self) -> NodeId {
        self.node
    }
}

/// Line section ("tramo") between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub from: NodeId,
    pub to: NodeId,
    pub phase_code: i64,
    /// 1 = open wire, 2 = bundled
    pub mounting: i64,
    /// 1 = copper, 2 = aluminium
    pub phase_material: i64,
    /// 1 = copper, 2 = aluminium
    pub neutral_material: i64,
}

impl Segment {
    /// Segment with open-wire mounting and copper conductors.
    pub fn new(from: NodeId, to: NodeId, phase_code: i64) -> Self {
        Self {
            from,
            to,
            phase_code,
            mounting: 1,
            phase_material: 1,
            neutral_material: 1,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.from, self.to)
    }
}

/// Customer connected at a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub node: NodeId,
    pub phase_code: i64,
    /// 1 or 2
    pub meter_type: i64,
    /// Socio-economic stratum, 0..=6
    pub stratum: i64,
    /// Service class, 1..=11
    pub service_class: i64,
}

impl User {
    /// Residential user (meter 1, stratum 1, class 1) on the given phase.
    pub fn new(node: NodeId, phase_code: i64) -> Self {
        Self {
            node,
            phase_code,
            meter_type: 1,
            stratum: 1,
            service_class: 1,
        }
    }
}

/// Hourly load curve. Only its presence and total are checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadCurve(Vec<f64>);

impl LoadCurve {
    pub fn new(values: Vec<f64>) -> Self {
        LoadCurve(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of the values with NaN cells ignored. Infinities are kept.
    pub fn nan_sum(&self) -> f64 {
        self.0.iter().filter(|v| !v.is_nan()).sum()
    }
}

/// The four tables describing one circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitInput {
    pub transformer: Transformer,
    pub segments: Vec<Segment>,
    pub users: Vec<User>,
    pub load_curve: LoadCurve,
}
