//! # lvnet-algo: Circuit Verification Algorithms
//!
//! Checks a low-voltage circuit for data and electrical coherence.
//!
//! - [`pipeline`] - ordered rule list and the [`verify`] entry point
//! - [`checks`] - flat table checks (codes, ranges, presence)
//! - [`topology`] - connectivity and radial/meshed classification
//! - [`radial`] - BFS rooting and parent-chain phase verification
//! - [`rings`] - biconnected decomposition
//! - [`meshed`] - local ring phasing and load feasibility
//!
//! ```rust
//! use lvnet_algo::verify;
//! use lvnet_core::*;
//!
//! let input = CircuitInput {
//!     transformer: Transformer::new(NodeId::new(1), 3, 13.2, 0.22, 1),
//!     segments: vec![
//!         Segment::new(NodeId::new(1), NodeId::new(2), 1),
//!         Segment::new(NodeId::new(2), NodeId::new(3), 1),
//!     ],
//!     users: Vec::new(),
//!     load_curve: LoadCurve::new(vec![1.0; 24]),
//! };
//!
//! let result = verify(&input, &PhaseCompatibility::default());
//! assert_eq!(result.error_code(), 0);
//! ```

use lvnet_core::EdgeKey;
use serde::Serialize;

pub mod checks;
pub mod meshed;
pub mod pipeline;
pub mod radial;
pub mod rings;
pub mod topology;

pub use meshed::MeshAnalysis;
pub use pipeline::{run_rules, verify, CheckContext, Rule, Verdict, RULES};
pub use radial::SpanningTree;
pub use rings::{biconnected_components, BiconnectedComponent};
pub use topology::TopologySummary;

/// Adjacent segment pair whose phases cannot feed one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhasingViolation {
    pub upstream: EdgeKey,
    pub downstream: EdgeKey,
}

impl std::fmt::Display for PhasingViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.upstream, self.downstream)
    }
}
