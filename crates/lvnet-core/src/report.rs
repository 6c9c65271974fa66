//! Verification result and report rendering.
//!
//! A run produces exactly one [`VerificationResult`]: the outcome code plus
//! the detail lines of the check that produced it. Rendering is pure; writing
//! the report somewhere is the caller's job.
//!
//! # Example
//!
//! ```
//! use lvnet_core::{ErrorCode, NodeId, VerificationResult};
//!
//! let result = VerificationResult::failure(
//!     NodeId::new(12),
//!     ErrorCode::IslandedCircuit,
//!     Vec::new(),
//! );
//! assert_eq!(result.error_code(), 22);
//! assert_eq!(
//!     result.report_lines(),
//!     vec!["Circuit: 12", "Error: 22", "The circuit has islands"],
//! );
//! ```

use serde::Serialize;

use crate::{ErrorCode, NodeId};

/// Outcome of a verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    /// Circuit identifier (the transformer node)
    pub circuit: NodeId,
    /// Outcome code
    pub code: ErrorCode,
    /// Offending items, one per line, for the failing check only
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl VerificationResult {
    /// Result for a circuit that passed every check
    pub fn normal(circuit: NodeId) -> Self {
        Self {
            circuit,
            code: ErrorCode::NormalCircuit,
            details: Vec::new(),
        }
    }

    /// Result for the first failing check
    pub fn failure(circuit: NodeId, code: ErrorCode, details: Vec<String>) -> Self {
        Self {
            circuit,
            code,
            details,
        }
    }

    pub fn error_code(&self) -> u32 {
        self.code.code()
    }

    pub fn is_normal(&self) -> bool {
        self.code.is_normal()
    }

    /// Header, headline and detail lines, without line terminators.
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(3 + self.details.len());
        lines.push(format!("Circuit: {}", self.circuit));
        lines.push(format!("Error: {}", self.code));
        lines.push(self.code.headline().to_string());
        lines.extend(self.details.iter().cloned());
        lines
    }

    /// Report rendered as one block, each line terminated by `line_ending`
    /// and the block preceded by an empty line.
    pub fn render(&self, line_ending: &str) -> String {
        let mut out = String::from(line_ending);
        for line in self.report_lines() {
            out.push_str(&line);
            out.push_str(line_ending);
        }
        out
    }
}

impl std::fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.report_lines().join("\n"))
    }
}
