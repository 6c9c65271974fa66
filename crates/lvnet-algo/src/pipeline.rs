//! Ordered rule pipeline.
//!
//! [`RULES`] lists every check as a `(code, check)` pair in report order.
//! Rules are evaluated in sequence and the first failing rule ends the run;
//! its code and detail lines become the [`VerificationResult`]. Derived
//! structures (circuit graph, spanning tree, biconnected decomposition) are
//! built lazily on first use and shared by the rules of a single run.

use once_cell::unsync::OnceCell;
use tracing::{debug, info, warn};

use lvnet_core::{
    CircuitGraph, CircuitInput, ErrorCode, PhaseCompatibility, Topology, VerificationResult,
};

use crate::checks;
use crate::meshed::{self, MeshAnalysis};
use crate::radial::{self, SpanningTree};
use crate::topology::{self, TopologySummary};

/// Outcome of a single rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// Failed, with one detail line per offending item (possibly none)
    Fail(Vec<String>),
}

impl Verdict {
    pub fn fail_if(failed: bool) -> Self {
        if failed {
            Verdict::Fail(Vec::new())
        } else {
            Verdict::Pass
        }
    }

    /// Fails when there is at least one detail line.
    pub fn from_details(details: Vec<String>) -> Self {
        if details.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Fail(details)
        }
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Verdict::Fail(_))
    }
}

/// Inputs and lazily derived structures visible to every rule.
pub struct CheckContext<'a> {
    pub input: &'a CircuitInput,
    pub compat: &'a PhaseCompatibility,
    graph: OnceCell<CircuitGraph>,
    tree: OnceCell<Option<SpanningTree>>,
    mesh: OnceCell<MeshAnalysis>,
}

impl<'a> CheckContext<'a> {
    pub fn new(input: &'a CircuitInput, compat: &'a PhaseCompatibility) -> Self {
        Self {
            input,
            compat,
            graph: OnceCell::new(),
            tree: OnceCell::new(),
            mesh: OnceCell::new(),
        }
    }

    pub fn graph(&self) -> &CircuitGraph {
        self.graph.get_or_init(|| {
            let graph = CircuitGraph::from_segments(&self.input.segments);
            for conflict in graph.phase_conflicts() {
                warn!(
                    edge = %conflict.edge,
                    kept = conflict.kept_code,
                    discarded = conflict.discarded_code,
                    "parallel segments disagree on phase; keeping the first"
                );
            }
            debug!(
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                "built circuit graph"
            );
            graph
        })
    }

    pub fn spanning_tree(&self) -> Option<&SpanningTree> {
        self.tree
            .get_or_init(|| SpanningTree::bfs(self.graph(), self.input.transformer.node))
            .as_ref()
    }

    pub fn mesh(&self) -> &MeshAnalysis {
        self.mesh.get_or_init(|| MeshAnalysis::new(self.graph()))
    }

    fn declared(&self) -> Option<Topology> {
        self.input.transformer.topology()
    }

    fn has_segments(&self) -> bool {
        !self.input.segments.is_empty()
    }
}

/// A named check and the code it reports on failure.
#[derive(Clone, Copy)]
pub struct Rule {
    pub code: ErrorCode,
    pub name: &'static str,
    pub check: fn(&CheckContext<'_>) -> Verdict,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("code", &self.code.code())
            .field("name", &self.name)
            .finish()
    }
}

macro_rules! rule {
    ($code:ident, $check:path) => {
        Rule {
            code: ErrorCode::$code,
            name: stringify!($code),
            check: $check,
        }
    };
}

/// Every check, in evaluation order.
pub const RULES: &[Rule] = &[
    rule!(NoData, checks::no_data),
    rule!(ZeroLoadCurve, checks::zero_load_curve),
    rule!(MissingLoadCurve, checks::missing_load_curve),
    rule!(UnknownTransformerKind, checks::transformer_kind),
    rule!(PrimaryNotAboveSecondary, checks::transformer_voltages),
    rule!(UnknownTopology, checks::topology_flag),
    rule!(SlackNotInSegments, checks::slack_in_segments),
    rule!(SegmentPhaseNotForTransformer, checks::segment_phase_for_transformer),
    rule!(UnknownMounting, checks::segment_mounting),
    rule!(UnknownPhaseMaterial, checks::phase_material),
    rule!(UnknownNeutralMaterial, checks::neutral_material),
    rule!(SelfLoopSegment, checks::self_loops),
    rule!(UserOnUnknownNode, checks::users_on_segment_nodes),
    rule!(AllUsersAtTransformerNoSegments, checks::users_at_transformer_without_segments),
    rule!(AllUsersAtTransformer, checks::users_at_transformer),
    rule!(UsersAwayNoSegments, checks::users_away_without_segments),
    rule!(UserPhaseNotForTransformer, checks::user_phase_for_transformer),
    rule!(UnknownMeterType, checks::meter_type),
    rule!(UnknownStratum, checks::stratum),
    rule!(UnknownServiceClass, checks::service_class),
    rule!(SinglePhaseLoading, checks::single_phase_loading),
    rule!(IslandedCircuit, islanded_circuit),
    rule!(RadialMarkedMeshed, radial_marked_meshed),
    rule!(MeshedMarkedRadial, meshed_marked_radial),
    rule!(BadSegmentPhasing, bad_segment_phasing),
    rule!(MisconnectedLoad, misconnected_load),
    rule!(BadRingPhasing, bad_ring_phasing),
    rule!(UnfeedableLoad, unfeedable_load),
];

/// Verifies one circuit against the full rule list.
pub fn verify(input: &CircuitInput, compat: &PhaseCompatibility) -> VerificationResult {
    run_rules(RULES, input, compat)
}

/// Evaluates `rules` in order and stops at the first failure.
pub fn run_rules(
    rules: &[Rule],
    input: &CircuitInput,
    compat: &PhaseCompatibility,
) -> VerificationResult {
    let circuit = input.transformer.circuit_id();
    let ctx = CheckContext::new(input, compat);
    for rule in rules {
        debug!(rule = rule.name, code = rule.code.code(), "running check");
        if let Verdict::Fail(details) = (rule.check)(&ctx) {
            info!(
                circuit = %circuit,
                code = rule.code.code(),
                rule = rule.name,
                findings = details.len(),
                "check failed"
            );
            return VerificationResult::failure(circuit, rule.code, details);
        }
    }
    info!(circuit = %circuit, "normal circuit");
    VerificationResult::normal(circuit)
}

fn topology_mismatch(ctx: &CheckContext<'_>, code: ErrorCode) -> Verdict {
    let Some(declared) = ctx.declared() else {
        return Verdict::Pass;
    };
    if !ctx.has_segments() {
        return Verdict::Pass;
    }
    let summary = TopologySummary::of(ctx.graph());
    Verdict::fail_if(topology::check_declared(&summary, declared) == Some(code))
}

fn islanded_circuit(ctx: &CheckContext<'_>) -> Verdict {
    topology_mismatch(ctx, ErrorCode::IslandedCircuit)
}

fn radial_marked_meshed(ctx: &CheckContext<'_>) -> Verdict {
    topology_mismatch(ctx, ErrorCode::RadialMarkedMeshed)
}

fn meshed_marked_radial(ctx: &CheckContext<'_>) -> Verdict {
    topology_mismatch(ctx, ErrorCode::MeshedMarkedRadial)
}

fn load_line(node: lvnet_core::NodeId) -> String {
    format!("Badly connected load at node {node}")
}

fn bad_segment_phasing(ctx: &CheckContext<'_>) -> Verdict {
    if ctx.declared() != Some(Topology::Radial) || !ctx.has_segments() {
        return Verdict::Pass;
    }
    let Some(tree) = ctx.spanning_tree() else {
        return Verdict::Pass;
    };
    let violations = radial::check_segment_phasing(ctx.graph(), tree, ctx.compat);
    Verdict::from_details(
        violations
            .iter()
            .map(|v| format!("Bad phasing from {} to {}", v.upstream, v.downstream))
            .collect(),
    )
}

fn misconnected_load(ctx: &CheckContext<'_>) -> Verdict {
    if ctx.declared() != Some(Topology::Radial) || !ctx.has_segments() {
        return Verdict::Pass;
    }
    let (Some(tree), Some(kind)) = (ctx.spanning_tree(), ctx.input.transformer.kind()) else {
        return Verdict::Pass;
    };
    let bad = radial::check_user_phasing(ctx.graph(), tree, &ctx.input.users, kind, ctx.compat);
    Verdict::from_details(bad.into_iter().map(load_line).collect())
}

fn bad_ring_phasing(ctx: &CheckContext<'_>) -> Verdict {
    if ctx.declared() != Some(Topology::Meshed) || !ctx.has_segments() {
        return Verdict::Pass;
    }
    let violations = meshed::check_ring_phasing(ctx.graph(), ctx.mesh(), ctx.compat);
    Verdict::from_details(
        violations
            .iter()
            .map(|v| format!("From {} to {}", v.upstream, v.downstream))
            .collect(),
    )
}

fn unfeedable_load(ctx: &CheckContext<'_>) -> Verdict {
    if ctx.declared() != Some(Topology::Meshed) || !ctx.has_segments() {
        return Verdict::Pass;
    }
    let bad = meshed::check_load_feasibility(ctx.graph(), &ctx.input.users, ctx.compat);
    Verdict::from_details(bad.into_iter().map(load_line).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rule_codes_are_unique_and_normal_is_absent() {
        let codes: HashSet<u32> = RULES.iter().map(|r| r.code.code()).collect();
        assert_eq!(codes.len(), RULES.len());
        assert!(!codes.contains(&0));
    }

    #[test]
    fn graph_rules_run_after_table_rules() {
        let position = |code: ErrorCode| RULES.iter().position(|r| r.code == code).unwrap();
        assert!(position(ErrorCode::SinglePhaseLoading) < position(ErrorCode::IslandedCircuit));
        assert!(position(ErrorCode::IslandedCircuit) < position(ErrorCode::RadialMarkedMeshed));
        assert!(position(ErrorCode::RadialMarkedMeshed) < position(ErrorCode::MeshedMarkedRadial));
        assert!(position(ErrorCode::BadSegmentPhasing) < position(ErrorCode::MisconnectedLoad));
        assert!(position(ErrorCode::BadRingPhasing) < position(ErrorCode::UnfeedableLoad));
        assert_eq!(RULES[0].code, ErrorCode::NoData);
    }

    #[test]
    fn verdict_helpers() {
        assert_eq!(Verdict::fail_if(false), Verdict::Pass);
        assert_eq!(Verdict::from_details(Vec::new()), Verdict::Pass);
        assert!(Verdict::from_details(vec!["x".into()]).is_fail());
    }
}
