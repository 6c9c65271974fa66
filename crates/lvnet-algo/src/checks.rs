//! Table-level checks that run before the circuit graph is built.
//!
//! Each check is a pure predicate over the input tables: it either passes or
//! returns the detail lines naming the offending rows.

use std::collections::{BTreeSet, HashSet};

use lvnet_core::{NodeId, PhaseCode, Topology, User, MISSING_CODE};

use crate::pipeline::{CheckContext, Verdict};

pub(crate) fn no_data(ctx: &CheckContext<'_>) -> Verdict {
    Verdict::fail_if(ctx.input.segments.is_empty() && ctx.input.users.is_empty())
}

pub(crate) fn zero_load_curve(ctx: &CheckContext<'_>) -> Verdict {
    let curve = &ctx.input.load_curve;
    Verdict::fail_if(!curve.is_empty() && curve.nan_sum() == 0.0)
}

pub(crate) fn missing_load_curve(ctx: &CheckContext<'_>) -> Verdict {
    Verdict::fail_if(ctx.input.load_curve.is_empty())
}

pub(crate) fn transformer_kind(ctx: &CheckContext<'_>) -> Verdict {
    Verdict::fail_if(ctx.input.transformer.kind().is_none())
}

pub(crate) fn transformer_voltages(ctx: &CheckContext<'_>) -> Verdict {
    let t = &ctx.input.transformer;
    let finite = t.primary_voltage.is_finite() && t.secondary_voltage.is_finite();
    Verdict::fail_if(!finite || t.primary_voltage <= t.secondary_voltage)
}

pub(crate) fn topology_flag(ctx: &CheckContext<'_>) -> Verdict {
    Verdict::fail_if(ctx.input.transformer.topology().is_none())
}

pub(crate) fn slack_in_segments(ctx: &CheckContext<'_>) -> Verdict {
    let slack = ctx.input.transformer.node;
    let segments = &ctx.input.segments;
    if segments.is_empty() || slack.value() == MISSING_CODE {
        return Verdict::Pass;
    }
    Verdict::fail_if(!segments.iter().any(|s| s.from == slack || s.to == slack))
}

pub(crate) fn segment_phase_for_transformer(ctx: &CheckContext<'_>) -> Verdict {
    let Some(kind) = ctx.input.transformer.kind() else {
        return Verdict::Pass;
    };
    Verdict::fail_if(
        ctx.input
            .segments
            .iter()
            .any(|s| !PhaseCode::code_admissible_for(s.phase_code, kind)),
    )
}

pub(crate) fn segment_mounting(ctx: &CheckContext<'_>) -> Verdict {
    Verdict::fail_if(ctx.input.segments.iter().any(|s| !matches!(s.mounting, 1 | 2)))
}

pub(crate) fn phase_material(ctx: &CheckContext<'_>) -> Verdict {
    Verdict::fail_if(
        ctx.input
            .segments
            .iter()
            .any(|s| !matches!(s.phase_material, 1 | 2)),
    )
}

pub(crate) fn neutral_material(ctx: &CheckContext<'_>) -> Verdict {
    Verdict::fail_if(
        ctx.input
            .segments
            .iter()
            .any(|s| !matches!(s.neutral_material, 1 | 2)),
    )
}

pub(crate) fn self_loops(ctx: &CheckContext<'_>) -> Verdict {
    Verdict::from_details(
        ctx.input
            .segments
            .iter()
            .filter(|s| s.is_self_loop())
            .map(|s| format!("{}  {}", s.from, s.to))
            .collect(),
    )
}

pub(crate) fn users_on_segment_nodes(ctx: &CheckContext<'_>) -> Verdict {
    let segments = &ctx.input.segments;
    if segments.is_empty() {
        return Verdict::Pass;
    }
    let known: HashSet<NodeId> = segments.iter().flat_map(|s| [s.from, s.to]).collect();
    let missing: BTreeSet<NodeId> = ctx
        .input
        .users
        .iter()
        .map(|u| u.node)
        .filter(|node| !known.contains(node))
        .collect();
    Verdict::from_details(missing.iter().map(NodeId::to_string).collect())
}

fn all_users_at_slack(ctx: &CheckContext<'_>) -> bool {
    let slack = ctx.input.transformer.node;
    ctx.input.users.iter().all(|u| u.node == slack)
}

pub(crate) fn users_at_transformer_without_segments(ctx: &CheckContext<'_>) -> Verdict {
    let input = ctx.input;
    Verdict::fail_if(!input.users.is_empty() && input.segments.is_empty() && all_users_at_slack(ctx))
}

pub(crate) fn users_at_transformer(ctx: &CheckContext<'_>) -> Verdict {
    let input = ctx.input;
    Verdict::fail_if(
        !input.users.is_empty() && !input.segments.is_empty() && all_users_at_slack(ctx),
    )
}

pub(crate) fn users_away_without_segments(ctx: &CheckContext<'_>) -> Verdict {
    let input = ctx.input;
    Verdict::fail_if(!input.users.is_empty() && input.segments.is_empty() && !all_users_at_slack(ctx))
}

/// Detail lines naming the node of every user failing `ok`, in table order.
fn offending_user_nodes(users: &[User], ok: impl Fn(&User) -> bool) -> Verdict {
    Verdict::from_details(
        users
            .iter()
            .filter(|u| !ok(u))
            .map(|u| u.node.to_string())
            .collect(),
    )
}

pub(crate) fn user_phase_for_transformer(ctx: &CheckContext<'_>) -> Verdict {
    let Some(kind) = ctx.input.transformer.kind() else {
        return Verdict::Pass;
    };
    offending_user_nodes(&ctx.input.users, |u| {
        PhaseCode::code_admissible_for(u.phase_code, kind)
    })
}

pub(crate) fn meter_type(ctx: &CheckContext<'_>) -> Verdict {
    offending_user_nodes(&ctx.input.users, |u| matches!(u.meter_type, 1 | 2))
}

pub(crate) fn stratum(ctx: &CheckContext<'_>) -> Verdict {
    offending_user_nodes(&ctx.input.users, |u| (0..=6).contains(&u.stratum))
}

pub(crate) fn service_class(ctx: &CheckContext<'_>) -> Verdict {
    offending_user_nodes(&ctx.input.users, |u| (1..=11).contains(&u.service_class))
}

/// Radial circuits whose users all hang from the same phasing.
pub(crate) fn single_phase_loading(ctx: &CheckContext<'_>) -> Verdict {
    if ctx.input.transformer.topology() != Some(Topology::Radial) {
        return Verdict::Pass;
    }
    let codes: BTreeSet<i64> = ctx
        .input
        .users
        .iter()
        .map(|u| u.phase_code)
        .filter(|&code| code != MISSING_CODE)
        .collect();
    if codes.len() != 1 {
        return Verdict::Pass;
    }
    let detail = match codes.first().copied().and_then(PhaseCode::from_code) {
        Some(phase) => format!("All users are connected to {}", phase.describe()),
        None => "Invalid phase distribution".to_string(),
    };
    Verdict::Fail(vec![detail])
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvnet_core::{
        CircuitInput, LoadCurve, PhaseCompatibility, Segment, Transformer,
    };

    fn n(id: i64) -> NodeId {
        NodeId::new(id)
    }

    fn input(segments: Vec<Segment>, users: Vec<User>) -> CircuitInput {
        CircuitInput {
            transformer: Transformer::new(n(1), 3, 13.2, 0.22, 1),
            segments,
            users,
            load_curve: LoadCurve::new(vec![1.0; 24]),
        }
    }

    fn run(check: fn(&CheckContext<'_>) -> Verdict, input: &CircuitInput) -> Verdict {
        let compat = PhaseCompatibility::default();
        let ctx = CheckContext::new(input, &compat);
        check(&ctx)
    }

    #[test]
    fn load_curve_with_nan_only_counts_as_zero() {
        let mut circuit = input(vec![Segment::new(n(1), n(2), 1)], Vec::new());
        circuit.load_curve = LoadCurve::new(vec![0.0, f64::NAN]);
        assert!(run(zero_load_curve, &circuit).is_fail());
        circuit.load_curve = LoadCurve::new(Vec::new());
        assert!(!run(zero_load_curve, &circuit).is_fail());
        assert!(run(missing_load_curve, &circuit).is_fail());
    }

    #[test]
    fn infinite_load_is_not_a_zero_curve() {
        let mut circuit = input(vec![Segment::new(n(1), n(2), 1)], Vec::new());
        circuit.load_curve = LoadCurve::new(vec![0.0, f64::INFINITY]);
        assert!(!run(zero_load_curve, &circuit).is_fail());
    }

    #[test]
    fn non_finite_voltage_fails() {
        let mut circuit = input(vec![Segment::new(n(1), n(2), 1)], Vec::new());
        circuit.transformer.secondary_voltage = f64::NAN;
        assert!(run(transformer_voltages, &circuit).is_fail());
        circuit.transformer.secondary_voltage = 13.2;
        assert!(run(transformer_voltages, &circuit).is_fail());
        circuit.transformer.secondary_voltage = 0.22;
        assert!(!run(transformer_voltages, &circuit).is_fail());
    }

    #[test]
    fn self_loops_are_listed() {
        let circuit = input(
            vec![
                Segment::new(n(1), n(2), 1),
                Segment::new(n(3), n(3), 1),
                Segment::new(n(5), n(5), 1),
            ],
            Vec::new(),
        );
        assert_eq!(
            run(self_loops, &circuit),
            Verdict::Fail(vec!["3  3".to_string(), "5  5".to_string()])
        );
    }

    #[test]
    fn unknown_user_nodes_listed_once_sorted() {
        let circuit = input(
            vec![Segment::new(n(1), n(2), 1)],
            vec![User::new(n(9), 1), User::new(n(4), 1), User::new(n(9), 2)],
        );
        assert_eq!(
            run(users_on_segment_nodes, &circuit),
            Verdict::Fail(vec!["4".to_string(), "9".to_string()])
        );
    }

    #[test]
    fn slack_check_skipped_for_missing_slack() {
        let mut circuit = input(vec![Segment::new(n(2), n(3), 1)], Vec::new());
        assert!(run(slack_in_segments, &circuit).is_fail());
        circuit.transformer.node = n(MISSING_CODE);
        assert!(!run(slack_in_segments, &circuit).is_fail());
    }

    #[test]
    fn user_range_checks_name_nodes() {
        let mut bad = User::new(n(2), 1);
        bad.stratum = 7;
        bad.service_class = 0;
        bad.meter_type = 3;
        let circuit = input(vec![Segment::new(n(1), n(2), 7)], vec![User::new(n(1), 2), bad]);
        assert_eq!(run(stratum, &circuit), Verdict::Fail(vec!["2".to_string()]));
        assert_eq!(run(service_class, &circuit), Verdict::Fail(vec!["2".to_string()]));
        assert_eq!(run(meter_type, &circuit), Verdict::Fail(vec!["2".to_string()]));
    }

    #[test]
    fn single_phase_loading_names_the_phase() {
        let circuit = input(
            vec![Segment::new(n(1), n(2), 7)],
            vec![User::new(n(2), 5), User::new(n(2), 5)],
        );
        assert_eq!(
            run(single_phase_loading, &circuit),
            Verdict::Fail(vec!["All users are connected to phases B-C".to_string()])
        );

        let mut meshed = circuit.clone();
        meshed.transformer.topology_flag = 0;
        assert!(!run(single_phase_loading, &meshed).is_fail());
    }
}
