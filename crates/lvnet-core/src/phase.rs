//! Phase codes and phase-compatibility tables.
//!
//! A phase code is an integer 1..=7 naming the conductors a segment or user
//! is connected to:
//!
//! | Code | Phases |
//! |------|--------|
//! | 1 | A |
//! | 2 | B |
//! | 3 | C |
//! | 4 | AB |
//! | 5 | BC |
//! | 6 | CA |
//! | 7 | ABC |
//!
//! [`PhaseCompatibility`] holds two directional boolean tables: which
//! downstream segment phases an upstream segment may feed, and which user
//! phases a segment may serve. The standard table is available through
//! [`PhaseCompatibility::default`]; alternative phasing standards are built
//! from a [`CompatibilitySpec`], usually deserialized from configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{LvnetError, LvnetResult, TransformerKind};

/// Conductor combination of a segment or user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PhaseCode {
    A,
    B,
    C,
    AB,
    BC,
    CA,
    ABC,
}

impl PhaseCode {
    pub const ALL: [PhaseCode; 7] = [
        PhaseCode::A,
        PhaseCode::B,
        PhaseCode::C,
        PhaseCode::AB,
        PhaseCode::BC,
        PhaseCode::CA,
        PhaseCode::ABC,
    ];

    /// Phases a single-phase transformer can deliver.
    pub const SINGLE_PHASE: [PhaseCode; 3] = [PhaseCode::A, PhaseCode::B, PhaseCode::AB];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(PhaseCode::A),
            2 => Some(PhaseCode::B),
            3 => Some(PhaseCode::C),
            4 => Some(PhaseCode::AB),
            5 => Some(PhaseCode::BC),
            6 => Some(PhaseCode::CA),
            7 => Some(PhaseCode::ABC),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        self.index() as i64
    }

    #[inline]
    fn index(self) -> usize {
        match self {
            PhaseCode::A => 1,
            PhaseCode::B => 2,
            PhaseCode::C => 3,
            PhaseCode::AB => 4,
            PhaseCode::BC => 5,
            PhaseCode::CA => 6,
            PhaseCode::ABC => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PhaseCode::A => "A",
            PhaseCode::B => "B",
            PhaseCode::C => "C",
            PhaseCode::AB => "AB",
            PhaseCode::BC => "BC",
            PhaseCode::CA => "CA",
            PhaseCode::ABC => "ABC",
        }
    }

    /// Human-readable description used in report messages.
    pub fn describe(self) -> &'static str {
        match self {
            PhaseCode::A => "phase A",
            PhaseCode::B => "phase B",
            PhaseCode::C => "phase C",
            PhaseCode::AB => "phases A-B",
            PhaseCode::BC => "phases B-C",
            PhaseCode::CA => "phases C-A",
            PhaseCode::ABC => "phases A-B-C",
        }
    }

    /// Whether a transformer of the given kind can supply this phase.
    pub fn admissible_for(self, kind: TransformerKind) -> bool {
        match kind {
            TransformerKind::SinglePhase => Self::SINGLE_PHASE.contains(&self),
            TransformerKind::ThreePhase => true,
        }
    }

    /// Raw-code variant of [`PhaseCode::admissible_for`]; unknown codes are never admissible.
    pub fn code_admissible_for(code: i64, kind: TransformerKind) -> bool {
        PhaseCode::from_code(code).is_some_and(|phase| phase.admissible_for(kind))
    }
}

impl fmt::Display for PhaseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PhaseCode {
    type Err = LvnetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i64>() {
            return PhaseCode::from_code(code)
                .ok_or_else(|| LvnetError::Parse(format!("phase code {code} out of range 1..=7")));
        }
        PhaseCode::ALL
            .into_iter()
            .find(|phase| phase.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LvnetError::Parse(format!("unknown phase '{trimmed}'")))
    }
}

const TABLE_SIZE: usize = 8;
type Table = [[bool; TABLE_SIZE]; TABLE_SIZE];

/// Serializable description of a compatibility standard.
///
/// Keys are upstream phase names (`"A"`, `"AB"`, ...); values list the phases
/// they may feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilitySpec {
    #[serde(default)]
    pub segment_to_segment: BTreeMap<String, Vec<PhaseCode>>,
    #[serde(default)]
    pub segment_to_user: BTreeMap<String, Vec<PhaseCode>>,
}

/// Directional phase-compatibility tables, indexed by phase code.
///
/// Immutable once built; verification borrows it for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseCompatibility {
    segment_to_segment: Table,
    segment_to_user: Table,
}

impl Default for PhaseCompatibility {
    fn default() -> Self {
        use PhaseCode::*;

        let mut tables = PhaseCompatibility::empty();
        tables.allow_segment(A, &[A, AB, CA, ABC]);
        tables.allow_segment(B, &[B, AB, BC, ABC]);
        tables.allow_segment(C, &[C, BC, CA, ABC]);
        tables.allow_segment(AB, &[A, B, AB, ABC]);
        tables.allow_segment(BC, &[B, C, BC, ABC]);
        tables.allow_segment(CA, &[A, C, CA, ABC]);
        tables.allow_segment(ABC, &PhaseCode::ALL);

        tables.allow_user(A, &[A]);
        tables.allow_user(B, &[B]);
        tables.allow_user(C, &[C]);
        tables.allow_user(AB, &[A, B, AB]);
        tables.allow_user(BC, &[B, C, BC]);
        tables.allow_user(CA, &[A, C, CA]);
        tables.allow_user(ABC, &PhaseCode::ALL);
        tables
    }
}

impl PhaseCompatibility {
    /// Tables with every combination forbidden.
    pub fn empty() -> Self {
        Self {
            segment_to_segment: [[false; TABLE_SIZE]; TABLE_SIZE],
            segment_to_user: [[false; TABLE_SIZE]; TABLE_SIZE],
        }
    }

    pub fn allow_segment(&mut self, upstream: PhaseCode, downstream: &[PhaseCode]) {
        for phase in downstream {
            self.segment_to_segment[upstream.index()][phase.index()] = true;
        }
    }

    pub fn allow_user(&mut self, segment: PhaseCode, users: &[PhaseCode]) {
        for phase in users {
            self.segment_to_user[segment.index()][phase.index()] = true;
        }
    }

    /// May a segment of phase `upstream` directly feed a segment of phase `downstream`?
    pub fn segment_feeds_segment(&self, upstream: PhaseCode, downstream: PhaseCode) -> bool {
        self.segment_to_segment[upstream.index()][downstream.index()]
    }

    /// May a segment of phase `segment` serve a user of phase `user`?
    pub fn segment_feeds_user(&self, segment: PhaseCode, user: PhaseCode) -> bool {
        self.segment_to_user[segment.index()][user.index()]
    }

    /// Raw user code variant; out-of-range user codes are never served.
    pub fn segment_feeds_user_code(&self, segment: PhaseCode, user_code: i64) -> bool {
        PhaseCode::from_code(user_code).is_some_and(|user| self.segment_feeds_user(segment, user))
    }

    /// Build tables from a serialized description. Upstream phases it does not list feed nothing.
    pub fn from_spec(spec: &CompatibilitySpec) -> LvnetResult<Self> {
        let mut tables = PhaseCompatibility::empty();
        for (upstream, downstream) in &spec.segment_to_segment {
            let upstream = parse_key(upstream)?;
            tables.allow_segment(upstream, downstream);
        }
        for (segment, users) in &spec.segment_to_user {
            let segment = parse_key(segment)?;
            tables.allow_user(segment, users);
        }
        Ok(tables)
    }

    pub fn to_spec(&self) -> CompatibilitySpec {
        let mut spec = CompatibilitySpec::default();
        for upstream in PhaseCode::ALL {
            let feeds: Vec<PhaseCode> = PhaseCode::ALL
                .into_iter()
                .filter(|&p| self.segment_feeds_segment(upstream, p))
                .collect();
            let serves: Vec<PhaseCode> = PhaseCode::ALL
                .into_iter()
                .filter(|&p| self.segment_feeds_user(upstream, p))
                .collect();
            spec.segment_to_segment
                .insert(upstream.name().to_string(), feeds);
            spec.segment_to_user
                .insert(upstream.name().to_string(), serves);
        }
        spec
    }
}

fn parse_key(key: &str) -> LvnetResult<PhaseCode> {
    key.parse::<PhaseCode>()
        .map_err(|err| LvnetError::Config(format!("compatibility table key: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_phase_trunk_serves_everything() {
        let tables = PhaseCompatibility::default();
        for phase in PhaseCode::ALL {
            assert!(tables.segment_feeds_segment(PhaseCode::ABC, phase));
            assert!(tables.segment_feeds_user(PhaseCode::ABC, phase));
            assert!(tables.segment_feeds_segment(phase, PhaseCode::ABC));
        }
    }

    #[test]
    fn single_phases_do_not_cross() {
        let tables = PhaseCompatibility::default();
        assert!(!tables.segment_feeds_segment(PhaseCode::A, PhaseCode::C));
        assert!(!tables.segment_feeds_segment(PhaseCode::A, PhaseCode::BC));
        assert!(tables.segment_feeds_segment(PhaseCode::A, PhaseCode::CA));
        assert!(!tables.segment_feeds_user(PhaseCode::A, PhaseCode::AB));
        assert!(tables.segment_feeds_user(PhaseCode::AB, PhaseCode::B));
    }

    #[test]
    fn raw_user_codes_out_of_range_are_rejected() {
        let tables = PhaseCompatibility::default();
        assert!(!tables.segment_feeds_user_code(PhaseCode::ABC, 0));
        assert!(!tables.segment_feeds_user_code(PhaseCode::ABC, 8));
        assert!(tables.segment_feeds_user_code(PhaseCode::ABC, 3));
    }

    #[test]
    fn single_phase_admissibility() {
        assert!(PhaseCode::code_admissible_for(4, TransformerKind::SinglePhase));
        assert!(!PhaseCode::code_admissible_for(3, TransformerKind::SinglePhase));
        assert!(PhaseCode::code_admissible_for(3, TransformerKind::ThreePhase));
        assert!(!PhaseCode::code_admissible_for(9, TransformerKind::ThreePhase));
    }

    #[test]
    fn parse_names_and_codes() {
        assert_eq!("ca".parse::<PhaseCode>().unwrap(), PhaseCode::CA);
        assert_eq!("7".parse::<PhaseCode>().unwrap(), PhaseCode::ABC);
        assert!("D".parse::<PhaseCode>().is_err());
        assert!("0".parse::<PhaseCode>().is_err());
    }

    #[test]
    fn spec_roundtrip_preserves_default_tables() {
        let tables = PhaseCompatibility::default();
        let rebuilt = PhaseCompatibility::from_spec(&tables.to_spec()).unwrap();
        assert_eq!(rebuilt, tables);
    }

    #[test]
    fn spec_with_bad_key_is_config_error() {
        let mut spec = CompatibilitySpec::default();
        spec.segment_to_user
            .insert("N".to_string(), vec![PhaseCode::A]);
        let err = PhaseCompatibility::from_spec(&spec).unwrap_err();
        assert!(matches!(err, LvnetError::Config(_)));
    }
}
