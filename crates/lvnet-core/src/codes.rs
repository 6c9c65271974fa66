//! Numbered verification outcomes.
//!
//! The numbering is shared with existing report archives and must not change.
//! Gaps in the sequence are codes that were retired upstream.

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NormalCircuit,
    SlackNotInSegments,
    UnknownTransformerKind,
    PrimaryNotAboveSecondary,
    UnknownTopology,
    SegmentPhaseNotForTransformer,
    UnknownMounting,
    UnknownPhaseMaterial,
    UnknownNeutralMaterial,
    UserOnUnknownNode,
    AllUsersAtTransformerNoSegments,
    UserPhaseNotForTransformer,
    UnknownMeterType,
    UnknownStratum,
    UnknownServiceClass,
    IslandedCircuit,
    MisconnectedLoad,
    MeshedMarkedRadial,
    BadSegmentPhasing,
    RadialMarkedMeshed,
    SinglePhaseLoading,
    SelfLoopSegment,
    BadRingPhasing,
    UnfeedableLoad,
    UsersAwayNoSegments,
    AllUsersAtTransformer,
    NoData,
    ZeroLoadCurve,
    MissingLoadCurve,
}

impl ErrorCode {
    pub fn code(self) -> u32 {
        match self {
            ErrorCode::NormalCircuit => 0,
            ErrorCode::SlackNotInSegments => 1,
            ErrorCode::UnknownTransformerKind => 2,
            ErrorCode::PrimaryNotAboveSecondary => 3,
            ErrorCode::UnknownTopology => 4,
            ErrorCode::SegmentPhaseNotForTransformer => 8,
            ErrorCode::UnknownMounting => 9,
            ErrorCode::UnknownPhaseMaterial => 11,
            ErrorCode::UnknownNeutralMaterial => 13,
            ErrorCode::UserOnUnknownNode => 14,
            ErrorCode::AllUsersAtTransformerNoSegments => 15,
            ErrorCode::UserPhaseNotForTransformer => 16,
            ErrorCode::UnknownMeterType => 18,
            ErrorCode::UnknownStratum => 19,
            ErrorCode::UnknownServiceClass => 20,
            ErrorCode::IslandedCircuit => 22,
            ErrorCode::MisconnectedLoad => 23,
            ErrorCode::MeshedMarkedRadial => 24,
            ErrorCode::BadSegmentPhasing => 25,
            ErrorCode::RadialMarkedMeshed => 26,
            ErrorCode::SinglePhaseLoading => 27,
            ErrorCode::SelfLoopSegment => 29,
            ErrorCode::BadRingPhasing => 30,
            ErrorCode::UnfeedableLoad => 31,
            ErrorCode::UsersAwayNoSegments => 33,
            ErrorCode::AllUsersAtTransformer => 34,
            ErrorCode::NoData => 35,
            ErrorCode::ZeroLoadCurve => 36,
            ErrorCode::MissingLoadCurve => 37,
        }
    }

    /// First line of the report body for this outcome.
    pub fn headline(self) -> &'static str {
        match self {
            ErrorCode::NormalCircuit => "Normal circuit",
            ErrorCode::SlackNotInSegments => {
                "The transformer (slack) node does not appear in the segment table"
            }
            ErrorCode::UnknownTransformerKind => {
                "Unknown transformer type (1 or 3 - single-phase or three-phase)"
            }
            ErrorCode::PrimaryNotAboveSecondary => {
                "The primary voltage is less than or equal to the secondary voltage"
            }
            ErrorCode::UnknownTopology => "Unknown circuit topology (1 or 0 - radial or meshed)",
            ErrorCode::SegmentPhaseNotForTransformer => {
                "Some segment phasings do not match the transformer type"
            }
            ErrorCode::UnknownMounting => "Unknown segment mounting (1 or 2 - open or bundled)",
            ErrorCode::UnknownPhaseMaterial => {
                "Unknown phase conductor material (1 or 2 - copper or aluminium)"
            }
            ErrorCode::UnknownNeutralMaterial => {
                "Unknown neutral conductor material (1 or 2 - copper or aluminium)"
            }
            ErrorCode::UserOnUnknownNode => "Users on nodes that do not appear in the segments:",
            ErrorCode::AllUsersAtTransformerNoSegments => {
                "All users are at the transformer and there are no segments"
            }
            ErrorCode::UserPhaseNotForTransformer => {
                "Users with a phasing incompatible with the transformer:"
            }
            ErrorCode::UnknownMeterType => "Users with an unknown meter type:",
            ErrorCode::UnknownStratum => "Users with an unknown stratum:",
            ErrorCode::UnknownServiceClass => "Users with an unknown service class:",
            ErrorCode::IslandedCircuit => "The circuit has islands",
            ErrorCode::MisconnectedLoad => "Loads connected to an incompatible segment:",
            ErrorCode::MeshedMarkedRadial => "The circuit is meshed but is marked as radial",
            ErrorCode::BadSegmentPhasing => "Consecutive segments with incompatible phasing:",
            ErrorCode::RadialMarkedMeshed => "The circuit is radial but is marked as meshed",
            ErrorCode::SinglePhaseLoading => "Every user is connected to the same phasing",
            ErrorCode::SelfLoopSegment => "The following segments start and end at the same node:",
            ErrorCode::BadRingPhasing => "The following line segments have phasing errors:",
            ErrorCode::UnfeedableLoad => "Loads with no compatible incident segment:",
            ErrorCode::UsersAwayNoSegments => {
                "Users are connected away from the transformer and the circuit has no segments"
            }
            ErrorCode::AllUsersAtTransformer => {
                "All users are at the transformer and the circuit has segments"
            }
            ErrorCode::NoData => "There is no transformer or user information",
            ErrorCode::ZeroLoadCurve => "The load curve is zero at every hour",
            ErrorCode::MissingLoadCurve => "There is no load curve",
        }
    }

    pub fn is_normal(self) -> bool {
        self == ErrorCode::NormalCircuit
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.code())
    }
}
