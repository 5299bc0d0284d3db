//! Canonical phase set and predecessor rules.
//!
//! Projects move through six ordered phases plus one optional sub-phase:
//!
//! 1 planning -> 2 task_generation -> 3 review -> 4 implementation
//!   -> 5 integration -> (5.5 documentation) -> 6 complete
//!
//! Documentation (5.5) sorts between 5 and 6 but is never a hard
//! predecessor of 6.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// One stage of the orchestration workflow.
///
/// Declaration order is the phase order; `ordinal()` and the derived
/// `Ord` agree with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Phase 1: produce the project plan
    Planning,
    /// Phase 2: break the plan into agent-sized tasks
    TaskGeneration,
    /// Phase 3: review the plan and task breakdown
    Review,
    /// Phase 4: parallel implementation by assigned agents
    Implementation,
    /// Phase 5: merge and integrate agent output
    Integration,
    /// Phase 5.5: optional documentation pass
    Documentation,
    /// Phase 6: all phases finished (re-entrant via rollback)
    Complete,
}

impl Phase {
    /// All phases in workflow order.
    pub const ALL: [Phase; 7] = [
        Phase::Planning,
        Phase::TaskGeneration,
        Phase::Review,
        Phase::Implementation,
        Phase::Integration,
        Phase::Documentation,
        Phase::Complete,
    ];

    /// Position in the total order, 0-based.
    pub fn ordinal(self) -> usize {
        match self {
            Phase::Planning => 0,
            Phase::TaskGeneration => 1,
            Phase::Review => 2,
            Phase::Implementation => 3,
            Phase::Integration => 4,
            Phase::Documentation => 5,
            Phase::Complete => 6,
        }
    }

    /// Numeric code as printed on the wire and the CLI.
    pub fn code(self) -> &'static str {
        match self {
            Phase::Planning => "1",
            Phase::TaskGeneration => "2",
            Phase::Review => "3",
            Phase::Implementation => "4",
            Phase::Integration => "5",
            Phase::Documentation => "5.5",
            Phase::Complete => "6",
        }
    }

    /// Snake-case label for reports.
    pub fn name(self) -> &'static str {
        match self {
            Phase::Planning => "planning",
            Phase::TaskGeneration => "task_generation",
            Phase::Review => "review",
            Phase::Implementation => "implementation",
            Phase::Integration => "integration",
            Phase::Documentation => "documentation",
            Phase::Complete => "complete",
        }
    }

    /// Phases that must be complete before `self` may become current.
    ///
    /// Documentation is optional and therefore appears in no
    /// predecessor list, including phase 6's.
    pub fn predecessors(self) -> &'static [Phase] {
        match self {
            Phase::Planning => &[],
            Phase::TaskGeneration => &[Phase::Planning],
            Phase::Review => &[Phase::Planning, Phase::TaskGeneration],
            Phase::Implementation => {
                &[Phase::Planning, Phase::TaskGeneration, Phase::Review]
            }
            Phase::Integration => &[
                Phase::Planning,
                Phase::TaskGeneration,
                Phase::Review,
                Phase::Implementation,
            ],
            // Documentation itself still requires everything through integration
            Phase::Documentation | Phase::Complete => &[
                Phase::Planning,
                Phase::TaskGeneration,
                Phase::Review,
                Phase::Implementation,
                Phase::Integration,
            ],
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Phase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Phase::Planning),
            "2" => Ok(Phase::TaskGeneration),
            "3" => Ok(Phase::Review),
            "4" => Ok(Phase::Implementation),
            "5" => Ok(Phase::Integration),
            "5.5" => Ok(Phase::Documentation),
            "6" => Ok(Phase::Complete),
            other => Err(Error::InvalidPhase(other.to_string())),
        }
    }
}

// Wire format: integers for whole phases, the string "5.5" for the
// sub-phase. Deserialization also accepts the float 5.5 and numeric
// strings so hand-edited state files keep working.

impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Phase::Planning => serializer.serialize_u64(1),
            Phase::TaskGeneration => serializer.serialize_u64(2),
            Phase::Review => serializer.serialize_u64(3),
            Phase::Implementation => serializer.serialize_u64(4),
            Phase::Integration => serializer.serialize_u64(5),
            Phase::Documentation => serializer.serialize_str("5.5"),
            Phase::Complete => serializer.serialize_u64(6),
        }
    }
}

impl<'de> Deserialize<'de> for Phase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PhaseVisitor;

        impl Visitor<'_> for PhaseVisitor {
            type Value = Phase;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a phase number 1-6 or \"5.5\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Phase, E> {
                match v {
                    1 => Ok(Phase::Planning),
                    2 => Ok(Phase::TaskGeneration),
                    3 => Ok(Phase::Review),
                    4 => Ok(Phase::Implementation),
                    5 => Ok(Phase::Integration),
                    6 => Ok(Phase::Complete),
                    other => Err(E::custom(format!("unknown phase {other}"))),
                }
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Phase, E> {
                u64::try_from(v)
                    .map_err(|_| E::custom(format!("unknown phase {v}")))
                    .and_then(|v| self.visit_u64(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Phase, E> {
                if v == 5.5 {
                    Ok(Phase::Documentation)
                } else if v.fract() == 0.0 && v >= 1.0 && v <= 6.0 {
                    self.visit_u64(v as u64)
                } else {
                    Err(E::custom(format!("unknown phase {v}")))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Phase, E> {
                v.parse::<Phase>()
                    .map_err(|_| E::custom(format!("unknown phase '{v}'")))
            }
        }

        deserializer.deserialize_any(PhaseVisitor)
    }
}
