//! Agent records for the parallel-work phase.

use serde::{Deserialize, Serialize};

use crate::phase::Phase;

/// Lifecycle status of an agent. `Done` is terminal: a done record is
/// never moved back, so history survives repeated iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    NotStarted,
    InProgress,
    Blocked,
    Done,
}

impl AgentStatus {
    pub fn is_terminal(self) -> bool {
        self == AgentStatus::Done
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentStatus::NotStarted => write!(f, "not_started"),
            AgentStatus::InProgress => write!(f, "in_progress"),
            AgentStatus::Blocked => write!(f, "blocked"),
            AgentStatus::Done => write!(f, "done"),
        }
    }
}

impl std::str::FromStr for AgentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(AgentStatus::NotStarted),
            "in_progress" => Ok(AgentStatus::InProgress),
            "blocked" => Ok(AgentStatus::Blocked),
            "done" => Ok(AgentStatus::Done),
            other => Err(format!(
                "invalid agent status '{other}' (expected not_started, in_progress, blocked or done)"
            )),
        }
    }
}

/// One agent spawned during the implementation phase.
///
/// Ids are positive integers assigned monotonically and never reused
/// for the life of the project state. Records are never deleted; a
/// finished agent is marked `done` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: u64,
    /// Free-text role label, e.g. "backend" or "api-tests".
    pub role: String,
    pub status: AgentStatus,
    /// Always the implementation phase; kept on the record so the
    /// state file stays self-describing.
    pub assigned_phase: Phase,
}

impl AgentRecord {
    pub fn new(id: u64, role: impl Into<String>) -> Self {
        Self {
            id,
            role: role.into(),
            status: AgentStatus::NotStarted,
            assigned_phase: Phase::Implementation,
        }
    }
}
