//! In-memory project workflow state and its wire representation.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::AgentRecord;
use crate::phase::Phase;

/// What a phase-history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseEvent {
    Entered,
    Completed,
}

impl std::fmt::Display for PhaseEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseEvent::Entered => write!(f, "entered"),
            PhaseEvent::Completed => write!(f, "completed"),
        }
    }
}

/// One immutable entry in the phase history. Append-only; never
/// mutated after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: Phase,
    pub status: PhaseEvent,
    pub timestamp: DateTime<Utc>,
}

/// Full workflow state for one project directory.
///
/// Owned durably by the `StateStore`, one state per project path.
/// Unknown fields found in the state file ride along in `extra` and
/// are written back on save, so newer tools can add fields without
/// breaking older ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectState {
    pub current_phase: Phase,
    pub completed_phases: BTreeSet<Phase>,
    pub phase_history: Vec<PhaseRecord>,
    #[serde(with = "agent_map")]
    pub agents: BTreeMap<u64, AgentRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency counter; bumped by the store on every
    /// successful save.
    pub version: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProjectState {
    /// Fresh state for a project that has never been tracked:
    /// phase 1, nothing completed, no history, no agents.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            current_phase: Phase::Planning,
            completed_phases: BTreeSet::new(),
            phase_history: Vec::new(),
            agents: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            version: 0,
            extra: serde_json::Map::new(),
        }
    }

    /// Append an "entered" record for `phase` and refresh `updated_at`.
    pub fn record_entered(&mut self, phase: Phase) {
        self.push_record(phase, PhaseEvent::Entered);
    }

    /// Append a "completed" record for `phase` and refresh `updated_at`.
    pub fn record_completed(&mut self, phase: Phase) {
        self.push_record(phase, PhaseEvent::Completed);
    }

    fn push_record(&mut self, phase: Phase, status: PhaseEvent) {
        let now = Utc::now();
        self.phase_history.push(PhaseRecord {
            phase,
            status,
            timestamp: now,
        });
        self.updated_at = now;
    }

    pub fn is_completed(&self, phase: Phase) -> bool {
        self.completed_phases.contains(&phase)
    }
}

impl Default for ProjectState {
    fn default() -> Self {
        Self::new()
    }
}

/// Agents are keyed by id on the wire as JSON strings. The `flatten`
/// used for `extra` buffers keys as strings during deserialization,
/// which defeats serde_json's built-in integer-key handling, so the
/// conversion is explicit here.
mod agent_map {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::agent::AgentRecord;

    pub fn serialize<S>(map: &BTreeMap<u64, AgentRecord>, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ser.collect_map(map.iter().map(|(id, record)| (id.to_string(), record)))
    }

    pub fn deserialize<'de, D>(de: D) -> Result<BTreeMap<u64, AgentRecord>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, AgentRecord>::deserialize(de)?;
        raw.into_iter()
            .map(|(key, record)| {
                key.parse::<u64>()
                    .map(|id| (id, record))
                    .map_err(|_| D::Error::custom(format!("invalid agent id key '{key}'")))
            })
            .collect()
    }
}
