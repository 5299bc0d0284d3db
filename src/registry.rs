//! Agent registry operations over the project state.
//!
//! Agents exist only in the implementation phase (4). Ids are issued
//! strictly increasing and are never reused, even across rollback
//! iterations, because records are retired with `done` rather than
//! deleted.

use crate::agent::{AgentRecord, AgentStatus};
use crate::error::{Error, Result};
use crate::phase::Phase;
use crate::state::ProjectState;

impl ProjectState {
    /// Assign a role, creating a `not_started` record with the next
    /// unused id. Only valid while the implementation phase is current.
    pub fn register_agent(&mut self, role: &str) -> Result<&AgentRecord> {
        if self.current_phase != Phase::Implementation {
            return Err(Error::PhaseMismatch {
                expected: Phase::Implementation,
                current: self.current_phase,
            });
        }

        let id = self.next_agent_id();
        self.agents.insert(id, AgentRecord::new(id, role));
        Ok(&self.agents[&id])
    }

    /// Record a progress report for agent `id`.
    ///
    /// `done` is terminal: once there, only another `done` report is
    /// accepted (idempotent no-op).
    pub fn update_agent_status(&mut self, id: u64, status: AgentStatus) -> Result<()> {
        let record = self
            .agents
            .get_mut(&id)
            .ok_or(Error::UnknownAgent { id })?;

        if record.status.is_terminal() && !status.is_terminal() {
            return Err(Error::InvalidStatusTransition { id, to: status });
        }

        record.status = status;
        Ok(())
    }

    /// True iff every registered agent is `done`. Vacuously true with
    /// no agents; callers deciding whether to proceed to integration
    /// check for an empty registry first.
    pub fn all_agents_done(&self) -> bool {
        self.agents.values().all(|a| a.status == AgentStatus::Done)
    }

    /// `(done, total)` agent counts for progress reporting.
    pub fn agent_progress(&self) -> (usize, usize) {
        let done = self
            .agents
            .values()
            .filter(|a| a.status == AgentStatus::Done)
            .count();
        (done, self.agents.len())
    }

    /// Smallest positive id never handed out. Records are never
    /// deleted, so max + 1 cannot collide with a historical id.
    fn next_agent_id(&self) -> u64 {
        self.agents.keys().next_back().copied().unwrap_or(0) + 1
    }
}
