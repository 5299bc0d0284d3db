//! Workflow engine: loads state, validates and applies transitions,
//! derives the next recommended action.
//!
//! Each invocation performs at most one mutation and persists it
//! through the store; nothing is committed until the write succeeds.

use std::fmt;
use std::path::Path;

use crate::agent::AgentStatus;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::phase::Phase;
use crate::state::ProjectState;
use crate::store::StateStore;
use crate::tlog;

pub struct WorkflowEngine {
    store: StateStore,
}

/// Pure snapshot of current progress for display.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub current_phase: Phase,
    pub completed_phases: Vec<Phase>,
    pub agents: Vec<AgentSummary>,
    pub version: u64,
}

#[derive(Debug, Clone)]
pub struct AgentSummary {
    pub id: u64,
    pub role: String,
    pub status: AgentStatus,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Current phase: {} ({})",
            self.current_phase,
            self.current_phase.name()
        )?;
        let completed: Vec<String> =
            self.completed_phases.iter().map(|p| p.to_string()).collect();
        writeln!(
            f,
            "Completed:     {}",
            if completed.is_empty() {
                "none".to_string()
            } else {
                completed.join(", ")
            }
        )?;
        if self.agents.is_empty() {
            write!(f, "Agents:        none")?;
        } else {
            write!(f, "Agents:")?;
            for agent in &self.agents {
                write!(f, "\n  #{:<3} {:<20} {}", agent.id, agent.role, agent.status)?;
            }
        }
        Ok(())
    }
}

/// A single next-action suggestion, derived purely from state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub message: String,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl WorkflowEngine {
    pub fn new(project_dir: &Path, config: &Config) -> Self {
        Self {
            store: StateStore::new(
                project_dir,
                config.effective_state_dir(),
                config.effective_lock_timeout(),
            ),
        }
    }

    /// Load the project's state, initializing and persisting a fresh
    /// one on first contact.
    pub fn load(&self) -> Result<ProjectState> {
        match self.store.load()? {
            Some(state) => Ok(state),
            None => {
                tlog!(
                    "Initializing workflow state at {}",
                    self.store.state_path().display()
                );
                let mut state = ProjectState::new();
                self.store.save(&mut state)?;
                Ok(state)
            }
        }
    }

    /// Pure read; no locking, no side effects.
    pub fn status(&self, state: &ProjectState) -> StatusReport {
        StatusReport {
            current_phase: state.current_phase,
            completed_phases: state.completed_phases.iter().copied().collect(),
            agents: state
                .agents
                .values()
                .map(|a| AgentSummary {
                    id: a.id,
                    role: a.role.clone(),
                    status: a.status,
                })
                .collect(),
            version: state.version,
        }
    }

    /// Move the project to `target`.
    ///
    /// Forward moves require every predecessor of `target` to be
    /// complete. Backward moves are explicit operator-directed
    /// rollbacks and skip predecessor validation by design.
    pub fn advance_phase(&self, state: &mut ProjectState, target: Phase) -> Result<()> {
        let current = state.current_phase;

        if target == current {
            return Err(Error::PhaseOrder(format!(
                "already in phase {target}"
            )));
        }

        if target.ordinal() > current.ordinal() {
            let missing: Vec<String> = target
                .predecessors()
                .iter()
                .filter(|p| !state.is_completed(**p))
                .map(|p| p.to_string())
                .collect();
            if !missing.is_empty() {
                return Err(Error::PhaseOrder(format!(
                    "cannot advance from phase {current} to {target}: phase(s) {} not complete",
                    missing.join(", ")
                )));
            }
            tlog!("Advancing phase {} -> {}", current, target);
        } else {
            tlog!("Rolling back phase {} -> {}", current, target);
        }

        state.current_phase = target;
        state.record_entered(target);
        self.store.save(state)
    }

    /// Mark `phase` complete. Only the current phase can be completed.
    pub fn complete_phase(&self, state: &mut ProjectState, phase: Phase) -> Result<()> {
        if phase != state.current_phase {
            return Err(Error::PhaseOrder(format!(
                "cannot complete phase {phase}: current phase is {}",
                state.current_phase
            )));
        }

        tlog!("Completing phase {}", phase);
        state.completed_phases.insert(phase);
        state.record_completed(phase);
        self.store.save(state)
    }

    /// Register an agent role and persist.
    pub fn register_agent(&self, state: &mut ProjectState, role: &str) -> Result<u64> {
        let id = state.register_agent(role)?.id;
        tlog!("Registered agent #{} role={}", id, role);
        self.store.save(state)?;
        Ok(id)
    }

    /// Record an agent progress report and persist.
    pub fn update_agent(
        &self,
        state: &mut ProjectState,
        id: u64,
        status: AgentStatus,
    ) -> Result<()> {
        state.update_agent_status(id, status)?;
        tlog!("Agent #{} -> {}", id, status);
        self.store.save(state)
    }

    /// Derive the single recommended next action. Total over every
    /// reachable state; never fails.
    pub fn next_step(&self, state: &ProjectState) -> Recommendation {
        next_step(state)
    }
}

/// The recommendation map itself, free-standing so it is trivially
/// testable without a store.
pub fn next_step(state: &ProjectState) -> Recommendation {
    let message = match state.current_phase {
        Phase::Planning => {
            "complete the project plan, then run `tempo complete 1`".to_string()
        }
        Phase::TaskGeneration => {
            "generate the task breakdown, then run `tempo complete 2`".to_string()
        }
        Phase::Review => "run review for phase 3, then run `tempo complete 3`".to_string(),
        Phase::Implementation => {
            let (done, total) = state.agent_progress();
            if total == 0 {
                "assign agent roles with `tempo agent add <role>`".to_string()
            } else if done < total {
                format!("waiting on {} of {} agents", total - done, total)
            } else {
                "all agents done - proceed to integration (phase 5)".to_string()
            }
        }
        Phase::Integration => {
            "finish integration, then advance to phase 6 (or 5.5 for documentation)"
                .to_string()
        }
        Phase::Documentation => {
            "finalize documentation, then advance to phase 6".to_string()
        }
        Phase::Complete => {
            "workflow complete; roll back to an earlier phase to start a new iteration"
                .to_string()
        }
    };
    Recommendation { message }
}
