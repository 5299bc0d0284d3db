use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::agent::AgentStatus;
use crate::phase::Phase;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Invalid phase: '{0}' (expected 1-6 or 5.5)")]
    InvalidPhase(String),

    #[error("Phase order violation: {0}")]
    PhaseOrder(String),

    #[error("Agents can only be registered during phase {expected}, current phase is {current}")]
    PhaseMismatch { expected: Phase, current: Phase },

    #[error("Unknown agent: {id}")]
    UnknownAgent { id: u64 },

    #[error("Agent {id} is done; cannot move it to '{to}'")]
    InvalidStatusTransition { id: u64, to: AgentStatus },

    #[error("Corrupt state file {path}: {reason}")]
    CorruptState { path: PathBuf, reason: String },

    #[error("State file changed on disk (expected version {expected}, found {found}); reload and retry")]
    ConcurrentModification { expected: u64, found: u64 },

    #[error("Could not acquire state lock {path} within {waited:?}")]
    LockTimeout { path: PathBuf, waited: Duration },
}

pub type Result<T> = std::result::Result<T, Error>;
