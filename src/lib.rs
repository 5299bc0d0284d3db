pub mod agent;
pub mod config;
pub mod engine;
pub mod error;
pub mod log;
pub mod phase;
pub mod registry;
pub mod state;
pub mod store;

pub use agent::{AgentRecord, AgentStatus};
pub use config::Config;
pub use engine::{Recommendation, StatusReport, WorkflowEngine};
pub use error::{Error, Result};
pub use phase::Phase;
pub use state::{PhaseEvent, PhaseRecord, ProjectState};
pub use store::StateStore;
