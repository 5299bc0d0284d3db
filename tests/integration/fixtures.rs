//! Test fixtures for integration tests.
//!
//! Provides a temporary project directory with an engine wired to it,
//! plus helpers for driving the workflow to a given phase.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use tempo::config::Config;
use tempo::engine::WorkflowEngine;
use tempo::phase::Phase;
use tempo::state::ProjectState;

/// A test project rooted in a temporary directory.
pub struct TestProject {
    /// Keeps the directory alive for the test's duration.
    pub temp_dir: TempDir,
    /// Path to the project root.
    pub path: PathBuf,
}

impl TestProject {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().to_path_buf();
        Self { temp_dir, path }
    }

    /// Build an engine over this project with default settings.
    pub fn engine(&self) -> WorkflowEngine {
        WorkflowEngine::new(&self.path, &Config::default())
    }

    /// Build an engine with a custom lock timeout.
    pub fn engine_with_timeout(&self, timeout_ms: u64) -> WorkflowEngine {
        let config = Config {
            lock_timeout_ms: Some(timeout_ms),
            state_dir: None,
        };
        WorkflowEngine::new(&self.path, &config)
    }

    /// Path to the state file the engine writes.
    pub fn state_path(&self) -> PathBuf {
        self.path.join(".tempo").join("state.json")
    }
}

/// Complete every phase strictly before `target` along the happy path,
/// leaving the state positioned in the last completed phase. Phase 5.5
/// is skipped; it is optional and never required downstream.
pub fn drive_to(engine: &WorkflowEngine, state: &mut ProjectState, target: Phase) {
    for phase in Phase::ALL {
        if phase.ordinal() >= target.ordinal() {
            break;
        }
        if phase == Phase::Documentation {
            continue;
        }
        if state.current_phase != phase {
            engine
                .advance_phase(state, phase)
                .unwrap_or_else(|e| panic!("advance to {} failed: {}", phase, e));
        }
        engine
            .complete_phase(state, phase)
            .unwrap_or_else(|e| panic!("complete {} failed: {}", phase, e));
    }
}

/// Read the raw state file for on-disk assertions.
pub fn read_state_json(path: &Path) -> serde_json::Value {
    let raw = std::fs::read_to_string(path).expect("state file missing");
    serde_json::from_str(&raw).expect("state file is not valid JSON")
}
