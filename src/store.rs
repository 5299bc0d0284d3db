//! Durable, file-based persistence for one project's workflow state.
//!
//! Layout, per project directory:
//!
//! ```text
//! <project>/
//!   .tempo/
//!     state.json        the single source of truth
//!     state.json.bak    previous version, kept on every save
//!     state.json.lock   advisory lock, held only across a save
//! ```
//!
//! Independent invocations may race on the same file, so every save
//! takes the lock, re-checks the on-disk `version` against the loaded
//! copy, and only then writes (tmp file + rename, same directory so
//! the rename stays on one filesystem).

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::state::ProjectState;
use crate::{tlog_debug, tlog_warn};

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct StateStore {
    state_path: PathBuf,
    lock_timeout: Duration,
}

impl StateStore {
    /// Store for the state file under `<project>/<state_dir>/state.json`.
    pub fn new(project_dir: &Path, state_dir: &str, lock_timeout: Duration) -> Self {
        Self {
            state_path: project_dir.join(state_dir).join("state.json"),
            lock_timeout,
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Read the persisted state. `Ok(None)` when no file exists yet;
    /// a file that exists but does not parse is corrupt, not absent.
    pub fn load(&self) -> Result<Option<ProjectState>> {
        tlog_debug!("StateStore::load path={}", self.state_path.display());
        if !self.state_path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.state_path)?;
        let state = serde_json::from_str(&contents).map_err(|e| Error::CorruptState {
            path: self.state_path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(state))
    }

    /// Commit `state` to disk.
    ///
    /// Takes the advisory lock with a bounded wait, verifies the
    /// on-disk version still matches `state.version`, bumps the
    /// version, and replaces the file atomically. The mutation is not
    /// committed until the rename succeeds; on any error the caller's
    /// in-memory changes are simply not persisted.
    pub fn save(&self, state: &mut ProjectState) -> Result<()> {
        if let Some(parent) = self.state_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let _lock = LockFile::acquire(
            self.state_path.with_extension("json.lock"),
            self.lock_timeout,
        )?;

        // Compare-and-swap on version: someone else may have saved
        // since this state was loaded.
        let on_disk = self.disk_version()?;
        if on_disk != state.version {
            return Err(Error::ConcurrentModification {
                expected: state.version,
                found: on_disk,
            });
        }

        state.version += 1;
        let contents = serde_json::to_string_pretty(&*state)?;

        if self.state_path.exists() {
            let backup_path = self.state_path.with_extension("json.bak");
            fs::copy(&self.state_path, &backup_path)?;
        }

        let temp_path = self.state_path.with_extension("json.tmp");
        fs::write(&temp_path, &contents)?;
        fs::rename(&temp_path, &self.state_path)?;
        tlog_debug!(
            "State saved: {} version={}",
            self.state_path.display(),
            state.version
        );
        Ok(())
    }

    /// Version currently on disk; 0 when no file exists (matching a
    /// fresh state that has never been saved).
    fn disk_version(&self) -> Result<u64> {
        match self.load()? {
            Some(state) => Ok(state.version),
            None => Ok(0),
        }
    }
}

/// Advisory lock via an exclusively-created lock file. Released on
/// drop; a crashed process leaves a stale file behind, which the
/// bounded wait turns into a `LockTimeout` the operator can act on.
struct LockFile {
    path: PathBuf,
}

impl LockFile {
    fn acquire(path: PathBuf, timeout: Duration) -> Result<Self> {
        let start = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    // Pid is informational, for inspecting stale locks
                    let _ = write!(file, "{}", std::process::id());
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if start.elapsed() >= timeout {
                        tlog_warn!("Lock timeout on {}", path.display());
                        return Err(Error::LockTimeout {
                            path,
                            waited: timeout,
                        });
                    }
                    std::thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tlog_warn!("Failed to remove lock file {}: {}", self.path.display(), e);
        }
    }
}
