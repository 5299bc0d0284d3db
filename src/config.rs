use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::{tlog_debug, Error, Result};

const DEFAULT_LOCK_TIMEOUT_MS: u64 = 2000;
const DEFAULT_STATE_DIR: &str = ".tempo";

/// User-level settings read from ~/.tempo/tempo.toml. Every field is
/// optional; a missing file means defaults across the board.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub lock_timeout_ms: Option<u64>,
    pub state_dir: Option<String>,
}

impl Config {
    pub fn tempo_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".tempo"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::tempo_dir()?.join("tempo.toml"))
    }

    /// How long a command will wait for another process to release the
    /// state lock.
    pub fn effective_lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms.unwrap_or(DEFAULT_LOCK_TIMEOUT_MS))
    }

    /// Name of the per-project directory holding state.json.
    pub fn effective_state_dir(&self) -> &str {
        self.state_dir.as_deref().unwrap_or(DEFAULT_STATE_DIR)
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        tlog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            tlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(&path)?)?;
        tlog_debug!(
            "Config loaded: lock_timeout_ms={:?}, state_dir={:?}",
            config.lock_timeout_ms,
            config.state_dir
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let tempo_dir = Self::tempo_dir()?;
        if !tempo_dir.exists() {
            fs::create_dir_all(&tempo_dir)?;
        }
        let path = Self::config_path()?;
        fs::write(&path, toml::to_string_pretty(self)?)?;
        tlog_debug!("Config saved to {}", path.display());
        Ok(())
    }
}
