//! File system paths for the admin backend.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Runtime directory name under the home directory.
const BASE_DIR_NAME: &str = ".leadsite";
/// SQLite database filename.
const DATABASE_FILE_NAME: &str = "leadsite.sqlite";
/// Central JSONL log filename.
const LOG_FILE_NAME: &str = "dev.jsonl";

/// Manages file system paths for the backend.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for runtime files (~/.leadsite)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.leadsite`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(BASE_DIR_NAME),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.leadsite).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.leadsite/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the database file path (~/.leadsite/leadsite.sqlite).
    pub fn database_file(&self) -> PathBuf {
        self.base_dir.join(DATABASE_FILE_NAME)
    }

    /// Get the default deployments directory (~/.leadsite/deployments).
    pub fn deployments_dir(&self) -> PathBuf {
        self.base_dir.join("deployments")
    }

    /// Get the logs directory (~/.leadsite/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Get the central log file path (~/.leadsite/logs/dev.jsonl).
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join(LOG_FILE_NAME)
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        std::fs::create_dir_all(self.deployments_dir())?;
        Ok(())
    }
}
