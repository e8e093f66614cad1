//! Core configuration, paths, and logging setup for the Leadsite backend.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DeploymentSettings, LlmSettings, LocalServerConfig, ProviderSettings, ServerConfig,
    StorageBackend, StorageConfig, DEFAULT_LOG_LEVEL,
};
pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use paths::Paths;
