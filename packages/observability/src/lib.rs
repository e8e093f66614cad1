//! # Observability
//!
//! Centralized logging layer for the Leadsite admin backend.
//!
//! Services call `observability::init()` once at startup and use standard
//! `tracing` macros everywhere else. They never know where logs end up.
//!
//! ## File sink
//!
//! When a log path is configured (the default resolves to
//! `~/.leadsite/logs/dev.jsonl`), every event is written as one JSON object
//! per line:
//!
//! - `tail -f ~/.leadsite/logs/dev.jsonl | jq` for pretty JSON
//! - `lnav ~/.leadsite/logs/dev.jsonl` for interactive exploration
//!
//! Fields that look like credentials (`api_key`, `authorization`, ...) are
//! redacted before they are written.
//!
//! ## Usage
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "leadsite".into(),
//!     default_level: "debug".into(),
//!     also_stderr: true,
//!     ..Default::default()
//! });
//! tracing::info!("server ready");
//! ```

mod file_sink;
mod json_layer;

use std::path::PathBuf;

pub use json_layer::{is_sensitive_field, LogEntry, REDACTED};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service (e.g., "leadsite", "seed").
    /// Included in every log line for filtering.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Optional JSONL log file path.
    /// `None` falls back to `~/.leadsite/logs/dev.jsonl` when `write_file` is set.
    pub log_path: Option<PathBuf>,

    /// Write structured JSONL to the log file.
    pub write_file: bool,

    /// Also emit logs to stderr for immediate feedback.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            write_file: true,
            also_stderr: false,
        }
    }
}

/// Initialize the logging layer with default settings.
///
/// ```rust,ignore
/// fn main() {
///     observability::init("leadsite");
///     tracing::info!("ready");
/// }
/// ```
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize the logging layer with custom configuration.
///
/// Calling this more than once is harmless: the first subscriber wins.
pub fn init_with_config(config: LogConfig) {
    if config.write_file {
        match file_sink::init_file_subscriber(&config) {
            Ok(()) => return,
            Err(e) => eprintln!("observability: file sink unavailable, using stderr: {e}"),
        }
    }

    use tracing_subscriber::util::SubscriberInitExt;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.default_level)),
        )
        .with_target(true)
        .compact()
        .finish()
        .try_init();
}

/// Resolve the default central log path (`~/.leadsite/logs/dev.jsonl`).
pub fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".leadsite").join("logs").join("dev.jsonl"))
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.service_name, "unknown");
        assert_eq!(config.default_level, "info");
        assert!(config.log_path.is_none());
        assert!(config.write_file);
        assert!(!config.also_stderr);
    }

    #[test]
    fn test_default_log_path_shape() {
        if let Some(path) = default_log_path() {
            assert!(path.ends_with(".leadsite/logs/dev.jsonl"));
        }
    }
}
