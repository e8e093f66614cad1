//! Logging initialization for the admin backend.
//!
//! All commands share the observability crate's central JSONL stream at
//! `~/.leadsite/logs/dev.jsonl`.

use crate::Paths;

/// Initialize the logging system.
///
/// This sets up tracing with:
/// - Structured JSONL output to the central log file under `paths`
/// - Log level from RUST_LOG env var or the provided default
/// - Service name included in every log line
///
/// # Example
///
/// ```ignore
/// init_logging("leadsite", "info", &paths);
/// tracing::info!("server started");
/// ```
pub fn init_logging(service_name: &str, level: &str, paths: &Paths) {
    let write_file = std::env::var("LEADSITE_LOG_FILE")
        .map(|raw| !matches!(raw.trim().to_ascii_lowercase().as_str(), "0" | "false" | "off"))
        .unwrap_or(true);

    observability::init_with_config(observability::LogConfig {
        service_name: service_name.into(),
        default_level: level.into(),
        log_path: Some(paths.log_file()),
        write_file,
        also_stderr: true,
    });
}
