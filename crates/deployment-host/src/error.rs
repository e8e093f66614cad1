//! Deployment error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Subdomain is not a usable DNS label
    #[error("Invalid subdomain: {0}")]
    InvalidSubdomain(String),

    /// Site directory does not exist
    #[error("Deployment path {} does not exist", .0.display())]
    MissingPath(PathBuf),

    /// Subdomain is already served from another directory
    #[error("Subdomain {0} is already in use")]
    SubdomainTaken(String),

    /// Local server could not start or is in the wrong state
    #[error("Server error: {0}")]
    Server(String),
}

pub type DeployResult<T> = Result<T, DeployError>;
