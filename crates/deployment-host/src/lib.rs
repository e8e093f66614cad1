//! Deployment subsystem.
//!
//! - [`DeploymentService`]: writes a site to `{base}/{deployment_id}/` and
//!   registers it with the local host or computes its production URL
//! - [`MonitoringService`]: bounded in-memory log and metrics buffer
//! - [`LocalDevelopmentServer`]: serves registered sites by subdomain

mod error;
pub mod local_server;
mod monitoring;
mod service;
mod types;

pub use error::{DeployError, DeployResult};
pub use local_server::{
    extract_subdomain, LocalDevelopmentServer, LocalServerOptions, SiteRegistry, RUNNING_BANNER,
};
pub use monitoring::{MonitoringService, MAX_LOGS, MAX_RECENT};
pub use service::{
    slugify_subdomain, validate_subdomain, DeployOptions, DeploymentConfig, DeploymentService,
    SiteBundle,
};
pub use types::{
    DeploymentLog, DeploymentMetadata, DeploymentMetrics, DeploymentResult, EnvironmentCounts,
    LogLevel, LogQuery, ResultStatus, StatusCounts,
};
