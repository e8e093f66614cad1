//! Writes generated sites to disk and makes them reachable.

use crate::local_server::LocalDevelopmentServer;
use crate::monitoring::MonitoringService;
use crate::types::{DeploymentMetadata, DeploymentResult, LogLevel, ResultStatus};
use crate::{DeployError, DeployResult};
use admin_store::{Environment, Id};
use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tracing::{error, info, warn};
use website_generator::GeneratedWebsite;

const MAX_LABEL_LEN: usize = 63;
const RESERVED_SUBDOMAINS: [&str; 2] = ["localhost", "www"];
const MANIFEST_FILE: &str = "deployment.json";

/// Files that make up a deployable site.
#[derive(Debug, Clone, Default)]
pub struct SiteBundle {
    pub html: String,
    pub css: String,
}

impl From<&GeneratedWebsite> for SiteBundle {
    fn from(website: &GeneratedWebsite) -> Self {
        Self {
            html: website.html.clone(),
            css: website.css.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    pub subdomain: String,
    pub environment: Environment,
    /// Production URL override.
    pub base_url: Option<String>,
    pub lead_id: Option<Id>,
    pub template_id: Option<Id>,
}

#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    /// Root directory; each deployment gets `{base_path}/{deployment_id}`.
    pub base_path: PathBuf,
    /// Production URLs are `https://{subdomain}.{domain}`.
    pub domain: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest<'a> {
    deployment_id: &'a str,
    subdomain: &'a str,
    environment: Environment,
    #[serde(skip_serializing_if = "Option::is_none")]
    lead_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template_id: Option<Id>,
    created_at: chrono::DateTime<Utc>,
    files: [&'a str; 2],
}

/// Check that `subdomain` is a lowercase DNS label we can route.
pub fn validate_subdomain(subdomain: &str) -> DeployResult<()> {
    let invalid = |reason: &str| Err(DeployError::InvalidSubdomain(format!("{subdomain:?}: {reason}")));

    if subdomain.is_empty() || subdomain.len() > MAX_LABEL_LEN {
        return invalid("must be 1-63 characters");
    }
    if !subdomain
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return invalid("only a-z, 0-9 and '-' are allowed");
    }
    if subdomain.starts_with('-') || subdomain.ends_with('-') {
        return invalid("must not start or end with '-'");
    }
    if RESERVED_SUBDOMAINS.contains(&subdomain) {
        return invalid("reserved");
    }
    Ok(())
}

/// Derive a subdomain from a company name: lowercase alphanumerics only.
///
/// Falls back to `site` when nothing usable remains.
pub fn slugify_subdomain(company: &str) -> String {
    let slug: String = company
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(MAX_LABEL_LEN)
        .collect();
    if slug.is_empty() || RESERVED_SUBDOMAINS.contains(&slug.as_str()) {
        format!("{}site", slug)
    } else {
        slug
    }
}

fn generate_deployment_id() -> String {
    format!("deploy-{}", ulid::Ulid::new().to_string().to_lowercase())
}

fn is_deployment_id(id: &str) -> bool {
    id.strip_prefix("deploy-")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_alphanumeric()))
}

pub struct DeploymentService {
    config: DeploymentConfig,
    server: Arc<LocalDevelopmentServer>,
    monitoring: Arc<MonitoringService>,
    /// deployment id -> subdomain
    active: RwLock<HashMap<String, String>>,
}

impl DeploymentService {
    pub fn new(
        config: DeploymentConfig,
        server: Arc<LocalDevelopmentServer>,
        monitoring: Arc<MonitoringService>,
    ) -> Self {
        Self {
            config,
            server,
            monitoring,
            active: RwLock::new(HashMap::new()),
        }
    }

    pub fn monitoring(&self) -> &Arc<MonitoringService> {
        &self.monitoring
    }

    pub fn server(&self) -> &Arc<LocalDevelopmentServer> {
        &self.server
    }

    pub fn deployment_dir(&self, deployment_id: &str) -> PathBuf {
        self.config.base_path.join(deployment_id)
    }

    /// Deploy `site`. Failures are reported in the result, and every result
    /// is logged to monitoring.
    pub async fn deploy_website(&self, site: &SiteBundle, options: &DeployOptions) -> DeploymentResult {
        let started = Instant::now();
        let deployment_id = generate_deployment_id();

        let outcome = self.try_deploy(&deployment_id, site, options).await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let metadata = Some(DeploymentMetadata {
            subdomain: options.subdomain.clone(),
            template_id: options.template_id,
            lead_id: options.lead_id,
        });

        let result = match outcome {
            Ok(url) => {
                info!(
                    deployment_id = %deployment_id,
                    environment = options.environment.as_str(),
                    url = %url,
                    duration_ms,
                    "Deployment complete"
                );
                DeploymentResult {
                    deployment_id,
                    success: true,
                    status: ResultStatus::Deployed,
                    url,
                    environment: options.environment,
                    timestamp: Utc::now(),
                    error: None,
                    metadata,
                    duration_ms: Some(duration_ms),
                }
            }
            Err(err) => {
                error!(deployment_id = %deployment_id, error = %err, "Deployment failed");
                self.discard(&deployment_id).await;
                DeploymentResult {
                    deployment_id,
                    success: false,
                    status: ResultStatus::Failed,
                    url: String::new(),
                    environment: options.environment,
                    timestamp: Utc::now(),
                    error: Some(err.to_string()),
                    metadata,
                    duration_ms: Some(duration_ms),
                }
            }
        };

        self.monitoring.log_deployment(&result);
        result
    }

    async fn try_deploy(
        &self,
        deployment_id: &str,
        site: &SiteBundle,
        options: &DeployOptions,
    ) -> DeployResult<String> {
        validate_subdomain(&options.subdomain)?;

        let root = self.deployment_dir(deployment_id);
        let public = root.join("public");
        fs::create_dir_all(&public).await?;
        fs::create_dir_all(root.join("assets")).await?;
        fs::write(public.join("index.html"), &site.html).await?;
        fs::write(public.join("styles.css"), &site.css).await?;

        let manifest = Manifest {
            deployment_id,
            subdomain: &options.subdomain,
            environment: options.environment,
            lead_id: options.lead_id,
            template_id: options.template_id,
            created_at: Utc::now(),
            files: ["public/index.html", "public/styles.css"],
        };
        fs::write(root.join(MANIFEST_FILE), serde_json::to_vec_pretty(&manifest)?).await?;

        let url = match options.environment {
            Environment::Development => {
                self.server.registry().add_site(&options.subdomain, &public)?;
                self.server.url_for(&options.subdomain)
            }
            Environment::Production => options
                .base_url
                .clone()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| format!("https://{}.{}", options.subdomain, self.config.domain)),
        };

        self.active
            .write()
            .insert(deployment_id.to_string(), options.subdomain.clone());
        Ok(url)
    }

    async fn discard(&self, deployment_id: &str) {
        let root = self.deployment_dir(deployment_id);
        if let Err(err) = fs::remove_dir_all(&root).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %root.display(), error = %err, "Failed to clean up deployment directory");
            }
        }
    }

    /// Unregister and delete a deployment. `false` when it is unknown.
    pub async fn remove_deployment(&self, deployment_id: &str) -> DeployResult<bool> {
        if !is_deployment_id(deployment_id) {
            return Ok(false);
        }

        let root = self.deployment_dir(deployment_id);
        let subdomain = self.active.write().remove(deployment_id);
        let on_disk = fs::try_exists(&root).await?;
        if subdomain.is_none() && !on_disk {
            return Ok(false);
        }

        if let Some(subdomain) = subdomain {
            let public = root.join("public");
            let registry = self.server.registry();
            if registry.site_path(&subdomain).as_deref() == Some(Path::new(&public)) {
                registry.remove_site(&subdomain);
            }
        }
        if on_disk {
            fs::remove_dir_all(&root).await?;
        }

        self.monitoring
            .record(deployment_id, LogLevel::Info, "Deployment removed");
        info!(deployment_id, "Deployment removed");
        Ok(true)
    }

    pub fn get_deployment_status(&self, deployment_id: &str) -> Option<DeploymentResult> {
        self.monitoring.get_deployment_status(deployment_id)
    }
}
