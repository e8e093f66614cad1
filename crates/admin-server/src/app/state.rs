//! Shared request state.

use crate::api::{ApiError, ApiResult};
use admin_config::Config;
use admin_store::{Id, Store};
use async_trait::async_trait;
use deployment_host::{DeploymentService, MonitoringService};
use llm_content::{LlmBackend, LlmClient, LlmConfig, LlmResult, ModelInfo};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Builds provider clients from a resolved config.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    fn backend(&self, config: LlmConfig) -> Arc<dyn LlmBackend>;
    async fn list_models(&self, config: LlmConfig) -> LlmResult<Vec<ModelInfo>>;
}

/// Gateway that talks to the real provider APIs.
pub struct HttpLlmGateway;

#[async_trait]
impl LlmGateway for HttpLlmGateway {
    fn backend(&self, config: LlmConfig) -> Arc<dyn LlmBackend> {
        Arc::new(LlmClient::new(config))
    }

    async fn list_models(&self, config: LlmConfig) -> LlmResult<Vec<ModelInfo>> {
        LlmClient::new(config).list_models().await
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn Store>,
    pub llm: Arc<dyn LlmGateway>,
    pub deployments: Arc<DeploymentService>,
    pub monitoring: Arc<MonitoringService>,
    /// Deployment record id -> hosted deployment id.
    pub published: Arc<Mutex<HashMap<Id, String>>>,
    /// Deployment records with a publish in flight.
    pub publishing: Arc<Mutex<HashSet<Id>>>,
}

/// Holds a deployment record busy until dropped.
pub struct PublishGuard {
    publishing: Arc<Mutex<HashSet<Id>>>,
    id: Id,
}

impl Drop for PublishGuard {
    fn drop(&mut self) {
        self.publishing.lock().remove(&self.id);
    }
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn Store>,
        llm: Arc<dyn LlmGateway>,
        deployments: Arc<DeploymentService>,
    ) -> Self {
        let monitoring = deployments.monitoring().clone();
        Self {
            config: Arc::new(config),
            store,
            llm,
            deployments,
            monitoring,
            published: Arc::new(Mutex::new(HashMap::new())),
            publishing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Claim a deployment record for publishing, or `None` if another
    /// request already holds it.
    pub fn begin_publish(&self, id: Id) -> Option<PublishGuard> {
        let claimed = self.publishing.lock().insert(id);
        claimed.then(|| PublishGuard {
            publishing: self.publishing.clone(),
            id,
        })
    }

    /// Provider config by name, or the configured default when `provider` is blank.
    pub fn llm_config(&self, provider: Option<&str>) -> ApiResult<LlmConfig> {
        let name = provider
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.config.llm.default_provider);
        LlmConfig::resolve(&self.config.llm, name).map_err(ApiError::from)
    }

    pub fn llm_backend(&self, provider: Option<&str>) -> ApiResult<Arc<dyn LlmBackend>> {
        Ok(self.llm.backend(self.llm_config(provider)?))
    }
}
