//! Server initialization.

use crate::api;
use crate::app::state::{AppState, HttpLlmGateway};
use admin_config::{Config, Paths, StorageBackend};
use admin_store::{seed, LatentStore, MemoryStore, SqliteStore, Store};
use anyhow::Context;
use deployment_host::{
    DeploymentConfig, DeploymentService, LocalDevelopmentServer, LocalServerOptions,
    MonitoringService,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

fn erase<S: Store + 'static>(store: S, simulated_latency: bool) -> Arc<dyn Store> {
    if simulated_latency {
        Arc::new(LatentStore::new(store))
    } else {
        Arc::new(store)
    }
}

/// Open the configured data layer, seeding it when empty.
pub async fn open_store(config: &Config, paths: &Paths) -> anyhow::Result<Arc<dyn Store>> {
    let storage = &config.storage;
    let store = match storage.backend {
        StorageBackend::Memory => {
            let store = if storage.seed_on_start {
                MemoryStore::seeded().await?
            } else {
                MemoryStore::new()
            };
            info!(seeded = storage.seed_on_start, "In-memory store initialized");
            erase(store, storage.simulated_latency)
        }
        StorageBackend::Sqlite => {
            let path = paths.database_file();
            let store = SqliteStore::open(&path)
                .await
                .with_context(|| format!("failed to open database at {}", path.display()))?;
            if storage.seed_on_start && store.is_empty().await? {
                let summary = seed::populate(&store).await?;
                info!(leads = summary.leads, orders = summary.orders, "Seeded empty database");
            }
            info!(path = %path.display(), "SQLite store initialized");
            erase(store, storage.simulated_latency)
        }
    };
    Ok(store)
}

/// Wire the store, local host and deployment services together.
pub async fn build_state(config: Config, paths: &Paths) -> anyhow::Result<AppState> {
    paths.ensure_dirs()?;
    let store = open_store(&config, paths).await?;

    let local = &config.local_server;
    let server = Arc::new(LocalDevelopmentServer::new(LocalServerOptions {
        host: local.host.clone(),
        bind_address: local.bind_address.clone(),
        port: local.port,
    }));
    let deployments = Arc::new(DeploymentService::new(
        DeploymentConfig {
            base_path: config.deployment_base_path(paths),
            domain: config.deployment.domain.clone(),
        },
        server,
        Arc::new(MonitoringService::new()),
    ));

    Ok(AppState::new(
        config,
        store,
        Arc::new(HttpLlmGateway),
        deployments,
    ))
}

/// Run the admin API and the local site host until Ctrl-C.
pub async fn run_server(
    config: Config,
    paths: Paths,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info!(
        storage = config.storage.backend.as_str(),
        llm_provider = %config.llm.default_provider,
        base_dir = %paths.base_dir().display(),
        "Starting Leadsite admin server"
    );

    let state = build_state(config, &paths).await?;
    let local_server = state.deployments.server().clone();
    let site_addr = local_server.start().await?;
    info!(addr = %site_addr, "Local development server started");

    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind admin API on {addr}"))?;
    info!(addr = %addr, "Admin API listening");

    let app = api::router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("admin API server error")?;

    local_server.stop().await;
    info!("Leadsite admin server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
