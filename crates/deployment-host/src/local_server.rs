//! Local multi-tenant site host.
//!
//! Requests are routed by the first label of the `Host` header, so
//! `http://doebakery.localhost:3001/` serves the files registered for
//! `doebakery`. Plain HTTP only.

use crate::{DeployError, DeployResult};
use axum::extract::{Request, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{info, warn};

pub const RUNNING_BANNER: &str = "Local Development Server Running";

/// Subdomain -> site directory map, shared between the service and the router.
#[derive(Clone, Default)]
pub struct SiteRegistry {
    sites: Arc<RwLock<HashMap<String, PathBuf>>>,
}

impl SiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering the same directory twice is a no-op; a subdomain held by
    /// another directory is refused.
    pub fn add_site(&self, subdomain: &str, path: impl AsRef<Path>) -> DeployResult<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DeployError::MissingPath(path.to_path_buf()));
        }
        let key = subdomain.to_lowercase();
        {
            let mut sites = self.sites.write();
            if sites.get(&key).is_some_and(|owned| owned != path) {
                return Err(DeployError::SubdomainTaken(key));
            }
            sites.insert(key, path.to_path_buf());
        }
        info!(subdomain, path = %path.display(), "Site registered");
        Ok(())
    }

    /// Returns true if the subdomain was registered.
    pub fn remove_site(&self, subdomain: &str) -> bool {
        let removed = self.sites.write().remove(&subdomain.to_lowercase()).is_some();
        if removed {
            info!(subdomain, "Site removed");
        }
        removed
    }

    pub fn site_path(&self, subdomain: &str) -> Option<PathBuf> {
        self.sites.read().get(&subdomain.to_lowercase()).cloned()
    }

    /// Registered sites, sorted by subdomain.
    pub fn list_sites(&self) -> Vec<(String, PathBuf)> {
        let mut sites: Vec<_> = self
            .sites
            .read()
            .iter()
            .map(|(sub, path)| (sub.clone(), path.clone()))
            .collect();
        sites.sort();
        sites
    }
}

/// Subdomain part of a `Host` header value.
///
/// `localhost`, `www`, single-label hosts and IP literals have none.
pub fn extract_subdomain(host: &str) -> Option<String> {
    let host = host.trim();
    if host.starts_with('[') {
        return None;
    }
    let name = host.split(':').next()?.trim_end_matches('.').to_lowercase();
    if name.parse::<IpAddr>().is_ok() {
        return None;
    }

    let mut labels = name.split('.');
    let first = labels.next()?;
    labels.next()?;
    if first.is_empty() || first == "localhost" || first == "www" {
        return None;
    }
    Some(first.to_string())
}

/// Router serving registered sites by subdomain.
pub fn router(registry: SiteRegistry) -> Router {
    Router::new().fallback(route_request).with_state(registry)
}

async fn route_request(State(registry): State<SiteRegistry>, request: Request) -> Response {
    let subdomain = request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_subdomain);

    if let Some(dir) = subdomain.as_deref().and_then(|sub| registry.site_path(sub)) {
        return match ServeDir::new(dir).oneshot(request).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        };
    }

    if request.method() == Method::GET && request.uri().path() == "/" {
        return RUNNING_BANNER.into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}

#[derive(Debug, Clone)]
pub struct LocalServerOptions {
    /// Host name used in site URLs.
    pub host: String,
    pub bind_address: String,
    /// 0 picks a free port.
    pub port: u16,
}

impl Default for LocalServerOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            bind_address: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

struct RunningServer {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

pub struct LocalDevelopmentServer {
    options: LocalServerOptions,
    registry: SiteRegistry,
    running: Mutex<Option<RunningServer>>,
}

impl LocalDevelopmentServer {
    pub fn new(options: LocalServerOptions) -> Self {
        Self::with_registry(options, SiteRegistry::new())
    }

    pub fn with_registry(options: LocalServerOptions, registry: SiteRegistry) -> Self {
        Self {
            options,
            registry,
            running: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    pub fn options(&self) -> &LocalServerOptions {
        &self.options
    }

    /// Bind and serve in the background. Returns the bound address.
    pub async fn start(&self) -> DeployResult<SocketAddr> {
        if let Some(addr) = self.local_addr() {
            return Ok(addr);
        }

        let bind = format!("{}:{}", self.options.bind_address, self.options.port);
        let listener = TcpListener::bind(&bind)
            .await
            .map_err(|e| DeployError::Server(format!("failed to bind {bind}: {e}")))?;
        let addr = listener.local_addr()?;

        let app = router(self.registry.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(err) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
                warn!(error = %err, "Local development server exited with error");
            }
        });

        let mut running = self.running.lock();
        if let Some(existing) = running.as_ref() {
            // Lost a start race; keep the first listener.
            let addr = existing.addr;
            drop(running);
            task.abort();
            return Ok(addr);
        }
        *running = Some(RunningServer {
            addr,
            shutdown_tx,
            task,
        });
        info!(%addr, "Local development server running");
        Ok(addr)
    }

    /// Stop serving and wait for in-flight requests. No-op when stopped.
    pub async fn stop(&self) {
        let Some(server) = self.running.lock().take() else {
            return;
        };
        let _ = server.shutdown_tx.send(());
        if let Err(err) = server.task.await {
            warn!(error = %err, "Local development server task failed");
        }
        info!("Local development server stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().as_ref().map(|server| server.addr)
    }

    /// Port sites are reachable on: the bound one when running.
    pub fn port(&self) -> u16 {
        self.local_addr()
            .map(|addr| addr.port())
            .unwrap_or(self.options.port)
    }

    pub fn url_for(&self, subdomain: &str) -> String {
        format!("http://{}.{}:{}", subdomain, self.options.host, self.port())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use tempfile::tempdir;

    fn site(dir: &Path, html: &str) -> PathBuf {
        let public = dir.join("public");
        std::fs::create_dir_all(&public).unwrap();
        std::fs::write(public.join("index.html"), html).unwrap();
        std::fs::write(public.join("styles.css"), "body{}").unwrap();
        public
    }

    async fn get(app: Router, host: &str, path: &str) -> (StatusCode, String) {
        let request = axum::http::Request::builder()
            .uri(path)
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[test]
    fn subdomain_extraction() {
        assert_eq!(extract_subdomain("doebakery.localhost:3001").as_deref(), Some("doebakery"));
        assert_eq!(extract_subdomain("Smith.Example.com").as_deref(), Some("smith"));
        assert_eq!(extract_subdomain("localhost:3001"), None);
        assert_eq!(extract_subdomain("www.example.com"), None);
        assert_eq!(extract_subdomain("intranet"), None);
        assert_eq!(extract_subdomain("127.0.0.1:3001"), None);
        assert_eq!(extract_subdomain("[::1]:3001"), None);
    }

    #[test]
    fn registry_requires_existing_path() {
        let dir = tempdir().unwrap();
        let registry = SiteRegistry::new();

        let missing = registry.add_site("ghost", dir.path().join("nope"));
        assert!(matches!(missing, Err(DeployError::MissingPath(_))));

        registry.add_site("Acme", dir.path()).unwrap();
        assert_eq!(registry.site_path("acme"), Some(dir.path().to_path_buf()));
        assert_eq!(registry.list_sites().len(), 1);
        assert!(registry.remove_site("acme"));
        assert!(!registry.remove_site("acme"));
        assert!(registry.site_path("acme").is_none());
    }

    #[test]
    fn registry_rejects_subdomain_owned_elsewhere() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        std::fs::create_dir_all(&first).unwrap();
        std::fs::create_dir_all(&second).unwrap();
        let registry = SiteRegistry::new();

        registry.add_site("doebakery", &first).unwrap();
        registry.add_site("DoeBakery", &first).unwrap();

        let taken = registry.add_site("doebakery", &second);
        assert!(matches!(taken, Err(DeployError::SubdomainTaken(ref sub)) if sub == "doebakery"));
        assert_eq!(registry.site_path("doebakery"), Some(first));

        assert!(registry.remove_site("doebakery"));
        registry.add_site("doebakery", &second).unwrap();
        assert_eq!(registry.site_path("doebakery"), Some(second));
    }

    #[tokio::test]
    async fn serves_registered_site_by_host() {
        let dir = tempdir().unwrap();
        let registry = SiteRegistry::new();
        registry.add_site("doebakery", site(dir.path(), "<h1>Doe Bakery</h1>")).unwrap();
        let app = router(registry);

        let (status, body) = get(app.clone(), "doebakery.localhost:3001", "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Doe Bakery</h1>");

        let (status, body) = get(app.clone(), "doebakery.localhost:3001", "/styles.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "body{}");

        let (status, _) = get(app, "doebakery.localhost:3001", "/missing.png").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_hosts_get_banner_or_404() {
        let app = router(SiteRegistry::new());

        let (status, body) = get(app.clone(), "localhost:3001", "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, RUNNING_BANNER);

        let (status, body) = get(app.clone(), "unknown.localhost:3001", "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, RUNNING_BANNER);

        let (status, _) = get(app, "localhost:3001", "/about").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn start_and_stop() {
        let server = LocalDevelopmentServer::new(LocalServerOptions {
            port: 0,
            ..Default::default()
        });
        assert!(!server.is_running());

        let addr = server.start().await.unwrap();
        assert!(server.is_running());
        assert_eq!(server.start().await.unwrap(), addr);
        assert_eq!(server.url_for("acme"), format!("http://acme.localhost:{}", addr.port()));

        let body = reqwest::get(format!("http://{addr}/"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, RUNNING_BANNER);

        server.stop().await;
        assert!(!server.is_running());
        assert!(reqwest::get(format!("http://{addr}/")).await.is_err());
    }
}
